// Richrule - Codec Module
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Codec for firewalld's rich rule language.
//!
//! ```text
//! Rule ── Display ──► "rule family=ipv4 source address=10.0.0.0/24 service name=ftp accept  "
//! Rule ◄── Parser ─── "rule family=ipv4 port name=80 protocol=tcp accept"
//! ```
//!
//! Both directions are pure functions over their input and hold no state.

pub mod clause;
mod parse;
mod render;
mod rule;

#[cfg(test)]
mod tests;

pub use clause::{
    Accept, Audit, Clause, Destination, Drop, ForwardPort, IcmpBlock, IcmpType, Limit, Log, Mark,
    Port, Protocol, Reject, Service, Source,
};
pub use parse::{parse_rule, Keyword, ParseError, Parser, RejectMode};
pub use rule::{Action, ConflictingActions, Rule};
