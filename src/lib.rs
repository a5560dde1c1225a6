// Richrule - Library Root
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Reading and writing firewalld rich rules.
//!
//! - [`richrule`]: the codec between [`richrule::Rule`] values and rich rule text
//! - [`firewall`]: a D-Bus client that adds, removes and lists rich rules
//! - [`config`]: defaults for the command line tool

pub mod config;
pub mod firewall;
pub mod richrule;

pub use richrule::{parse_rule, ParseError, Parser, RejectMode, Rule};
