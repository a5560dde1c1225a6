// Richrule - Serializer
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Rendering of rules into rich rule text.
//!
//! Each clause renders its own fragment, including the trailing space. The
//! fragments are concatenated as-is, so the output can contain runs of
//! spaces; firewalld splits on whitespace and does not mind.

use std::fmt::{self, Display, Formatter, Write};

use super::clause::{
    Accept, Audit, Clause, Destination, Drop, ForwardPort, IcmpBlock, IcmpType, Limit, Log, Mark,
    Port, Protocol, Reject, Service, Source,
};
use super::rule::Rule;

/// Writes ` key=value` when `value` is non-empty.
fn opt_field(f: &mut Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    if value.is_empty() {
        Ok(())
    } else {
        write!(f, " {}={}", key, value)
    }
}

/// Writes ` limit value=<rate>` when the limit is set.
fn opt_limit(f: &mut Formatter<'_>, limit: &Limit) -> fmt::Result {
    if limit.is_empty() {
        Ok(())
    } else {
        write!(f, " {}", limit)
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "limit value={}", self.value)
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(" source ")?;
        if !self.address.is_empty() {
            write!(f, "address={}", self.address)?;
        } else if !self.mac.is_empty() {
            write!(f, "mac={}", self.mac)?;
        } else {
            write!(f, "ipset={}", self.ipset)?;
        }
        opt_field(f, "invert", &self.invert)?;
        f.write_str(" ")
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(" destination ")?;
        if !self.address.is_empty() {
            write!(f, "address={}", self.address)?;
        }
        opt_field(f, "invert", &self.invert)?;
        f.write_str(" ")
    }
}

/// Clauses that render as `<keyword> <key>=<value> `.
fn single_field(f: &mut Formatter<'_>, keyword: &str, key: &str, value: &str) -> fmt::Result {
    write!(f, "{} ", keyword)?;
    if !value.is_empty() {
        write!(f, "{}={}", key, value)?;
    }
    f.write_str(" ")
}

impl Display for Service {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        single_field(f, Self::KEYWORD, "name", &self.name)
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        single_field(f, Self::KEYWORD, "value", &self.value)
    }
}

impl Display for IcmpBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        single_field(f, Self::KEYWORD, "name", &self.name)
    }
}

impl Display for IcmpType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        single_field(f, Self::KEYWORD, "name", &self.name)
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("port ")?;
        // The wire key for the port value is `name`.
        if !self.port.is_empty() {
            write!(f, "name={}", self.port)?;
        }
        opt_field(f, "protocol", &self.protocol)?;
        f.write_str(" ")
    }
}

impl Display for ForwardPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("forward-port ")?;
        if !self.port.is_empty() {
            write!(f, "port={}", self.port)?;
        }
        opt_field(f, "protocol", &self.protocol)?;
        opt_field(f, "to-port", &self.to_port)?;
        opt_field(f, "to-addr", &self.to_addr)?;
        f.write_str(" ")
    }
}

impl Display for Log {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("log")?;
        opt_field(f, "prefix", &self.prefix)?;
        opt_field(f, "level", &self.level)?;
        opt_limit(f, &self.limit)?;
        f.write_str(" ")
    }
}

impl Display for Audit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("audit")?;
        opt_limit(f, &self.limit)?;
        f.write_str(" ")
    }
}

/// Accept and drop write their keyword only when flagged, but the limit is
/// written either way. A limit without the flag therefore renders as a bare
/// `limit value=...` fragment.
fn flagged_action(f: &mut Formatter<'_>, keyword: &str, flag: bool, limit: &Limit) -> fmt::Result {
    if flag {
        write!(f, "{} ", keyword)?;
    }
    if !limit.is_empty() {
        write!(f, "{}", limit)?;
    }
    f.write_str(" ")
}

impl Display for Accept {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        flagged_action(f, Self::KEYWORD, self.flag, &self.limit)
    }
}

impl Display for Drop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        flagged_action(f, Self::KEYWORD, self.flag, &self.limit)
    }
}

impl Display for Reject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("reject ")?;
        if !self.kind.is_empty() {
            write!(f, "type={}", self.kind)?;
        }
        opt_limit(f, &self.limit)?;
        f.write_str(" ")
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("mark")?;
        opt_field(f, "set", &self.set)?;
        opt_limit(f, &self.limit)?;
        f.write_str(" ")
    }
}

/// Appends the clause to `out` if it is not empty.
fn push_clause<C: Clause + Display>(out: &mut String, clause: &C) {
    if let Some(clause) = clause.present() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", clause);
    }
}

impl Display for Rule {
    /// Renders the rule in canonical clause order. Never fails on any rule
    /// value, including rules with several actions.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut body = String::new();
        push_clause(&mut body, &self.source);
        push_clause(&mut body, &self.destination);
        push_clause(&mut body, &self.service);
        push_clause(&mut body, &self.port);
        push_clause(&mut body, &self.protocol);
        push_clause(&mut body, &self.icmp_block);
        push_clause(&mut body, &self.icmp_type);
        push_clause(&mut body, &self.forward_port);
        push_clause(&mut body, &self.log);
        push_clause(&mut body, &self.audit);
        push_clause(&mut body, &self.accept);
        push_clause(&mut body, &self.reject);
        push_clause(&mut body, &self.drop);
        push_clause(&mut body, &self.mark);

        f.write_str("rule ")?;
        if !self.family.is_empty() {
            write!(f, "family={}", self.family)?;
            // Only the source and destination fragments open with a space.
            if !body.is_empty() && !body.starts_with(' ') {
                f.write_str(" ")?;
            }
        }
        f.write_str(&body)
    }
}
