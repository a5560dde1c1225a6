// Richrule - Clause Types
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Value types for the individual clauses of a rich rule.
//!
//! Every clause is plain text data. A clause is absent when all of its fields
//! hold their default value; there is no separate presence tag.

use serde::{Deserialize, Serialize};

/// Behaviour shared by every clause type.
pub trait Clause: Default + PartialEq {
    /// Keyword that opens the clause in rich rule text.
    const KEYWORD: &'static str;

    /// True when every field equals its default value.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The clause itself, or `None` when it is empty.
    fn present(&self) -> Option<&Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// A rate limit such as `1/m`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit {
    #[serde(default)]
    pub value: String,
}

impl Limit {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl Clause for Limit {
    const KEYWORD: &'static str = "limit";
}

/// Traffic origin. Only one of `address`, `mac` or `ipset` is rendered,
/// in that order of precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub address: String,
    pub mac: String,
    pub ipset: String,
    pub invert: String,
}

impl Source {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn mac(mac: impl Into<String>) -> Self {
        Self {
            mac: mac.into(),
            ..Default::default()
        }
    }

    pub fn ipset(ipset: impl Into<String>) -> Self {
        Self {
            ipset: ipset.into(),
            ..Default::default()
        }
    }
}

impl Clause for Source {
    const KEYWORD: &'static str = "source";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub address: String,
    pub invert: String,
}

impl Destination {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }
}

impl Clause for Destination {
    const KEYWORD: &'static str = "destination";
}

/// A firewalld service name such as `ftp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub name: String,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Clause for Service {
    const KEYWORD: &'static str = "service";
}

/// A port or port range with its protocol. Neither value is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub port: String,
    pub protocol: String,
}

impl Port {
    pub fn new(port: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            protocol: protocol.into(),
        }
    }
}

impl Clause for Port {
    const KEYWORD: &'static str = "port";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Protocol {
    pub value: String,
}

impl Protocol {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl Clause for Protocol {
    const KEYWORD: &'static str = "protocol";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpBlock {
    pub name: String,
}

impl IcmpBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Clause for IcmpBlock {
    const KEYWORD: &'static str = "icmp-block";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpType {
    pub name: String,
}

impl IcmpType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Clause for IcmpType {
    const KEYWORD: &'static str = "icmp-type";
}

/// Port forwarding, optionally to another port and/or address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardPort {
    pub port: String,
    pub protocol: String,
    #[serde(rename = "toport")]
    pub to_port: String,
    #[serde(rename = "toaddr")]
    pub to_addr: String,
}

impl Clause for ForwardPort {
    const KEYWORD: &'static str = "forward-port";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub prefix: String,
    pub level: String,
    pub limit: Limit,
}

impl Clause for Log {
    const KEYWORD: &'static str = "log";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Audit {
    pub limit: Limit,
}

impl Clause for Audit {
    const KEYWORD: &'static str = "audit";
}

/// The accept action. `flag` marks the action as present; a limit alone
/// does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Accept {
    pub flag: bool,
    pub limit: Limit,
}

impl Accept {
    pub fn new() -> Self {
        Self {
            flag: true,
            limit: Limit::default(),
        }
    }

    pub fn with_limit(limit: impl Into<String>) -> Self {
        Self {
            flag: true,
            limit: Limit::new(limit),
        }
    }
}

impl Clause for Accept {
    const KEYWORD: &'static str = "accept";
}

/// The reject action with an optional ICMP reject type,
/// e.g. `icmp-host-prohibited`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Reject {
    #[serde(rename = "type")]
    pub kind: String,
    pub limit: Limit,
}

impl Reject {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            limit: Limit::default(),
        }
    }
}

impl Clause for Reject {
    const KEYWORD: &'static str = "reject";
}

/// The drop action. Same presence rules as [`Accept`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Drop {
    pub flag: bool,
    pub limit: Limit,
}

impl Drop {
    pub fn new() -> Self {
        Self {
            flag: true,
            limit: Limit::default(),
        }
    }

    pub fn with_limit(limit: impl Into<String>) -> Self {
        Self {
            flag: true,
            limit: Limit::new(limit),
        }
    }
}

impl Clause for Drop {
    const KEYWORD: &'static str = "drop";
}

/// The mark action, e.g. `set=0x1` or `set=0x1/0xff`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Mark {
    pub set: String,
    pub limit: Limit,
}

impl Mark {
    pub fn new(set: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            limit: Limit::default(),
        }
    }
}

impl Clause for Mark {
    const KEYWORD: &'static str = "mark";
}
