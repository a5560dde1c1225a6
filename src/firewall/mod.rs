// Richrule - Firewall Module
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewalld D-Bus client for rich rule management.

mod client;

pub use client::{decode_rich_rules, FirewallClient};

/// D-Bus bus name for firewalld.
pub const BUS_NAME: &str = "org.fedoraproject.FirewallD1";

/// D-Bus object paths.
pub mod paths {
    pub const ROOT: &str = "/org/fedoraproject/FirewallD1";
    pub const CONFIG: &str = "/org/fedoraproject/FirewallD1/config";
}

/// D-Bus interface names.
pub mod interfaces {
    /// Main firewalld interface (getDefaultZone, reload)
    pub const MAIN: &str = "org.fedoraproject.FirewallD1";
    /// Runtime zone interface
    pub const ZONE: &str = "org.fedoraproject.FirewallD1.zone";
    pub const CONFIG: &str = "org.fedoraproject.FirewallD1.config";
    /// Permanent zone interface, served on each zone's config object
    pub const CONFIG_ZONE: &str = "org.fedoraproject.FirewallD1.config.zone";
}

/// Error codes firewalld reports for no-op changes.
pub mod codes {
    pub const ALREADY_ENABLED: &str = "ALREADY_ENABLED";
    pub const NOT_ENABLED: &str = "NOT_ENABLED";
}
