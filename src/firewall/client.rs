// Richrule - D-Bus Client
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Firewalld D-Bus client for rich rules.
//!
//! Rules go out as the text rendered by [`Rule`]'s `Display` and come back
//! through the client's [`Parser`]. The connection is owned by the client and
//! passed in by the caller; there is no process-wide handle.

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use zbus::blocking::Connection;
use zbus::zvariant::{ObjectPath, OwnedObjectPath};

use super::{codes, interfaces, paths, BUS_NAME};
use crate::richrule::{Parser, Rule};

/// Client for managing rich rules via firewalld's D-Bus API.
pub struct FirewallClient {
    connection: Connection,
    parser: Parser,
}

impl FirewallClient {
    /// Wrap an existing connection.
    pub fn new(connection: Connection, parser: Parser) -> Self {
        Self { connection, parser }
    }

    /// Connect to firewalld on the system bus.
    pub fn connect_system(parser: Parser) -> Result<Self> {
        info!("Connecting to firewalld...");

        let connection = Connection::system().context("Failed to connect to system D-Bus")?;
        let client = Self::new(connection, parser);

        // Test connection by getting the default zone
        let zone = client.default_zone()?;

        info!("Connected to firewalld (default zone {})", zone);
        Ok(client)
    }

    /// Get the default zone name.
    pub fn default_zone(&self) -> Result<String> {
        let zone: String = self
            .connection
            .call_method(
                Some(BUS_NAME),
                paths::ROOT,
                Some(interfaces::MAIN),
                "getDefaultZone",
                &(),
            )
            .context("getDefaultZone failed")?
            .body()
            .deserialize()?;

        Ok(zone)
    }

    /// Get the names of all runtime zones.
    pub fn zones(&self) -> Result<Vec<String>> {
        let zones: Vec<String> = self
            .connection
            .call_method(
                Some(BUS_NAME),
                paths::ROOT,
                Some(interfaces::ZONE),
                "getZones",
                &(),
            )?
            .body()
            .deserialize()?;

        Ok(zones)
    }

    /// Get the runtime rich rules of a zone.
    pub fn rich_rules(&self, zone: &str) -> Result<Vec<Rule>> {
        let raw: Vec<String> = self
            .connection
            .call_method(
                Some(BUS_NAME),
                paths::ROOT,
                Some(interfaces::ZONE),
                "getRichRules",
                &(zone,),
            )?
            .body()
            .deserialize()?;

        decode_rich_rules(&self.parser, &raw)
            .with_context(|| format!("Unreadable rich rule in zone {}", zone))
    }

    /// Get the permanent rich rules of a zone.
    pub fn permanent_rich_rules(&self, zone: &str) -> Result<Vec<Rule>> {
        let config_path = self.zone_config_path(zone)?;
        let raw: Vec<String> = self
            .connection
            .call_method(
                Some(BUS_NAME),
                ObjectPath::try_from(config_path.as_str())?,
                Some(interfaces::CONFIG_ZONE),
                "getRichRules",
                &(),
            )?
            .body()
            .deserialize()?;

        decode_rich_rules(&self.parser, &raw)
            .with_context(|| format!("Unreadable permanent rich rule in zone {}", zone))
    }

    /// Add a rich rule to the runtime configuration of a zone.
    ///
    /// `timeout` is in seconds; 0 keeps the rule until reload.
    pub fn add_rich_rule(&self, zone: &str, rule: &Rule, timeout: i32) -> Result<()> {
        let text = rule.to_string();
        let result = self.connection.call_method(
            Some(BUS_NAME),
            paths::ROOT,
            Some(interfaces::ZONE),
            "addRichRule",
            &(zone, text.as_str(), timeout),
        );

        match result {
            Ok(_) => info!("Added rich rule to zone {}: {}", zone, text),
            Err(e) if is_benign(&e, codes::ALREADY_ENABLED) => {
                debug!("Rich rule already enabled in zone {}: {}", zone, text);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Add a rich rule to the permanent configuration of a zone.
    pub fn permanent_add_rich_rule(&self, zone: &str, rule: &Rule) -> Result<()> {
        let text = rule.to_string();
        let config_path = self.zone_config_path(zone)?;
        let result = self.connection.call_method(
            Some(BUS_NAME),
            ObjectPath::try_from(config_path.as_str())?,
            Some(interfaces::CONFIG_ZONE),
            "addRichRule",
            &(text.as_str(),),
        );

        match result {
            Ok(_) => info!("Added rich rule to zone {} (permanent): {}", zone, text),
            Err(e) if is_benign(&e, codes::ALREADY_ENABLED) => {
                debug!("Rich rule already in permanent zone {}: {}", zone, text);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Remove a rich rule from the runtime configuration of a zone.
    pub fn remove_rich_rule(&self, zone: &str, rule: &Rule) -> Result<()> {
        let text = rule.to_string();
        let result = self.connection.call_method(
            Some(BUS_NAME),
            paths::ROOT,
            Some(interfaces::ZONE),
            "removeRichRule",
            &(zone, text.as_str()),
        );

        match result {
            Ok(_) => info!("Removed rich rule from zone {}: {}", zone, text),
            Err(e) if is_benign(&e, codes::NOT_ENABLED) => {
                debug!("Rich rule not enabled in zone {}: {}", zone, text);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Remove a rich rule from the permanent configuration of a zone.
    pub fn permanent_remove_rich_rule(&self, zone: &str, rule: &Rule) -> Result<()> {
        let text = rule.to_string();
        let config_path = self.zone_config_path(zone)?;
        let result = self.connection.call_method(
            Some(BUS_NAME),
            ObjectPath::try_from(config_path.as_str())?,
            Some(interfaces::CONFIG_ZONE),
            "removeRichRule",
            &(text.as_str(),),
        );

        match result {
            Ok(_) => info!("Removed rich rule from zone {} (permanent): {}", zone, text),
            Err(e) if is_benign(&e, codes::NOT_ENABLED) => {
                debug!("Rich rule not in permanent zone {}: {}", zone, text);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Whether a rich rule is active in the runtime configuration of a zone.
    pub fn query_rich_rule(&self, zone: &str, rule: &Rule) -> Result<bool> {
        let text = rule.to_string();
        let enabled: bool = self
            .connection
            .call_method(
                Some(BUS_NAME),
                paths::ROOT,
                Some(interfaces::ZONE),
                "queryRichRule",
                &(zone, text.as_str()),
            )?
            .body()
            .deserialize()?;

        Ok(enabled)
    }

    /// Whether a rich rule is part of the permanent configuration of a zone.
    pub fn permanent_query_rich_rule(&self, zone: &str, rule: &Rule) -> Result<bool> {
        let text = rule.to_string();
        let config_path = self.zone_config_path(zone)?;
        let enabled: bool = self
            .connection
            .call_method(
                Some(BUS_NAME),
                ObjectPath::try_from(config_path.as_str())?,
                Some(interfaces::CONFIG_ZONE),
                "queryRichRule",
                &(text.as_str(),),
            )?
            .body()
            .deserialize()?;

        Ok(enabled)
    }

    /// Add a rule to the runtime configuration and, if asked, to the
    /// permanent one. A failure on the permanent side is logged, not returned.
    pub fn apply_rich_rule(&self, zone: &str, rule: &Rule, timeout: i32, permanent: bool) -> Result<()> {
        self.add_rich_rule(zone, rule, timeout)?;
        if permanent {
            if let Err(e) = self.permanent_add_rich_rule(zone, rule) {
                warn!("Failed to add rich rule to permanent config of {}: {:#}", zone, e);
            }
        }
        Ok(())
    }

    /// Counterpart of [`FirewallClient::apply_rich_rule`].
    pub fn revoke_rich_rule(&self, zone: &str, rule: &Rule, permanent: bool) -> Result<()> {
        self.remove_rich_rule(zone, rule)?;
        if permanent {
            if let Err(e) = self.permanent_remove_rich_rule(zone, rule) {
                warn!("Failed to remove rich rule from permanent config of {}: {:#}", zone, e);
            }
        }
        Ok(())
    }

    /// Reload firewalld configuration.
    pub fn reload(&self) -> Result<()> {
        self.connection.call_method(
            Some(BUS_NAME),
            paths::ROOT,
            Some(interfaces::MAIN),
            "reload",
            &(),
        )?;

        info!("Firewalld configuration reloaded");
        Ok(())
    }

    /// Get the D-Bus path for a zone's permanent config.
    fn zone_config_path(&self, zone_name: &str) -> Result<String> {
        let path: OwnedObjectPath = self
            .connection
            .call_method(
                Some(BUS_NAME),
                paths::CONFIG,
                Some(interfaces::CONFIG),
                "getZoneByName",
                &(zone_name,),
            )
            .map_err(|e| anyhow!("No permanent config for zone {}: {}", zone_name, e))?
            .body()
            .deserialize()?;

        Ok(path.to_string())
    }
}

/// Parse the strings of a `getRichRules` reply.
pub fn decode_rich_rules(parser: &Parser, raw: &[String]) -> Result<Vec<Rule>> {
    parser
        .parse_all(raw)
        .map_err(|(index, err)| anyhow!("rule {} ({}): {}", index, raw[index], err))
}

/// Whether a D-Bus error is firewalld reporting that nothing had to change.
fn is_benign(err: &zbus::Error, code: &str) -> bool {
    err.to_string().contains(code)
}
