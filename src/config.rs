// Richrule - Configuration
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Command line defaults persisted in a local JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::richrule::RejectMode;

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Zone used when none is given. Falls back to firewalld's default zone.
    #[serde(default)]
    pub zone: Option<String>,
    /// Apply changes to the permanent configuration as well as the runtime.
    #[serde(default)]
    pub permanent: bool,
    /// Lifetime of runtime rules in seconds, 0 for no limit.
    #[serde(default)]
    pub timeout: i32,
    /// How `reject` clauses are read back from firewalld.
    #[serde(default)]
    pub reject_mode: RejectMode,
}

impl Settings {
    /// Location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("richrule")
            .join("settings.json")
    }

    /// Load settings from the default location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load settings from `path`. A missing or broken file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Failed to parse settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
