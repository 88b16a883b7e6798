// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration for auditbot

use crate::contrast::ContrastPolicy;
use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Contrast thresholds to enforce
    pub contrast_policy: ContrastPolicy,
    /// Check ids to skip
    pub disabled_checks: Vec<String>,
    /// Where the file-backed report store keeps its session data
    pub store_dir: Option<PathBuf>,
    pub repairs: RepairConfig,
    /// Third-party auditor run before the built-in checks
    pub external: Option<ExternalConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub skip_link: bool,
    pub live_region: bool,
    /// Fragment the inserted skip link points at
    pub skip_link_target: String,
    pub skip_link_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            contrast_policy: ContrastPolicy::default(),
            disabled_checks: Vec::new(),
            store_dir: None,
            repairs: RepairConfig::default(),
            external: None,
        }
    }
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            skip_link: true,
            live_region: true,
            skip_link_target: "main-content".to_string(),
            skip_link_text: "Skip to main content".to_string(),
        }
    }
}

impl AuditConfig {
    /// Whether the check with this id is switched off
    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled_checks.iter().any(|d| d == id)
    }

    /// Session directory for stored reports
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("auditbot-session"))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("auditbot")
        .join("config.toml")
}

/// Load configuration from TOML or YAML, chosen by extension.
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AuditConfig> {
    if !path.exists() {
        return Ok(AuditConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("yml") | Some("yaml") => serde_yaml::from_str(&content)
            .map_err(|e| AuditError::Config(format!("YAML parse error: {}", e))),
        _ => toml::from_str(&content)
            .map_err(|e| AuditError::Config(format!("TOML parse error: {}", e))),
    }
}
