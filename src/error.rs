// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for auditbot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("Check {check} failed: {reason}")]
    Check { check: String, reason: String },

    #[error("External auditor error: {0}")]
    External(String),

    #[error("Report store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
