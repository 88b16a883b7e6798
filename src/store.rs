// SPDX-License-Identifier: PMPL-1.0-or-later
//! Session storage for the latest audit report.
//!
//! Reports are stored as JSON text under a string key. The in-memory store
//! lives as long as the process; the file store writes one `<key>.json` per
//! key into a session directory.

use crate::error::{AuditError, Result};
use crate::result::AuditResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key the latest report is stored under
pub const REPORT_KEY: &str = "accessibilityAuditReport";

/// Key/value backend for serialized reports
pub trait ReportStore: Send {
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Serialize a result and store it under [`REPORT_KEY`]
pub fn save_report(store: &mut dyn ReportStore, result: &AuditResult) -> Result<()> {
    let json = serde_json::to_string(result)?;
    store.put(REPORT_KEY, &json)
}

/// Load the report stored under [`REPORT_KEY`], if any
pub fn load_report(store: &dyn ReportStore) -> Result<Option<AuditResult>> {
    match store.get(REPORT_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Store that keeps values for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReportStore for MemoryStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Store backed by a session directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`; the directory is created on first write
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AuditError::Store(format!("invalid key \"{}\"", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl ReportStore for FileStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }
}
