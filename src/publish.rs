// SPDX-License-Identifier: PMPL-1.0-or-later
//! Publishing finished audits: persist to the report store, then notify
//! listeners. Store failures are logged and never reach the caller.

use crate::result::AuditResult;
use crate::store::{self, MemoryStore, ReportStore};
use tracing::{info, warn};

/// Receives every published audit result.
pub trait AuditListener: Send + Sync {
    fn on_audit_complete(&self, result: &AuditResult);
}

impl<F> AuditListener for F
where
    F: Fn(&AuditResult) + Send + Sync,
{
    fn on_audit_complete(&self, result: &AuditResult) {
        self(result)
    }
}

/// Logs a one-line summary of each audit
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl AuditListener for LoggingListener {
    fn on_audit_complete(&self, result: &AuditResult) {
        info!(
            source = result.source.as_deref().unwrap_or("<inline>"),
            score = result.score,
            level = %result.wcag_level,
            violations = result.violations.len(),
            passes = result.passes.len(),
            incomplete = result.incomplete.len(),
            "audit complete"
        );
    }
}

pub struct Publisher {
    store: Box<dyn ReportStore>,
    listeners: Vec<Box<dyn AuditListener>>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }
}

impl Publisher {
    pub fn new(store: Box<dyn ReportStore>) -> Self {
        Self {
            store,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn AuditListener>) {
        self.listeners.push(listener);
    }

    pub fn store(&self) -> &dyn ReportStore {
        self.store.as_ref()
    }

    pub(crate) fn take_listeners(&mut self) -> Vec<Box<dyn AuditListener>> {
        std::mem::take(&mut self.listeners)
    }

    /// Store the result, then notify every listener in subscription order
    pub fn publish(&mut self, result: &AuditResult) {
        if let Err(e) = store::save_report(self.store.as_mut(), result) {
            warn!(error = %e, key = store::REPORT_KEY, "failed to store audit report");
        }
        for listener in &self.listeners {
            listener.on_audit_complete(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuditError, Result};
    use crate::result::Accumulator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct BrokenStore;

    impl ReportStore for BrokenStore {
        fn put(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(AuditError::Store("quota exceeded".into()))
        }

        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_publish_stores_and_notifies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut publisher = Publisher::default();
        publisher.subscribe(Box::new(move |_: &AuditResult| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        publisher.subscribe(Box::new(LoggingListener));

        let result = Accumulator::new().finalize(None);
        publisher.publish(&result);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stored = store::load_report(publisher.store()).unwrap().unwrap();
        assert_eq!(stored, result);
    }

    #[test]
    fn test_store_failure_still_notifies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut publisher = Publisher::new(Box::new(BrokenStore));
        publisher.subscribe(Box::new(move |_: &AuditResult| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        publisher.publish(&Accumulator::new().finalize(None));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
