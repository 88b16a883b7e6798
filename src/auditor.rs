// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit runs.
//!
//! A run executes the external auditor (when configured), then every enabled
//! check in registry order, then finalizes the score and publishes the
//! result. Nothing inside a run is fatal: failing pieces are logged and
//! the run carries on with what remains.

use crate::checks::{self, Check, CheckContext};
use crate::config::AuditConfig;
use crate::document::Document;
use crate::error::Result;
use crate::external::{CommandAuditor, ExternalAuditor};
use crate::publish::{AuditListener, Publisher};
use crate::result::{Accumulator, AuditResult};
use crate::store::ReportStore;
use std::path::Path;
use tracing::{info, warn};

pub struct Auditor {
    config: AuditConfig,
    checks: Vec<Box<dyn Check>>,
    external: Option<Box<dyn ExternalAuditor>>,
    publisher: Publisher,
}

impl Auditor {
    /// Auditor with the built-in checks, an in-memory report store and the
    /// external auditor named in `config`, if any
    pub fn new(config: AuditConfig) -> Self {
        let external = config
            .external
            .as_ref()
            .map(|e| Box::new(CommandAuditor::from_config(e)) as Box<dyn ExternalAuditor>);
        Self {
            config,
            checks: checks::default_checks(),
            external,
            publisher: Publisher::default(),
        }
    }

    /// Register an additional check, run after the built-in ones
    pub fn with_check(mut self, check: Box<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_external(mut self, external: Box<dyn ExternalAuditor>) -> Self {
        self.external = Some(external);
        self
    }

    /// Replace the report store, keeping subscribed listeners
    pub fn with_store(mut self, store: Box<dyn ReportStore>) -> Self {
        let mut publisher = Publisher::new(store);
        for listener in self.publisher.take_listeners() {
            publisher.subscribe(listener);
        }
        self.publisher = publisher;
        self
    }

    pub fn subscribe(&mut self, listener: Box<dyn AuditListener>) {
        self.publisher.subscribe(listener);
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ReportStore {
        self.publisher.store()
    }

    /// Audit a parsed document
    pub fn run(&mut self, document: &Document) -> AuditResult {
        let source = document.source_name();
        info!(
            source = source.as_deref().unwrap_or("<inline>"),
            checks = self.checks.len(),
            "starting audit"
        );

        let mut acc = Accumulator::new();

        if let Some(external) = &self.external {
            match external.audit(document) {
                Ok(findings) => {
                    info!(
                        auditor = external.name(),
                        violations = findings.violations.len(),
                        "external audit complete"
                    );
                    findings.merge_into(&mut acc);
                }
                Err(e) => {
                    warn!(auditor = external.name(), error = %e, "external audit failed; using built-in checks only");
                }
            }
        }

        let ctx = CheckContext::new(document, &self.config);
        checks::run_checks(&self.checks, &ctx, &mut acc);

        let result = acc.finalize(source);
        self.publisher.publish(&result);
        result
    }

    /// Audit HTML source text
    pub fn audit_source(&mut self, html: &str) -> AuditResult {
        self.run(&Document::parse(html))
    }

    /// Read, parse and audit a file
    pub fn audit_file(&mut self, path: &Path) -> Result<AuditResult> {
        let document = Document::from_path(path)?;
        Ok(self.run(&document))
    }
}
