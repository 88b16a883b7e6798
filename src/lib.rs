// SPDX-License-Identifier: PMPL-1.0-or-later
//! Auditbot - WCAG accessibility audits for static HTML
//!
//! Parses a page, runs a registry of independent accessibility checks over
//! it, and turns the outcome into a scored, tiered report.
//!
//! ## Pipeline
//!
//! 1. An optional external audit engine runs first; its findings are merged.
//! 2. Every enabled [`Check`] inspects the [`Document`]. A failing check is
//!    recorded as incomplete and never stops the run.
//! 3. The [`Accumulator`] is finalized into an [`AuditResult`] with a score
//!    from 0 to 100 and a compliance tier (AAA, AA, A or Non-Compliant).
//! 4. The result is stored under `accessibilityAuditReport` and listeners
//!    are notified.
//!
//! ## Checks
//!
//! - **Structure** (1.3.1, 2.4.1, 2.4.2, 3.1.1): skip links, headings, landmarks, language, title
//! - **Labels** (1.1.1, 2.4.4, 3.3.2, 4.1.2): form, button, link and image names
//! - **Media** (1.2.1, 1.2.2): captions, transcripts, controls
//! - **Keyboard** (2.1.1, 2.4.3, 4.1.2): focusability, tab order, ARIA
//! - **Visual** (1.4.3, 1.4.6): color contrast from computed styles (stylesheets and inline)

pub mod auditor;
pub mod checks;
pub mod color;
pub mod config;
pub mod contrast;
pub mod document;
pub mod error;
pub mod external;
pub mod publish;
pub mod repair;
pub mod report;
pub mod result;
pub mod scanner;
pub mod score;
pub mod store;
pub mod style;

pub use auditor::Auditor;
pub use checks::{Check, CheckContext};
pub use config::AuditConfig;
pub use document::Document;
pub use error::{AuditError, Result};
pub use result::{
    Accumulator, AuditResult, ComplianceTier, Impact, Incomplete, Pass, Recommendation, Violation,
};
