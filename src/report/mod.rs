// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit results.
//!
//! Supports multiple output formats:
//! - Text: human-readable summary grouped by impact
//! - JSON: the result itself, for programmatic consumption and re-import
//! - HTML: self-contained page for sharing
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

mod html;
mod sarif;

use crate::error::Result;
use crate::result::{AuditResult, Impact};
use std::path::{Path, PathBuf};
use tracing::info;

pub use html::render_html;
pub use sarif::render_sarif;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML page
    Html,
    /// SARIF for IDE/CI integration
    Sarif,
}

impl OutputFormat {
    /// File extension used for exports
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
            OutputFormat::Sarif => "sarif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Sarif => write!(f, "sarif"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "sarif" => Ok(OutputFormat::Sarif),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Render a result in the given format
pub fn generate_report(result: &AuditResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generate_text_report(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Html => Ok(render_html(result)),
        OutputFormat::Sarif => render_sarif(result),
    }
}

/// File name for an export: `accessibility-audit-<millis>.<ext>`
pub fn export_file_name(result: &AuditResult, format: OutputFormat) -> String {
    format!(
        "accessibility-audit-{}.{}",
        result.timestamp.timestamp_millis(),
        format.extension()
    )
}

/// Write a result into `dir`, returning the path written
pub fn export(result: &AuditResult, dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    let content = generate_report(result, format)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(result, format));
    std::fs::write(&path, content)?;
    info!(path = %path.display(), format = %format, "report exported");
    Ok(path)
}

/// Read back a JSON export
pub fn import_json(path: &Path) -> Result<AuditResult> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Generate human-readable text report
fn generate_text_report(result: &AuditResult) -> String {
    let mut output = String::new();

    output.push_str("=== Auditbot Accessibility Report ===\n\n");
    if let Some(ref source) = result.source {
        output.push_str(&format!("Source: {}\n", source));
    }
    output.push_str(&format!(
        "Score: {:.1}/100 ({})\n",
        result.score, result.wcag_level
    ));
    output.push_str(&format!(
        "{} violation(s), {} pass(es), {} incomplete\n\n",
        result.violations.len(),
        result.passes.len(),
        result.incomplete.len()
    ));

    for impact in Impact::ALL {
        let group = result.by_impact(impact);
        if group.is_empty() {
            continue;
        }

        output.push_str(&format!("--- {} ({}) ---\n", impact, group.len()));
        for violation in group {
            output.push_str(&format!("[{}] {}\n", violation.id, violation.description));
            output.push_str(&format!("  Fix: {}\n", violation.suggestion));
            for node in &violation.affected_nodes {
                output.push_str(&format!("  At: {}\n", node.html));
            }
            output.push('\n');
        }
    }

    let recommendations = result.recommendations();
    if !recommendations.is_empty() {
        output.push_str(&format!("--- recommendations ({}) ---\n", recommendations.len()));
        for (i, rec) in recommendations.iter().enumerate() {
            output.push_str(&format!("{}. [{}] {} ({}", i + 1, rec.impact, rec.suggestion, rec.id));
            if rec.occurrences > 1 {
                output.push_str(&format!(", {} occurrences", rec.occurrences));
            }
            output.push_str(")\n");
        }
        output.push('\n');
    }

    if !result.incomplete.is_empty() {
        output.push_str(&format!("--- needs review ({}) ---\n", result.incomplete.len()));
        for item in &result.incomplete {
            output.push_str(&format!("[{}] {}\n", item.id, item.description));
            if !item.reason.is_empty() {
                output.push_str(&format!("  Reason: {}\n", item.reason));
            }
        }
        output.push('\n');
    }

    if result.has_critical() {
        output.push_str("RESULT: FAIL (critical violations found)\n");
    } else if !result.violations.is_empty() {
        output.push_str("RESULT: PASS WITH WARNINGS\n");
    } else {
        output.push_str("RESULT: PASS\n");
    }

    output
}
