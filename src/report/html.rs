// SPDX-License-Identifier: PMPL-1.0-or-later
//! Standalone HTML report. All styling is inline so the file can be opened
//! or mailed on its own.

use super::escape_html;
use crate::result::{AffectedNode, AuditResult};
use crate::score::{AAA_THRESHOLD, A_THRESHOLD};
use std::fmt::Write;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#1a1a1a}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:.5rem;text-align:left;vertical-align:top}\
code{font-size:.85em;word-break:break-all}\
.score{font-size:2.5rem;font-weight:700}\
.good{color:#1b5e20}.fair{color:#8a5300}.poor{color:#b71c1c}";

/// CSS class for the score color: green, amber or red
pub fn score_class(score: f64) -> &'static str {
    if score >= AAA_THRESHOLD {
        "good"
    } else if score >= A_THRESHOLD {
        "fair"
    } else {
        "poor"
    }
}

fn nodes_cell(nodes: &[AffectedNode]) -> String {
    nodes
        .iter()
        .map(|n| format!("<code>{}</code>", escape_html(&n.html)))
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Render a result as a self-contained HTML document
pub fn render_html(result: &AuditResult) -> String {
    let mut out = String::new();
    let source = result.source.as_deref().unwrap_or("inline document");

    // Writing into a String cannot fail
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Accessibility audit: {title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>Accessibility audit</h1>\n\
         <p>Source: {title}<br>Run: {ts}</p>\n\
         <p class=\"score {class}\">{score:.1}/100</p>\n\
         <p>Compliance level: <strong>{level}</strong></p>\n\
         <p>{v} violations, {p} passes, {i} incomplete</p>\n",
        title = escape_html(source),
        style = STYLE,
        ts = result.timestamp.to_rfc3339(),
        class = score_class(result.score),
        score = result.score,
        level = escape_html(&result.wcag_level.to_string()),
        v = result.violations.len(),
        p = result.passes.len(),
        i = result.incomplete.len(),
    );

    out.push_str("<h2>Violations</h2>\n");
    if result.violations.is_empty() {
        out.push_str("<p>No violations found.</p>\n");
    } else {
        out.push_str("<table>\n<tr><th>Impact</th><th>Rule</th><th>Description</th><th>Suggestion</th><th>Elements</th></tr>\n");
        for v in &result.violations {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                v.impact,
                escape_html(&v.id),
                escape_html(&v.description),
                escape_html(&v.suggestion),
                nodes_cell(&v.affected_nodes)
            );
        }
        out.push_str("</table>\n");
    }

    let recommendations = result.recommendations();
    if !recommendations.is_empty() {
        out.push_str("<h2>Recommendations</h2>\n<ol>\n");
        for rec in &recommendations {
            let count = if rec.occurrences > 1 {
                format!(" ({} occurrences)", rec.occurrences)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "<li><strong>{}</strong>: {} <code>{}</code>{}</li>",
                rec.impact,
                escape_html(&rec.suggestion),
                escape_html(&rec.id),
                count
            );
        }
        out.push_str("</ol>\n");
    }

    if !result.incomplete.is_empty() {
        out.push_str("<h2>Needs review</h2>\n<table>\n<tr><th>Rule</th><th>Description</th><th>Reason</th><th>Elements</th></tr>\n");
        for item in &result.incomplete {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&item.id),
                escape_html(&item.description),
                escape_html(&item.reason),
                nodes_cell(&item.affected_nodes)
            );
        }
        out.push_str("</table>\n");
    }

    out.push_str("<h2>Passed</h2>\n<ul>\n");
    for pass in &result.passes {
        let _ = writeln!(
            out,
            "<li><strong>{}</strong>: {}</li>",
            escape_html(&pass.id),
            escape_html(&pass.description)
        );
    }
    out.push_str("</ul>\n</body>\n</html>\n");

    out
}
