// SPDX-License-Identifier: PMPL-1.0-or-later
//! Source repairs for the two fixes that are always safe to apply:
//! a skip link as the first child of `<body>` and a polite live region as
//! its last child.
//!
//! Repairs edit the source text so the rest of the markup is kept
//! byte-for-byte. Auditing never calls into this module.

use crate::config::RepairConfig;
use crate::document::Document;
use crate::error::Result;
use crate::report::escape_html;
use regex::Regex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// Skip link inserted as the first child of `<body>`
    SkipLink,
    /// `id` added to `<main>` so the skip link has a target
    SkipLinkTarget,
    /// Live region inserted as the last child of `<body>`
    LiveRegion,
}

impl std::fmt::Display for Repair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repair::SkipLink => write!(f, "inserted skip link"),
            Repair::SkipLinkTarget => write!(f, "added skip link target to <main>"),
            Repair::LiveRegion => write!(f, "inserted live region"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub html: String,
    pub applied: Vec<Repair>,
}

impl RepairOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Apply the enabled repairs to an HTML source
pub fn repair(source: &str, config: &RepairConfig) -> Result<RepairOutcome> {
    let doc = Document::parse(source);
    let mut html = source.to_string();
    let mut applied = Vec::new();

    let needs_skip_link = config.skip_link && !doc.exists(".skip-link")?;
    let needs_live_region =
        config.live_region && !doc.exists("[aria-live], [aria-atomic], [aria-busy]")?;

    if !needs_skip_link && !needs_live_region {
        debug!("no repairs needed");
        return Ok(RepairOutcome { html, applied });
    }

    let body_open = Regex::new(r"(?i)<body(?:\s[^>]*)?>").expect("valid regex");
    let Some(open) = body_open.find(&html).map(|m| m.end()) else {
        warn!("source has no <body> tag; repairs skipped");
        return Ok(RepairOutcome { html, applied });
    };

    if needs_live_region {
        let region = "<div aria-live=\"polite\" aria-atomic=\"true\" class=\"sr-only\"></div>\n";
        let close = body_close_offset(&html).max(open);
        html.insert_str(close, region);
        applied.push(Repair::LiveRegion);
    }

    if needs_skip_link {
        let target = config.skip_link_target.trim_start_matches('#');
        let link = format!(
            "\n<a href=\"#{}\" class=\"skip-link\">{}</a>",
            escape_html(target),
            escape_html(&config.skip_link_text)
        );
        html.insert_str(open, &link);
        applied.push(Repair::SkipLink);

        if !doc.ids().contains(target) && add_main_target(&doc, &mut html, target)? {
            applied.push(Repair::SkipLinkTarget);
        }
    }

    Ok(RepairOutcome { html, applied })
}

/// Offset of the last `</body>`, else of `</html>`, else the end of the source
fn body_close_offset(html: &str) -> usize {
    let body_close = Regex::new(r"(?i)</body\s*>").expect("valid regex");
    let html_close = Regex::new(r"(?i)</html\s*>").expect("valid regex");
    body_close
        .find_iter(html)
        .last()
        .or_else(|| html_close.find_iter(html).last())
        .map_or(html.len(), |m| m.start())
}

/// Give an id-less `<main>` the skip link's target id
fn add_main_target(doc: &Document, html: &mut String, target: &str) -> Result<bool> {
    let main_has_id = match doc.select_first("main")? {
        None => return Ok(false),
        Some(main) => main.value().attr("id").is_some(),
    };
    if main_has_id {
        return Ok(false);
    }
    let main_open = Regex::new(r"(?i)<main\b").expect("valid regex");
    let Some(m) = main_open.find(html) else {
        return Ok(false);
    };
    let at = m.end();
    html.insert_str(at, &format!(" id=\"{}\"", escape_html(target)));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::ElementRef;

    const PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>T</title></head>\n<body class=\"home\">\n<nav><a href=\"/\">Home</a></nav>\n<main>\n<p>Hi</p>\n</main>\n</body>\n</html>\n";

    fn body_children(html: &str) -> Vec<(String, Option<String>)> {
        let doc = Document::parse(html);
        let body = doc.select_first("body").unwrap().unwrap();
        body.children()
            .filter_map(ElementRef::wrap)
            .map(|c| (c.value().name().to_string(), c.value().attr("class").map(String::from)))
            .collect()
    }

    #[test]
    fn test_inserts_skip_link_and_live_region() {
        let outcome = repair(PAGE, &RepairConfig::default()).unwrap();
        assert_eq!(
            outcome.applied,
            vec![Repair::LiveRegion, Repair::SkipLink, Repair::SkipLinkTarget]
        );

        let children = body_children(&outcome.html);
        assert_eq!(children.first().unwrap().0, "a");
        assert_eq!(children.first().unwrap().1.as_deref(), Some("skip-link"));
        assert_eq!(children.last().unwrap().0, "div");
        assert_eq!(children.last().unwrap().1.as_deref(), Some("sr-only"));

        let doc = Document::parse(outcome.html.as_str());
        assert!(doc.exists("main#main-content").unwrap());
        assert!(doc.exists("a[href=\"#main-content\"]").unwrap());
        assert!(outcome.html.contains("<body class=\"home\">"));
    }

    #[test]
    fn test_existing_features_are_left_alone() {
        let source = "<html><body><a class=\"skip-link\" href=\"#m\">Skip</a><main id=\"m\"></main><div aria-live=\"assertive\"></div></body></html>";
        let outcome = repair(source, &RepairConfig::default()).unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.html, source);
    }

    #[test]
    fn test_disabled_repairs() {
        let config = RepairConfig {
            skip_link: false,
            ..RepairConfig::default()
        };
        let outcome = repair(PAGE, &config).unwrap();
        assert_eq!(outcome.applied, vec![Repair::LiveRegion]);
        assert!(!outcome.html.contains("skip-link"));
    }

    #[test]
    fn test_missing_body_close_tag() {
        let outcome = repair("<body><p>x</p>", &RepairConfig::default()).unwrap();
        let children = body_children(&outcome.html);
        assert_eq!(children.first().unwrap().0, "a");
        assert_eq!(children.last().unwrap().0, "div");
    }

    #[test]
    fn test_no_body_tag_is_untouched() {
        let outcome = repair("<p>fragment</p>", &RepairConfig::default()).unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.html, "<p>fragment</p>");
    }
}
