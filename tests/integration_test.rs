// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for auditbot

use auditbot::config::{AuditConfig, RepairConfig};
use auditbot::contrast::ContrastPolicy;
use auditbot::report::{self, OutputFormat};
use auditbot::store::{self, FileStore};
use auditbot::{repair, scanner, Auditor, ComplianceTier, Document, Impact};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn audit(name: &str) -> auditbot::AuditResult {
    Auditor::new(AuditConfig::default())
        .audit_file(&fixture(name))
        .expect("audit should succeed")
}

#[test]
fn test_accessible_fixture() {
    let result = audit("accessible.html");

    assert!(
        result.violations.is_empty(),
        "Accessible fixture should have no violations, got: {:?}",
        result.violations.iter().map(|v| &v.id).collect::<Vec<_>>()
    );
    assert!(result.incomplete.is_empty(), "{:?}", result.incomplete);
    assert_eq!(result.score, 100.0);
    assert_eq!(result.wcag_level, ComplianceTier::AAA);
    assert!(result.passed("color-contrast"));
    assert!(result.passed("video-captions"));
}

#[test]
fn test_inaccessible_fixture() {
    let result = audit("inaccessible.html");

    for id in [
        "skip-links-missing",
        "heading-level-skipped",
        "main-missing",
        "language-missing",
        "title-missing",
        "image-alt-missing",
        "color-contrast-failed",
        "form-labels-missing",
        "button-labels-missing",
        "link-text-unhelpful",
        "video-captions-missing",
        "media-controls-missing",
        "table-headers-missing",
        "iframe-titles-missing",
        "html-structure-invalid",
        "keyboard-unreachable",
        "tabindex-positive",
        "aria-hidden-focusable",
        "form-no-submit",
    ] {
        assert_eq!(
            result.violations_with_id(id).len(),
            1,
            "expected one {} violation",
            id
        );
    }

    assert!(result.has_critical());
    assert_eq!(result.score, 0.0);
    assert_eq!(result.wcag_level, ComplianceTier::NonCompliant);

    let labels = &result.violations_with_id("form-labels-missing")[0];
    assert_eq!(labels.affected_nodes.len(), 1, "labelled search input must not be flagged");
}

#[test]
fn test_partial_fixture() {
    let result = audit("partial.html");

    let ids: Vec<&str> = result.violations.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["skip-links-missing", "contentinfo-missing"]);
    assert!(result.by_impact(Impact::Critical).is_empty());
    assert_eq!(result.incomplete[0].id, "image-alt-empty");
    assert_eq!(result.wcag_level, ComplianceTier::A);
}

#[test]
fn test_contrast_policy_changes_outcome() {
    let html = r#"<!DOCTYPE html><html lang="en"><head><title>t</title></head>
        <body><p style="color: #767676; background-color: #ffffff">Body text</p></body></html>"#;
    let doc = Document::parse(html);

    let aaa = Auditor::new(AuditConfig::default()).run(&doc);
    assert_eq!(aaa.violations_with_id("color-contrast-failed").len(), 1);

    let config = AuditConfig {
        contrast_policy: ContrastPolicy::Aa,
        ..AuditConfig::default()
    };
    let aa = Auditor::new(config).run(&doc);
    assert!(aa.violations_with_id("color-contrast-failed").is_empty());
}

#[test]
fn test_json_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let result = audit("inaccessible.html");

    let path = report::export(&result, dir.path(), OutputFormat::Json).unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("accessibility-audit-") && name.ends_with(".json"));

    let imported = report::import_json(&path).unwrap();
    assert_eq!(imported, result);
}

#[test]
fn test_html_export() {
    let dir = tempfile::tempdir().unwrap();
    let result = audit("inaccessible.html");

    let path = report::export(&result, dir.path(), OutputFormat::Html).unwrap();
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("class=\"score poor\""));
    assert!(html.contains("image-alt-missing"));
}

#[test]
fn test_file_store_keeps_last_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut auditor = Auditor::new(AuditConfig::default())
        .with_store(Box::new(FileStore::open(dir.path())));

    auditor.audit_file(&fixture("inaccessible.html")).unwrap();
    let last = auditor.audit_file(&fixture("accessible.html")).unwrap();

    let reopened = FileStore::open(dir.path());
    let stored = store::load_report(&reopened).unwrap().unwrap();
    assert_eq!(stored, last);
}

#[test]
fn test_repair_then_audit() {
    let source = std::fs::read_to_string(fixture("partial.html")).unwrap();
    let outcome = repair::repair(&source, &RepairConfig::default()).unwrap();
    assert!(outcome.changed());

    let result = Auditor::new(AuditConfig::default()).run(&Document::parse(outcome.html));
    assert!(result.passed("skip-links"));
    assert!(result.violations_with_id("skip-links-missing").is_empty());
    assert!(result.violations_with_id("skip-link-target-missing").is_empty());
}

#[test]
fn test_scan_fixture_directory() {
    let mut auditor = Auditor::new(AuditConfig::default());
    let results = scanner::scan_directory(&fixture(""), &mut auditor);
    assert_eq!(results.len(), 3);
}
