// SPDX-License-Identifier: PMPL-1.0-or-later
//! Directory scanner for auditing every page in a site tree.
//!
//! Walks directory trees, identifies HTML files, and audits each one.

use crate::auditor::Auditor;
use crate::result::AuditResult;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// File extensions to scan
const SCANNABLE_EXTENSIONS: &[&str] = &["html", "htm"];

/// Directories to skip
const SKIP_DIRS: &[&str] = &[
    "node_modules", ".git", "target", "dist", "build",
    "_build", "vendor", ".next", ".nuxt", "coverage",
];

/// HTML files below `dir`, sorted by path
pub fn find_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden and excluded directories
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() && e.depth() > 0 {
                return !SKIP_DIRS.contains(&name) && !name.starts_with('.');
            }
            true
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SCANNABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    files
}

/// Export directory for one scanned page, mirroring its path below `root`.
///
/// `blog/index.html` maps to `<export_root>/blog/index_html`, so pages that
/// share a file stem never share an export directory.
pub fn page_export_dir(export_root: &Path, root: &Path, page: &Path) -> PathBuf {
    let relative = page.strip_prefix(root).unwrap_or(page);
    let mut out = export_root.to_path_buf();
    if let Some(parent) = relative.parent() {
        out.extend(parent.components().filter(|c| matches!(c, Component::Normal(_))));
    }
    match relative.file_name().and_then(|n| n.to_str()) {
        Some(name) => out.join(name.replace('.', "_")),
        None => out,
    }
}

/// Audit every HTML file below `dir`. Unreadable files are logged and skipped.
pub fn scan_directory(dir: &Path, auditor: &mut Auditor) -> Vec<AuditResult> {
    info!("Scanning directory: {}", dir.display());

    let mut results = Vec::new();
    for path in find_html_files(dir) {
        match auditor.audit_file(&path) {
            Ok(result) => results.push(result),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let violations: usize = results.iter().map(|r| r.violations.len()).sum();
    info!("Scanned {} files, found {} violations", results.len(), violations);

    results
}
