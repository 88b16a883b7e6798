// SPDX-License-Identifier: PMPL-1.0-or-later
//! Parsed HTML document under audit.
//!
//! Wraps the source text and its `scraper` tree. Selector queries return
//! [`Result`] so that a bad selector fails the check that issued it instead
//! of aborting the run.

use crate::error::{AuditError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An HTML document and its parse tree
pub struct Document {
    source: String,
    html: Html,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .finish()
    }
}

impl Document {
    /// Parse a document from source text
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let html = Html::parse_document(&source);
        Self { source, html, path: None }
    }

    /// Read and parse a document from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::parse(source).with_path(path.to_path_buf()))
    }

    /// Record where the document came from
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Display name used in reports
    pub fn source_name(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.display().to_string())
    }

    /// The `<html>` element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Every element, in document order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html.root_element().descendants().filter_map(ElementRef::wrap)
    }

    /// All elements matching `selector`, in document order
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).collect())
    }

    /// First element matching `selector`
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next())
    }

    /// Whether any element matches `selector`
    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.select_first(selector)?.is_some())
    }

    /// Trimmed `<title>` text, if present and non-empty
    pub fn title(&self) -> Option<String> {
        let sel = parse_selector("title").ok()?;
        let title = self.html.select(&sel).next()?;
        let text = collapse_whitespace(&text_content(&title));
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// `lang` attribute of the root element
    pub fn lang(&self) -> Option<&str> {
        self.root().value().attr("lang")
    }

    /// Whether the source declares a doctype
    pub fn has_doctype(&self) -> bool {
        self.html.tree.root().children().any(|n| n.value().is_doctype())
    }

    /// Whether the source text spells out an element (the parser synthesizes
    /// `<head>` and `<body>` when they are missing)
    pub fn declares_element(&self, tag: &str) -> bool {
        Regex::new(&format!(r"(?i)<{}[\s>/]", regex::escape(tag)))
            .map(|re| re.is_match(&self.source))
            .unwrap_or(false)
    }

    /// Every `id` attribute in the document
    pub fn ids(&self) -> HashSet<&str> {
        self.html
            .tree
            .nodes()
            .filter_map(|n| n.value().as_element())
            .filter_map(|e| e.attr("id"))
            .collect()
    }

    /// Every `for` attribute on a `<label>`
    pub fn label_targets(&self) -> HashSet<&str> {
        self.html
            .tree
            .nodes()
            .filter_map(|n| n.value().as_element())
            .filter(|e| e.name() == "label")
            .filter_map(|e| e.attr("for"))
            .collect()
    }

    /// Contents of every inline `<style>` block
    pub fn stylesheets(&self) -> Vec<String> {
        match parse_selector("style") {
            Ok(sel) => self.html.select(&sel).map(|s| text_content(&s)).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Parse a CSS selector, mapping failures into [`AuditError::Selector`]
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AuditError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// All descendant text of an element
pub fn text_content(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text of an element's direct text children only
pub fn own_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|n| n.value().as_text())
        .map(|t| &**t)
        .collect::<String>()
}

/// Collapse runs of whitespace and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-empty, trimmed attribute value
pub fn non_empty_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First following sibling that is an element
pub fn next_element_sibling<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Whether any ancestor is the named element
pub fn has_ancestor(element: &ElementRef<'_>, tag: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == tag)
}
