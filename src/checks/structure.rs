// SPDX-License-Identifier: PMPL-1.0-or-later
//! Document structure checks - WCAG 1.3.1 Info and Relationships, 2.4.1 Bypass Blocks,
//! 2.4.2 Page Titled, 3.1.1 Language of Page, 4.1.2 Name, Role, Value (iframes)

use super::{describe_all, plural, verb, CheckContext};
use crate::document::{non_empty_attr, parse_selector, text_content};
use crate::error::Result;
use crate::result::{Accumulator, Impact, Pass, Violation};
use scraper::ElementRef;

/// Whether an element looks like a skip link
pub fn is_skip_link(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if value.classes().any(|c| c.to_ascii_lowercase().contains("skip")) {
        return true;
    }
    let in_page = value.attr("href").is_some_and(|h| h.starts_with('#'));
    in_page && text_content(element).to_lowercase().contains("skip")
}

pub fn skip_links(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let links: Vec<ElementRef<'_>> = doc
        .select("a[href^=\"#\"], .skip-link")?
        .into_iter()
        .filter(is_skip_link)
        .collect();

    if links.is_empty() {
        acc.add_violation(Violation::new(
            "skip-links-missing",
            "Skip links missing",
            Impact::Moderate,
            "Add skip links to allow keyboard users to bypass navigation, e.g. <a href=\"#main-content\" class=\"skip-link\">Skip to main content</a>",
        ));
        return Ok(None);
    }

    let ids = doc.ids();
    let broken: Vec<ElementRef<'_>> = links
        .iter()
        .filter(|link| {
            match link.value().attr("href").and_then(|h| h.strip_prefix('#')) {
                Some(target) if !target.is_empty() => !ids.contains(target),
                _ => false,
            }
        })
        .copied()
        .collect();

    if !broken.is_empty() {
        acc.add_violation(
            Violation::new(
                "skip-link-target-missing",
                &format!(
                    "{} {} at a missing target",
                    plural(broken.len(), "skip link"),
                    verb(broken.len(), "points", "point")
                ),
                Impact::Moderate,
                "Give the skip link target (e.g. <main>) a matching id",
            )
            .with_nodes(describe_all(&broken)),
        );
        return Ok(None);
    }

    Ok(Some(Pass::new(
        "skip-links",
        format!("Found {} for keyboard navigation", plural(links.len(), "skip link")),
    )))
}

pub fn heading_hierarchy(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let headings = ctx.document.select("h1, h2, h3, h4, h5, h6")?;
    let mut previous = 0u8;
    let mut jumps = 0;

    for heading in &headings {
        let level = heading
            .value()
            .name()
            .strip_prefix('h')
            .and_then(|n| n.parse::<u8>().ok())
            .unwrap_or(previous);

        if level > previous + 1 {
            jumps += 1;
            acc.add_violation(
                Violation::new(
                    "heading-level-skipped",
                    &format!("Heading level jump from h{} to h{}", previous, level),
                    Impact::Moderate,
                    &format!(
                        "Use <h{}> instead of <h{}>, or add the intermediate heading levels",
                        previous + 1,
                        level
                    ),
                )
                .with_nodes(describe_all(std::slice::from_ref(heading))),
            );
        }
        previous = level;
    }

    let h1s: Vec<_> = headings.iter().filter(|h| h.value().name() == "h1").copied().collect();
    if h1s.is_empty() {
        acc.add_violation(Violation::new(
            "heading-h1-missing",
            "Page has no h1 element",
            Impact::Serious,
            "Give the page exactly one <h1> describing its content",
        ));
    } else if h1s.len() > 1 {
        acc.add_violation(
            Violation::new(
                "heading-h1-multiple",
                &format!("Page has {} h1 elements", h1s.len()),
                Impact::Moderate,
                "Keep a single <h1> and demote the others to <h2>",
            )
            .with_nodes(describe_all(&h1s[1..])),
        );
    }

    if jumps == 0 && h1s.len() == 1 {
        return Ok(Some(Pass::new(
            "heading-hierarchy",
            format!(
                "All {} {} proper hierarchy",
                plural(headings.len(), "heading"),
                verb(headings.len(), "follows", "follow")
            ),
        )));
    }
    Ok(None)
}

pub fn landmarks(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let has_main = doc.exists("main, [role=\"main\"]")?;
    let has_nav = doc.exists("nav, [role=\"navigation\"]")?;
    let has_banner = doc.exists("header, [role=\"banner\"]")?;
    let has_footer = doc.exists("footer, [role=\"contentinfo\"]")?;

    if has_main && has_nav && has_banner && has_footer {
        let count = doc
            .select(
                "[role=\"banner\"], [role=\"navigation\"], [role=\"main\"], [role=\"complementary\"], \
                 [role=\"contentinfo\"], header, nav, main, aside, footer",
            )?
            .len();
        return Ok(Some(Pass::new(
            "landmark-regions",
            format!(
                "Found {} (banner, navigation, main, contentinfo)",
                plural(count, "landmark region")
            ),
        )));
    }

    if !has_main {
        acc.add_violation(Violation::new(
            "main-missing",
            "Main landmark missing",
            Impact::Critical,
            "Add <main> element or role=\"main\"",
        ));
    }
    if !has_nav {
        acc.add_violation(Violation::new(
            "nav-missing",
            "Navigation landmark missing",
            Impact::Moderate,
            "Add <nav> element or role=\"navigation\"",
        ));
    }
    if !has_banner {
        acc.add_violation(Violation::new(
            "banner-missing",
            "Banner landmark missing",
            Impact::Minor,
            "Add <header> element or role=\"banner\"",
        ));
    }
    if !has_footer {
        acc.add_violation(Violation::new(
            "contentinfo-missing",
            "Contentinfo landmark missing",
            Impact::Minor,
            "Add <footer> element or role=\"contentinfo\"",
        ));
    }
    Ok(None)
}

pub fn language_attribute(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    match ctx.document.lang().map(str::trim).filter(|l| !l.is_empty()) {
        Some(lang) => Ok(Some(Pass::new(
            "language-attribute",
            format!("Document language set to: {}", lang),
        ))),
        None => {
            acc.add_violation(Violation::new(
                "language-missing",
                "HTML lang attribute missing",
                Impact::Critical,
                "Add lang attribute to html element",
            ));
            Ok(None)
        }
    }
}

/// Whether `tag` is a well-formed BCP 47 language tag (shape only)
pub fn is_valid_language_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or("");
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    subtags.all(|s| (1..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub fn page_language(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let Some(lang) = ctx.document.lang().map(str::trim).filter(|l| !l.is_empty()) else {
        // reported by language-attribute
        return Ok(None);
    };

    if is_valid_language_tag(lang) {
        return Ok(Some(Pass::new("page-language", format!("Page language: {}", lang))));
    }

    acc.add_violation(Violation::new(
        "page-language-invalid",
        &format!("Invalid page language \"{}\"", lang),
        Impact::Critical,
        "Set a valid language code (e.g. \"en\" or \"en-GB\")",
    ));
    Ok(None)
}

pub fn viewport_meta(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let configured = ctx
        .document
        .select("meta[name]")?
        .into_iter()
        .filter(|m| {
            m.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("viewport"))
        })
        .any(|m| {
            let content: String = m
                .value()
                .attr("content")
                .unwrap_or("")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            content.to_ascii_lowercase().contains("width=device-width")
        });

    if configured {
        return Ok(Some(Pass::new("viewport-meta", "Viewport meta tag properly configured")));
    }

    acc.add_violation(Violation::new(
        "viewport-invalid",
        "Invalid viewport meta tag",
        Impact::Moderate,
        "Add viewport meta tag with width=device-width",
    ));
    Ok(None)
}

pub fn document_title(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    match ctx.document.title() {
        Some(title) => Ok(Some(Pass::new(
            "document-title",
            format!("Document title: \"{}\"", title),
        ))),
        None => {
            acc.add_violation(Violation::new(
                "title-missing",
                "Document title missing",
                Impact::Critical,
                "Add a descriptive title to the document",
            ));
            Ok(None)
        }
    }
}

pub fn table_headers(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let th = parse_selector("th")?;
    let tables = ctx.document.select("table")?;
    let missing: Vec<ElementRef<'_>> = tables
        .iter()
        .filter(|t| t.select(&th).next().is_none())
        .copied()
        .collect();

    if missing.is_empty() {
        return Ok(Some(Pass::new(
            "table-headers",
            format!(
                "All {} {} headers",
                plural(tables.len(), "table"),
                verb(tables.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "table-headers-missing",
            &format!("{} missing headers", plural(missing.len(), "table")),
            Impact::Moderate,
            "Add <th> elements to all data tables, or use CSS grid/flexbox for layout",
        )
        .with_nodes(describe_all(&missing)),
    );
    Ok(None)
}

pub fn list_semantics(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let lists = doc.select("ul, ol, dl")?;
    let orphans: Vec<ElementRef<'_>> = doc
        .select("li")?
        .into_iter()
        .filter(|li| {
            let parent = li.parent().and_then(ElementRef::wrap);
            !parent.is_some_and(|p| matches!(p.value().name(), "ul" | "ol" | "menu"))
        })
        .collect();

    if !orphans.is_empty() {
        acc.add_violation(
            Violation::new(
                "list-item-orphaned",
                &format!("{} outside a list", plural(orphans.len(), "list item")),
                Impact::Minor,
                "Wrap <li> elements in <ul>, <ol> or <menu>",
            )
            .with_nodes(describe_all(&orphans)),
        );
        return Ok(None);
    }

    if lists.is_empty() {
        return Ok(None);
    }
    Ok(Some(Pass::new(
        "list-semantics",
        format!("Found {}", plural(lists.len(), "semantic list")),
    )))
}

pub fn iframe_titles(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let iframes = ctx.document.select("iframe")?;
    let untitled: Vec<ElementRef<'_>> = iframes
        .iter()
        .filter(|f| non_empty_attr(f, "title").is_none())
        .copied()
        .collect();

    if untitled.is_empty() {
        return Ok(Some(Pass::new(
            "iframe-titles",
            format!(
                "All {} {} titles",
                plural(iframes.len(), "iframe"),
                verb(iframes.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "iframe-titles-missing",
            &format!("{} missing titles", plural(untitled.len(), "iframe")),
            Impact::Moderate,
            "Add descriptive title attribute to all iframes",
        )
        .with_nodes(describe_all(&untitled)),
    );
    Ok(None)
}

pub fn html_structure(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let mut missing = Vec::new();
    if !doc.has_doctype() {
        missing.push("doctype");
    }
    if !doc.declares_element("head") {
        missing.push("<head>");
    }
    if !doc.declares_element("body") {
        missing.push("<body>");
    }

    if missing.is_empty() {
        return Ok(Some(Pass::new("html-structure", "HTML document structure is valid")));
    }

    acc.add_violation(Violation::new(
        "html-structure-invalid",
        &format!("Invalid HTML structure: missing {}", missing.join(", ")),
        Impact::Critical,
        "Ensure proper HTML5 document structure",
    ));
    Ok(None)
}
