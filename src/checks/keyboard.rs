// SPDX-License-Identifier: PMPL-1.0-or-later
//! Keyboard and assistive technology checks - WCAG 2.1.1 Keyboard,
//! 2.4.3 Focus Order, 4.1.2 Name, Role, Value
//!
//! - The page has something to focus
//! - Click handlers sit on elements a keyboard can reach
//! - No positive tabindex values (disrupts natural tab order)
//! - aria-hidden never hides focusable content
//! - Only ARIA 1.2 attributes are used

use super::{describe_all, plural, CheckContext};
use crate::error::Result;
use crate::result::{Accumulator, Impact, Pass, Violation};
use scraper::ElementRef;
use std::collections::BTreeSet;

/// Controls that lose focusability when `disabled`
const DISABLEABLE: &[&str] = &["button", "input", "select", "textarea"];

/// States and properties defined by WAI-ARIA 1.2
const ARIA_ATTRIBUTES: &[&str] = &[
    "aria-activedescendant",
    "aria-atomic",
    "aria-autocomplete",
    "aria-braillelabel",
    "aria-brailleroledescription",
    "aria-busy",
    "aria-checked",
    "aria-colcount",
    "aria-colindex",
    "aria-colindextext",
    "aria-colspan",
    "aria-controls",
    "aria-current",
    "aria-describedby",
    "aria-description",
    "aria-details",
    "aria-disabled",
    "aria-dropeffect",
    "aria-errormessage",
    "aria-expanded",
    "aria-flowto",
    "aria-grabbed",
    "aria-haspopup",
    "aria-hidden",
    "aria-invalid",
    "aria-keyshortcuts",
    "aria-label",
    "aria-labelledby",
    "aria-level",
    "aria-live",
    "aria-modal",
    "aria-multiline",
    "aria-multiselectable",
    "aria-orientation",
    "aria-owns",
    "aria-placeholder",
    "aria-posinset",
    "aria-pressed",
    "aria-readonly",
    "aria-relevant",
    "aria-required",
    "aria-roledescription",
    "aria-rowcount",
    "aria-rowindex",
    "aria-rowindextext",
    "aria-rowspan",
    "aria-selected",
    "aria-setsize",
    "aria-sort",
    "aria-valuemax",
    "aria-valuemin",
    "aria-valuenow",
    "aria-valuetext",
];

fn tabindex(element: &ElementRef<'_>) -> Option<i32> {
    element
        .value()
        .attr("tabindex")
        .and_then(|t| t.trim().parse::<i32>().ok())
}

/// Whether an element takes part in sequential keyboard navigation
pub fn is_focusable(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    let index = tabindex(element);
    if index.is_some_and(|t| t < 0) {
        return false;
    }

    let name = value.name();
    if DISABLEABLE.contains(&name) && value.attr("disabled").is_some() {
        return false;
    }

    let native = match name {
        "a" | "area" => value.attr("href").is_some(),
        "button" | "select" | "textarea" | "iframe" | "summary" => true,
        "input" => !value
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden")),
        _ => false,
    };

    native
        || index.is_some()
        || value
            .attr("contenteditable")
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
}

/// Whether an element or one of its ancestors carries `aria-hidden="true"`
pub fn is_aria_hidden(element: &ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            el.value()
                .attr("aria-hidden")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        })
}

pub fn focus_management(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let focusable = ctx.document.elements().filter(is_focusable).count();

    if focusable > 0 {
        return Ok(Some(Pass::new(
            "focus-management",
            format!("Found {}", plural(focusable, "focusable element")),
        )));
    }

    acc.add_violation(Violation::new(
        "no-focusable",
        "No focusable elements found",
        Impact::Critical,
        "Ensure interactive elements are keyboard accessible",
    ));
    Ok(None)
}

pub fn keyboard_navigation(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let mut reachable = 0;
    let mut unreachable = Vec::new();
    let mut positive = Vec::new();

    for el in ctx.document.elements() {
        let focusable = is_focusable(&el);
        if focusable {
            reachable += 1;
        }
        if el.value().attr("onclick").is_some() && !focusable {
            unreachable.push(el);
        }
        if tabindex(&el).is_some_and(|t| t > 0) {
            positive.push(el);
        }
    }

    if !unreachable.is_empty() {
        acc.add_violation(
            Violation::new(
                "keyboard-unreachable",
                &format!(
                    "{} with click handlers cannot receive keyboard focus",
                    plural(unreachable.len(), "element")
                ),
                Impact::Serious,
                "Use a <button>, or add role=\"button\" tabindex=\"0\" and a key handler",
            )
            .with_nodes(describe_all(&unreachable)),
        );
    }

    if !positive.is_empty() {
        acc.add_violation(
            Violation::new(
                "tabindex-positive",
                &format!("{} with positive tabindex", plural(positive.len(), "element")),
                Impact::Minor,
                "Remove the tabindex attribute or use tabindex=\"0\" to follow document order",
            )
            .with_nodes(describe_all(&positive)),
        );
    }

    if unreachable.is_empty() && positive.is_empty() {
        return Ok(Some(Pass::new(
            "keyboard-navigation",
            format!("{} found", plural(reachable, "keyboard-navigable element")),
        )));
    }
    Ok(None)
}

pub fn aria_attributes(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let mut with_aria = 0;
    let mut hidden_focusable = Vec::new();
    let mut unknown_nodes = Vec::new();
    let mut unknown_names = BTreeSet::new();

    for el in ctx.document.elements() {
        let mut uses_aria = false;
        let mut has_unknown = false;
        for (name, _) in el.value().attrs() {
            if !name.starts_with("aria-") {
                continue;
            }
            uses_aria = true;
            if !ARIA_ATTRIBUTES.contains(&name) {
                has_unknown = true;
                unknown_names.insert(name.to_string());
            }
        }
        if uses_aria {
            with_aria += 1;
        }
        if has_unknown {
            unknown_nodes.push(el);
        }
        if is_focusable(&el) && is_aria_hidden(&el) {
            hidden_focusable.push(el);
        }
    }

    if !hidden_focusable.is_empty() {
        acc.add_violation(
            Violation::new(
                "aria-hidden-focusable",
                &format!(
                    "aria-hidden=\"true\" hides {}",
                    plural(hidden_focusable.len(), "focusable element")
                ),
                Impact::Critical,
                "Remove aria-hidden from focusable elements",
            )
            .with_nodes(describe_all(&hidden_focusable)),
        );
    }

    if !unknown_nodes.is_empty() {
        let names: Vec<String> = unknown_names.into_iter().collect();
        acc.add_violation(
            Violation::new(
                "aria-attribute-unknown",
                &format!("Unknown ARIA attributes: {}", names.join(", ")),
                Impact::Minor,
                "Use only attributes defined by WAI-ARIA 1.2",
            )
            .with_nodes(describe_all(&unknown_nodes)),
        );
    }

    if hidden_focusable.is_empty() && unknown_nodes.is_empty() {
        return Ok(Some(Pass::new(
            "aria-attributes",
            format!("ARIA attributes valid on {}", plural(with_aria, "element")),
        )));
    }
    Ok(None)
}

pub fn screen_reader_support(ctx: &CheckContext<'_>, _acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let live_regions = doc.exists("[aria-live], [aria-atomic], [aria-relevant]")?;
    let labels = doc.exists("[aria-label], [aria-labelledby]")?;

    Ok(Some(Pass::new(
        "screen-reader-support",
        format!(
            "Screen reader support: {}, {}",
            if live_regions { "live regions" } else { "no live regions" },
            if labels { "ARIA labels" } else { "no ARIA labels" }
        ),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckFn;
    use crate::config::AuditConfig;
    use crate::document::Document;

    fn run(check: CheckFn, html: &str) -> (Accumulator, Option<Pass>) {
        let doc = Document::parse(html);
        let config = AuditConfig::default();
        let ctx = CheckContext::new(&doc, &config);
        let mut acc = Accumulator::new();
        let pass = check(&ctx, &mut acc).expect("check runs");
        (acc, pass)
    }

    fn focusable(fragment: &str) -> bool {
        let doc = Document::parse(format!("<body>{}</body>", fragment));
        let el = doc
            .select_first("body > *")
            .unwrap()
            .expect("fragment has an element");
        is_focusable(&el)
    }

    #[test]
    fn test_is_focusable() {
        assert!(focusable(r#"<a href="/">x</a>"#));
        assert!(!focusable("<a>anchor</a>"));
        assert!(focusable("<button>Go</button>"));
        assert!(!focusable("<button disabled>Go</button>"));
        assert!(focusable("<input>"));
        assert!(!focusable(r#"<input type="hidden">"#));
        assert!(focusable(r#"<div tabindex="0">x</div>"#));
        assert!(!focusable(r#"<button tabindex="-1">x</button>"#));
        assert!(focusable(r#"<div contenteditable>x</div>"#));
        assert!(!focusable(r#"<div contenteditable="false">x</div>"#));
        assert!(!focusable("<div>x</div>"));
    }

    #[test]
    fn test_no_focusable() {
        let (acc, pass) = run(focus_management, "<p>Just text</p>");
        assert_eq!(acc.violations()[0].id, "no-focusable");
        assert!(pass.is_none());

        let (acc, pass) = run(focus_management, r#"<a href="/">Home</a>"#);
        assert!(acc.violations().is_empty());
        assert_eq!(pass.unwrap().description, "Found 1 focusable element");
    }

    #[test]
    fn test_click_handler_without_focus() {
        let (acc, _) = run(
            keyboard_navigation,
            r#"<div onclick="go()">Go</div>
               <div role="button" tabindex="0" onclick="go()">Go</div>
               <button onclick="go()">Go</button>"#,
        );
        let v = &acc.violations()[0];
        assert_eq!(v.id, "keyboard-unreachable");
        assert_eq!(v.impact, Impact::Serious);
        assert_eq!(v.affected_nodes.len(), 1);
    }

    #[test]
    fn test_positive_tabindex() {
        let (acc, pass) = run(keyboard_navigation, r#"<input tabindex="3"><a href="/">x</a>"#);
        assert!(pass.is_none());
        assert_eq!(acc.violations().len(), 1);
        assert_eq!(acc.violations()[0].id, "tabindex-positive");
        assert_eq!(acc.violations()[0].impact, Impact::Minor);
    }

    #[test]
    fn test_aria_hidden_focusable() {
        let (acc, _) = run(
            aria_attributes,
            r#"<div aria-hidden="true"><a href="/">hidden link</a></div>
               <span aria-hidden="true">decoration</span>"#,
        );
        assert_eq!(acc.violations().len(), 1);
        assert_eq!(acc.violations()[0].id, "aria-hidden-focusable");
        assert_eq!(acc.violations()[0].affected_nodes[0].tag, "a");
    }

    #[test]
    fn test_unknown_aria_attribute() {
        let (acc, pass) = run(
            aria_attributes,
            r#"<button aria-labell="Close">x</button><nav aria-label="Main"></nav>"#,
        );
        assert!(pass.is_none());
        assert_eq!(acc.violations()[0].id, "aria-attribute-unknown");
        assert_eq!(acc.violations()[0].description, "Unknown ARIA attributes: aria-labell");

        let (acc, pass) = run(aria_attributes, r#"<nav aria-label="Main"></nav>"#);
        assert!(acc.violations().is_empty());
        assert_eq!(pass.unwrap().description, "ARIA attributes valid on 1 element");
    }

    #[test]
    fn test_screen_reader_support_is_informational() {
        let (acc, pass) = run(screen_reader_support, r#"<div aria-live="polite"></div>"#);
        assert!(acc.violations().is_empty());
        assert_eq!(
            pass.unwrap().description,
            "Screen reader support: live regions, no ARIA labels"
        );
    }
}
