// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessible name checks - WCAG 1.1.1 Non-text Content, 2.4.4 Link Purpose,
//! 3.3.2 Labels or Instructions, 4.1.2 Name, Role, Value
//!
//! Each element kind has its own naming predicate so the rules can be tested
//! without running a whole audit.

use super::{describe_all, plural, verb, CheckContext};
use crate::document::{collapse_whitespace, has_ancestor, non_empty_attr, text_content};
use crate::error::Result;
use crate::result::{Accumulator, Incomplete, Impact, Pass, Violation};
use scraper::ElementRef;
use std::collections::HashSet;

/// Input types that do not need a label
const EXEMPT_INPUT_TYPES: &[&str] = &["hidden", "submit", "reset", "button", "image"];

/// Link text that says nothing about the destination
const GENERIC_LINK_TEXT: &[&str] = &["click here", "read more", "more", "here", "link"];

/// Child elements that count as an icon label for buttons
const ICON_TAGS: &[&str] = &["i", "img", "svg"];

/// Lowercased `type` of an input, defaulting to `text`
fn input_type<'a>(element: &ElementRef<'a>) -> String {
    element
        .value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

/// Whether a form control is exempt from needing a label
pub fn is_label_exempt(control: &ElementRef<'_>) -> bool {
    control.value().name() == "input" && EXEMPT_INPUT_TYPES.contains(&input_type(control).as_str())
}

/// Whether a form control has a label: `aria-label`, `aria-labelledby`,
/// a `<label for>` matching its id, or a wrapping `<label>`
pub fn input_has_label(control: &ElementRef<'_>, label_targets: &HashSet<&str>) -> bool {
    if non_empty_attr(control, "aria-label").is_some()
        || non_empty_attr(control, "aria-labelledby").is_some()
    {
        return true;
    }
    if let Some(id) = non_empty_attr(control, "id") {
        if label_targets.contains(id) {
            return true;
        }
    }
    has_ancestor(control, "label")
}

fn has_descendant_tag(element: &ElementRef<'_>, tags: &[&str]) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|d| tags.contains(&d.value().name()))
}

/// Whether a button has text, `aria-label`, `aria-labelledby`, `title` or an icon
pub fn button_has_label(button: &ElementRef<'_>) -> bool {
    let has_text = if button.value().name() == "input" {
        non_empty_attr(button, "value").is_some()
    } else {
        !text_content(button).trim().is_empty()
    };
    has_text
        || non_empty_attr(button, "aria-label").is_some()
        || non_empty_attr(button, "aria-labelledby").is_some()
        || non_empty_attr(button, "title").is_some()
        || has_descendant_tag(button, ICON_TAGS)
}

/// The name a screen reader announces for a link: `aria-label`, then text,
/// then the alt text of a contained image, then `title`
pub fn link_accessible_name(link: &ElementRef<'_>) -> Option<String> {
    if let Some(label) = non_empty_attr(link, "aria-label") {
        return Some(collapse_whitespace(label));
    }
    let text = collapse_whitespace(&text_content(link));
    if !text.is_empty() {
        return Some(text);
    }
    let image_alt = link
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|d| d.value().name() == "img")
        .find_map(|img| non_empty_attr(&img, "alt").map(collapse_whitespace));
    image_alt.or_else(|| non_empty_attr(link, "title").map(collapse_whitespace))
}

/// Whether link text is on the generic denylist
pub fn is_generic_link_text(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    GENERIC_LINK_TEXT.contains(&lower.as_str())
}

/// Whether an image is explicitly decorative
pub fn is_presentational(img: &ElementRef<'_>) -> bool {
    img.value()
        .attr("role")
        .is_some_and(|r| r.split_whitespace().any(|t| t == "presentation" || t == "none"))
}

pub fn form_labels(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let doc = ctx.document;
    let targets = doc.label_targets();
    let controls: Vec<ElementRef<'_>> = doc
        .select("input, textarea, select")?
        .into_iter()
        .filter(|c| !is_label_exempt(c))
        .collect();
    let unlabeled: Vec<ElementRef<'_>> = controls
        .iter()
        .filter(|c| !input_has_label(c, &targets))
        .copied()
        .collect();

    if unlabeled.is_empty() {
        return Ok(Some(Pass::new(
            "form-labels",
            format!(
                "All {} {} labels",
                plural(controls.len(), "form input"),
                verb(controls.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "form-labels-missing",
            &format!("{} missing labels", plural(unlabeled.len(), "form input")),
            Impact::Critical,
            "Add labels to all form inputs",
        )
        .with_nodes(describe_all(&unlabeled)),
    );
    Ok(None)
}

pub fn button_labels(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let buttons = ctx
        .document
        .select("button, [role=\"button\"], input[type=\"button\"]")?;
    let unlabeled: Vec<ElementRef<'_>> = buttons
        .iter()
        .filter(|b| !button_has_label(b))
        .copied()
        .collect();

    if unlabeled.is_empty() {
        return Ok(Some(Pass::new(
            "button-labels",
            format!(
                "All {} {} accessible labels",
                plural(buttons.len(), "button"),
                verb(buttons.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "button-labels-missing",
            &format!("{} missing accessible labels", plural(unlabeled.len(), "button")),
            Impact::Critical,
            "Add aria-label, text, or title to all buttons",
        )
        .with_nodes(describe_all(&unlabeled)),
    );
    Ok(None)
}

pub fn link_text(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let links = ctx.document.select("a[href]")?;
    let unhelpful: Vec<ElementRef<'_>> = links
        .iter()
        .filter(|link| match link_accessible_name(link) {
            None => true,
            Some(name) => is_generic_link_text(&name),
        })
        .copied()
        .collect();

    if unhelpful.is_empty() {
        return Ok(Some(Pass::new(
            "link-text",
            format!(
                "All {} {} descriptive text",
                plural(links.len(), "link"),
                verb(links.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "link-text-unhelpful",
            &format!(
                "{} {} unhelpful text",
                plural(unhelpful.len(), "link"),
                verb(unhelpful.len(), "has", "have")
            ),
            Impact::Moderate,
            "Use descriptive link text instead of \"click here\" or \"more\"",
        )
        .with_nodes(describe_all(&unhelpful)),
    );
    Ok(None)
}

pub fn image_alt_text(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let images = ctx.document.select("img")?;
    let mut missing = Vec::new();
    let mut decorative = 0;
    let mut unconfirmed = Vec::new();

    for img in &images {
        match img.value().attr("alt") {
            None => missing.push(*img),
            Some(alt) if alt.trim().is_empty() => {
                decorative += 1;
                if !is_presentational(img) {
                    unconfirmed.push(*img);
                }
            }
            Some(_) => {}
        }
    }

    if !unconfirmed.is_empty() {
        acc.add_incomplete(
            Incomplete::new(
                "image-alt-empty",
                format!("{} empty alt text", plural(unconfirmed.len(), "image")),
                "Empty alt text is only correct for decorative images; add role=\"presentation\" to confirm",
            )
            .with_nodes(describe_all(&unconfirmed)),
        );
    }

    if missing.is_empty() {
        return Ok(Some(Pass::new(
            "image-alt-text",
            format!(
                "All {} {} alt text ({} decorative)",
                plural(images.len(), "image"),
                verb(images.len(), "has", "have"),
                decorative
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "image-alt-missing",
            &format!("{} missing alt text", plural(missing.len(), "image")),
            Impact::Critical,
            "Add alt=\"description\" for informative images or alt=\"\" for decorative images",
        )
        .with_nodes(describe_all(&missing)),
    );
    Ok(None)
}

/// Whether a form contains a control that submits it
pub fn has_submit_control(form: &ElementRef<'_>) -> bool {
    form.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| match el.value().name() {
            "button" => el
                .value()
                .attr("type")
                .map_or(true, |t| t.trim().eq_ignore_ascii_case("submit")),
            "input" => matches!(input_type(&el).as_str(), "submit" | "image"),
            _ => false,
        })
}

pub fn form_submit(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let forms = ctx.document.select("form")?;
    let unsubmittable: Vec<ElementRef<'_>> = forms
        .iter()
        .filter(|f| !has_submit_control(f))
        .copied()
        .collect();

    if unsubmittable.is_empty() {
        return Ok(Some(Pass::new(
            "forms-validated",
            format!("{} validated", plural(forms.len(), "form")),
        )));
    }

    acc.add_violation(
        Violation::new(
            "form-no-submit",
            &format!("{} missing a submit button", plural(unsubmittable.len(), "form")),
            Impact::Moderate,
            "Add submit button to form",
        )
        .with_nodes(describe_all(&unsubmittable)),
    );
    Ok(None)
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

    fn first<'a>(doc: &'a Document, selector: &str) -> ElementRef<'a> {
        doc.select_first(selector).unwrap().expect("element present")
    }

    #[test]
    fn test_input_label_predicate() {
        let doc = Document::parse(
            r#"<form>
                <label for="email">Email</label><input id="email">
                <label>Name <input id="name"></label>
                <input id="search" aria-label="Search">
                <input id="bare" type="text">
            </form>"#,
        );
        let targets = doc.label_targets();
        assert!(input_has_label(&first(&doc, "#email"), &targets));
        assert!(input_has_label(&first(&doc, "#name"), &targets));
        assert!(input_has_label(&first(&doc, "#search"), &targets));
        assert!(!input_has_label(&first(&doc, "#bare"), &targets));
    }

    #[test]
    fn test_unlabeled_text_input_single_violation() {
        let (acc, pass) = run(form_labels, r#"<form><input type="text"></form>"#);
        let missing: Vec<_> = acc.violations().iter().filter(|v| v.id == "form-labels-missing").collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].affected_nodes.len(), 1);
        assert!(pass.is_none());
    }

    #[test]
    fn test_hidden_input_needs_no_label() {
        let (acc, pass) = run(form_labels, r#"<form><input type="hidden"></form>"#);
        assert!(acc.violations().is_empty());
        assert!(pass.is_some());
    }

    #[test]
    fn test_button_label_predicate() {
        let doc = Document::parse(
            r#"<button id="text">Save</button>
               <button id="aria" aria-label="Close"></button>
               <button id="icon"><svg></svg></button>
               <button id="title" title="Menu"></button>
               <button id="empty">  </button>
               <input id="bare-input" type="button">"#,
        );
        assert!(button_has_label(&first(&doc, "#text")));
        assert!(button_has_label(&first(&doc, "#aria")));
        assert!(button_has_label(&first(&doc, "#icon")));
        assert!(button_has_label(&first(&doc, "#title")));
        assert!(!button_has_label(&first(&doc, "#empty")));
        assert!(!button_has_label(&first(&doc, "#bare-input")));
    }

    #[test]
    fn test_link_name_and_denylist() {
        let doc = Document::parse(
            r#"<a id="aria" href="/" aria-label="Home page">x</a>
               <a id="img" href="/"><img src="l.png" alt="Company logo"></a>
               <a id="empty" href="/"></a>"#,
        );
        assert_eq!(link_accessible_name(&first(&doc, "#aria")).as_deref(), Some("Home page"));
        assert_eq!(link_accessible_name(&first(&doc, "#img")).as_deref(), Some("Company logo"));
        assert_eq!(link_accessible_name(&first(&doc, "#empty")), None);
        assert!(is_generic_link_text("Click Here"));
        assert!(is_generic_link_text(" more "));
        assert!(!is_generic_link_text("More about pricing"));
    }

    #[test]
    fn test_link_text_check() {
        let (acc, _) = run(
            link_text,
            r#"<a href="/a">click here</a><a href="/b">Pricing</a><a href="/c"></a>"#,
        );
        assert_eq!(acc.violations().len(), 1);
        assert_eq!(acc.violations()[0].description, "2 links have unhelpful text");
        assert_eq!(acc.violations()[0].affected_nodes.len(), 2);
    }

    #[test]
    fn test_missing_alt_is_violation() {
        let (acc, _) = run(image_alt_text, r#"<img src="hero.png">"#);
        assert_eq!(acc.violations()[0].id, "image-alt-missing");
    }

    #[test]
    fn test_presentational_empty_alt_is_fine() {
        let (acc, pass) = run(image_alt_text, r#"<img src="line.png" alt="" role="presentation">"#);
        assert!(acc.violations().is_empty());
        assert!(acc.incomplete().is_empty());
        assert_eq!(pass.unwrap().description, "All 1 image has alt text (1 decorative)");
    }

    #[test]
    fn test_unconfirmed_empty_alt_is_incomplete() {
        let (acc, pass) = run(image_alt_text, r#"<img src="photo.png" alt="">"#);
        assert!(acc.violations().is_empty());
        assert_eq!(acc.incomplete()[0].id, "image-alt-empty");
        assert!(pass.is_some());
    }

    #[test]
    fn test_form_submit() {
        let (acc, _) = run(form_submit, r#"<form><input name="q"></form>"#);
        assert_eq!(acc.violations()[0].id, "form-no-submit");

        let (acc, pass) = run(form_submit, r#"<form><input name="q"><button>Go</button></form>"#);
        assert!(acc.violations().is_empty());
        assert!(pass.is_some());

        let (acc, _) = run(form_submit, r#"<form><button type="button">Toggle</button></form>"#);
        assert_eq!(acc.violations().len(), 1);
    }
}
