// SPDX-License-Identifier: PMPL-1.0-or-later
//! Computed style resolution for static HTML.
//!
//! Without a layout engine the style sources are user-agent defaults, the
//! rule blocks of `<style>` elements, and inline `style` attributes, applied
//! in that order. `color`, `font-size` and `font-weight` inherit from the
//! parent; backgrounds do not.
//!
//! Stylesheet rules are ordered by selector specificity, then source order.
//! At-rules (`@media`, `@supports`, ...) are conditional and skipped, and
//! `!important` is ignored.

use crate::color::{parse_color, Color};
use crate::document::{parse_selector, Document};
use regex::Regex;
use scraper::{ElementRef, Selector};

/// Default root font size in CSS pixels
pub const DEFAULT_FONT_PX: f64 = 16.0;

/// Elements that never render text
const NON_RENDERED: &[&str] = &["head", "script", "style", "noscript", "template", "title"];

/// A resolved or unresolvable color declaration
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Resolved(Color),
    /// Raw declaration that could not be parsed
    Unparsed(String),
}

impl ColorValue {
    pub fn resolved(&self) -> Option<Color> {
        match self {
            ColorValue::Resolved(c) => Some(*c),
            ColorValue::Unparsed(_) => None,
        }
    }
}

/// Style properties relevant to contrast checking
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub color: ColorValue,
    /// Own background; `None` when not declared
    pub background: Option<ColorValue>,
    pub font_size_px: f64,
    pub font_weight: u16,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            color: ColorValue::Resolved(Color::BLACK),
            background: None,
            font_size_px: DEFAULT_FONT_PX,
            font_weight: 400,
        }
    }
}

impl ComputedStyle {
    /// Whether a background is declared and not fully transparent
    pub fn has_background(&self) -> bool {
        match &self.background {
            None => false,
            Some(ColorValue::Resolved(c)) => !c.is_transparent(),
            Some(ColorValue::Unparsed(_)) => true,
        }
    }
}

/// An element paired with its computed style
#[derive(Debug, Clone)]
pub struct StyledElement<'a> {
    pub element: ElementRef<'a>,
    pub style: ComputedStyle,
}

/// One selector of a stylesheet rule with its declarations
#[derive(Debug, Clone)]
struct StyleRule {
    selector: Selector,
    specificity: (u32, u32, u32),
    order: usize,
    declarations: Vec<(String, String)>,
}

/// Rules collected from the document's `<style>` elements
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    /// Parse CSS text into rules. Unsupported selectors are dropped.
    pub fn parse(css: &str) -> Self {
        let comment_re = Regex::new(r"(?s)/\*.*?\*/").expect("valid regex");
        let block_re = Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("valid regex");

        let css = strip_at_rules(&comment_re.replace_all(css, ""));
        let mut rules = Vec::new();
        for caps in block_re.captures_iter(&css) {
            let decls = declarations(&caps[2]);
            if decls.is_empty() {
                continue;
            }
            for selector in caps[1].split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let Ok(parsed) = parse_selector(selector) else {
                    continue;
                };
                rules.push(StyleRule {
                    selector: parsed,
                    specificity: specificity(selector),
                    order: rules.len(),
                    declarations: decls.clone(),
                });
            }
        }
        rules.sort_by_key(|r| (r.specificity, r.order));
        Self { rules }
    }

    /// Stylesheet of every `<style>` element in the document
    pub fn from_document(doc: &Document) -> Self {
        Self::parse(&doc.stylesheets().join("\n"))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declarations that apply to `element`, lowest precedence first
    pub fn declarations_for(&self, element: &ElementRef<'_>) -> Vec<(String, String)> {
        self.rules
            .iter()
            .filter(|r| r.selector.matches(element))
            .flat_map(|r| r.declarations.iter().cloned())
            .collect()
    }
}

/// Remove at-rules and their blocks, keeping top-level rule blocks
fn strip_at_rules(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars();
    while let Some(ch) = chars.next() {
        if ch != '@' {
            out.push(ch);
            continue;
        }
        // an at-rule ends at `;` or at the close of its block
        let mut depth = 0usize;
        for c in chars.by_ref() {
            match c {
                ';' if depth == 0 => break,
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    out
}

/// Approximate (id, class, type) specificity of a single selector
fn specificity(selector: &str) -> (u32, u32, u32) {
    let (mut ids, mut classes, mut types) = (0, 0, 0);
    let mut prev = ' ';
    let mut in_attr = false;
    let mut chars = selector.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_attr {
            in_attr = ch != ']';
            prev = ch;
            continue;
        }
        match ch {
            '#' => ids += 1,
            '.' => classes += 1,
            '[' => {
                classes += 1;
                in_attr = true;
            }
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                    types += 1;
                } else {
                    classes += 1;
                }
                // skip the pseudo name so it is not counted as a type
                while chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '-') {
                    chars.next();
                }
            }
            c if c.is_ascii_alphabetic()
                && matches!(prev, ' ' | '>' | '+' | '~' | '(') =>
            {
                types += 1;
            }
            _ => {}
        }
        prev = ch;
    }
    (ids, classes, types)
}

/// Resolve styles for every rendered element, in document order
pub fn compute(doc: &Document) -> Vec<StyledElement<'_>> {
    let sheet = StyleSheet::from_document(doc);
    let root = doc.root();
    let root_style = cascade(&ComputedStyle::default(), &root, DEFAULT_FONT_PX, &sheet);
    let root_px = root_style.font_size_px;

    let mut out = Vec::new();
    let mut stack = vec![(root, root_style)];

    while let Some((element, style)) = stack.pop() {
        let children: Vec<ElementRef<'_>> = element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| !NON_RENDERED.contains(&c.value().name()))
            .collect();
        for child in children.into_iter().rev() {
            let child_style = cascade(&style, &child, root_px, &sheet);
            stack.push((child, child_style));
        }
        out.push(StyledElement { element, style });
    }

    out
}

/// Split a declaration block into lowercase property/value pairs
pub fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim().to_string();
            if prop.is_empty() || value.is_empty() {
                None
            } else {
                Some((prop, value))
            }
        })
        .collect()
}

/// User-agent defaults: (font-size in em, bold)
fn tag_defaults(tag: &str) -> (Option<f64>, bool) {
    match tag {
        "h1" => (Some(2.0), true),
        "h2" => (Some(1.5), true),
        "h3" => (Some(1.17), true),
        "h4" => (Some(1.0), true),
        "h5" => (Some(0.83), true),
        "h6" => (Some(0.67), true),
        "b" | "strong" | "th" => (None, true),
        "small" => (Some(0.833), false),
        _ => (None, false),
    }
}

/// Compute an element's style from its parent's
fn cascade(
    parent: &ComputedStyle,
    element: &ElementRef<'_>,
    root_px: f64,
    sheet: &StyleSheet,
) -> ComputedStyle {
    let mut style = ComputedStyle {
        color: parent.color.clone(),
        background: None,
        font_size_px: parent.font_size_px,
        font_weight: parent.font_weight,
    };

    let (em, bold) = tag_defaults(element.value().name());
    if let Some(em) = em {
        style.font_size_px = parent.font_size_px * em;
    }
    if bold {
        style.font_weight = 700;
    }

    let mut applied = sheet.declarations_for(element);
    if let Some(inline) = element.value().attr("style") {
        applied.extend(declarations(inline));
    }

    for (prop, value) in applied {
        match prop.as_str() {
            "font-size" => {
                if let Some(px) = parse_font_size(&value, parent.font_size_px, root_px) {
                    style.font_size_px = px;
                }
            }
            "font-weight" => {
                if let Some(w) = normalize_font_weight(&value, parent.font_weight) {
                    style.font_weight = w;
                }
            }
            "color" => {
                style.color = match value.to_ascii_lowercase().as_str() {
                    "inherit" | "currentcolor" | "unset" => parent.color.clone(),
                    "initial" => ColorValue::Resolved(Color::BLACK),
                    _ => match parse_color(&value) {
                        Some(c) => ColorValue::Resolved(c),
                        None => ColorValue::Unparsed(value.clone()),
                    },
                };
            }
            "background-color" | "background" => {
                style.background = parse_background(&value, &style.color);
            }
            _ => {}
        }
    }

    style
}

/// Extract the color layer of a `background`/`background-color` value
fn parse_background(value: &str, current: &ColorValue) -> Option<ColorValue> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "none" | "initial" | "unset" | "inherit" => return None,
        "currentcolor" => return Some(current.clone()),
        _ => {}
    }
    if let Some(c) = parse_color(&lower) {
        return Some(ColorValue::Resolved(c));
    }
    let has_image = lower.contains("url(") || lower.contains("gradient(");
    if !has_image {
        if let Some(c) = split_tokens(&lower).into_iter().find_map(parse_color) {
            return Some(ColorValue::Resolved(c));
        }
    }
    Some(ColorValue::Unparsed(value.to_string()))
}

/// Split on whitespace outside parentheses
fn split_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&value[s..]);
    }
    tokens
}

/// Resolve a `font-size` value to CSS pixels
pub fn parse_font_size(value: &str, parent_px: f64, root_px: f64) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    let keyword = match v.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "xxx-large" => Some(48.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        "inherit" | "unset" => Some(parent_px),
        "initial" => Some(DEFAULT_FONT_PX),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    let split = v
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(v.len());
    let (number, unit) = v.split_at(split);
    let n: f64 = number.parse().ok()?;
    if n < 0.0 {
        return None;
    }
    let px = match unit {
        "px" => n,
        "" if n == 0.0 => 0.0,
        "pt" => n * 4.0 / 3.0,
        "pc" => n * 16.0,
        "in" => n * 96.0,
        "cm" => n * 96.0 / 2.54,
        "mm" => n * 96.0 / 25.4,
        "em" => n * parent_px,
        "rem" => n * root_px,
        "%" => n / 100.0 * parent_px,
        _ => return None,
    };
    Some(px)
}

/// Normalize a `font-weight` value to its numeric form
pub fn normalize_font_weight(value: &str, parent: u16) -> Option<u16> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" | "initial" => Some(400),
        "bold" => Some(700),
        "inherit" | "unset" => Some(parent),
        "bolder" => Some(match parent {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        }),
        "lighter" => Some(match parent {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        }),
        other => {
            let n: f64 = other.parse().ok()?;
            if (1.0..=1000.0).contains(&n) {
                Some(n.round() as u16)
            } else {
                None
            }
        }
    }
}
