// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast evaluator - WCAG 1.4.3 Contrast (Minimum) / 1.4.6 Contrast (Enhanced)
//!
//! Evaluates every element that carries its own text on a declared,
//! non-transparent background.
//! - AAA: 7:1 for normal text, 4.5:1 for large text
//! - AA: 4.5:1 for normal text, 3:1 for large text
//!
//! Large text is at least 18px, or at least 14px at weight 700 or above.

use crate::color::{contrast_ratio, Color};
use crate::document::own_text;
use crate::result::AffectedNode;
use crate::style::{ColorValue, StyledElement};
use serde::{Deserialize, Serialize};

/// Which WCAG contrast thresholds apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastPolicy {
    /// 7:1 normal, 4.5:1 large
    #[default]
    Aaa,
    /// 4.5:1 normal, 3:1 large
    Aa,
}

impl ContrastPolicy {
    pub fn normal_text_ratio(&self) -> f64 {
        match self {
            ContrastPolicy::Aaa => 7.0,
            ContrastPolicy::Aa => 4.5,
        }
    }

    pub fn large_text_ratio(&self) -> f64 {
        match self {
            ContrastPolicy::Aaa => 4.5,
            ContrastPolicy::Aa => 3.0,
        }
    }

    /// Minimum ratio for text of the given size and weight
    pub fn required_ratio(&self, font_size_px: f64, font_weight: u16) -> f64 {
        if is_large_text(font_size_px, font_weight) {
            self.large_text_ratio()
        } else {
            self.normal_text_ratio()
        }
    }
}

impl std::fmt::Display for ContrastPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContrastPolicy::Aaa => write!(f, "AAA"),
            ContrastPolicy::Aa => write!(f, "AA"),
        }
    }
}

/// Whether text counts as "large" for contrast purposes
pub fn is_large_text(font_size_px: f64, font_weight: u16) -> bool {
    font_size_px >= 18.0 || (font_size_px >= 14.0 && font_weight >= 700)
}

/// Contrast of one foreground/background pair against a policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub ratio: f64,
    pub required: f64,
}

impl Assessment {
    pub fn passes(&self) -> bool {
        self.ratio >= self.required
    }
}

/// Assess a pair of colors for text of the given size and weight.
///
/// A translucent background is composited over white and a translucent
/// foreground over the resulting background.
pub fn assess(
    foreground: Color,
    background: Color,
    font_size_px: f64,
    font_weight: u16,
    policy: ContrastPolicy,
) -> Assessment {
    let bg = background.over(Color::WHITE);
    let fg = foreground.over(bg);
    Assessment {
        ratio: contrast_ratio(fg, bg),
        required: policy.required_ratio(font_size_px, font_weight),
    }
}

/// An element whose text fails the policy
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastFailure {
    pub node: AffectedNode,
    pub foreground: Color,
    pub background: Color,
    pub assessment: Assessment,
}

/// An element whose colors could not be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Unresolved {
    pub node: AffectedNode,
    pub reason: String,
}

/// Outcome of evaluating a whole document
#[derive(Debug, Clone, Default)]
pub struct ContrastReport {
    /// Elements with text on a background that were assessed
    pub evaluated: usize,
    pub failures: Vec<ContrastFailure>,
    pub unresolved: Vec<Unresolved>,
}

/// Evaluate contrast for every text-bearing element with a background
pub fn evaluate(styled: &[StyledElement<'_>], policy: ContrastPolicy) -> ContrastReport {
    let mut report = ContrastReport::default();

    for item in styled {
        let style = &item.style;
        if !style.has_background() || own_text(&item.element).trim().is_empty() {
            continue;
        }

        let node = AffectedNode::from_element(&item.element);
        let background = match &style.background {
            Some(ColorValue::Resolved(c)) => *c,
            Some(ColorValue::Unparsed(raw)) => {
                report.unresolved.push(Unresolved {
                    node,
                    reason: format!("background \"{}\" could not be resolved to a color", raw),
                });
                continue;
            }
            None => continue,
        };
        let foreground = match &style.color {
            ColorValue::Resolved(c) => *c,
            ColorValue::Unparsed(raw) => {
                report.unresolved.push(Unresolved {
                    node,
                    reason: format!("text color \"{}\" could not be resolved", raw),
                });
                continue;
            }
        };

        report.evaluated += 1;
        let assessment = assess(foreground, background, style.font_size_px, style.font_weight, policy);
        if !assessment.passes() {
            report.failures.push(ContrastFailure {
                node,
                foreground,
                background,
                assessment,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::style;

    const GREY: Color = Color::rgb(119, 119, 119);

    #[test]
    fn test_black_on_white_passes_at_any_size() {
        for (size, weight) in [(10.0, 400), (16.0, 400), (14.0, 700), (32.0, 400)] {
            let a = assess(Color::BLACK, Color::WHITE, size, weight, ContrastPolicy::Aaa);
            assert!(a.passes(), "21:1 must pass at {}px/{}", size, weight);
        }
    }

    #[test]
    fn test_grey_on_white_fails_aaa() {
        let a = assess(GREY, Color::WHITE, 16.0, 400, ContrastPolicy::Aaa);
        assert_eq!(a.required, 7.0);
        assert!(!a.passes());
        assert!((a.ratio - 4.48).abs() < 0.01);
    }

    #[test]
    fn test_threshold_selection_by_size_and_weight() {
        // ~4.48:1 sits just under 4.5, so only the 3:1 large-text AA rule accepts it
        let aa = ContrastPolicy::Aa;
        assert_eq!(assess(GREY, Color::WHITE, 16.0, 400, aa).required, 4.5);
        assert!(!assess(GREY, Color::WHITE, 16.0, 400, aa).passes());
        assert!(assess(GREY, Color::WHITE, 18.0, 400, aa).passes());
        assert!(assess(GREY, Color::WHITE, 14.0, 700, aa).passes());
        assert!(!assess(GREY, Color::WHITE, 14.0, 600, aa).passes());

        let aaa = ContrastPolicy::Aaa;
        assert_eq!(assess(GREY, Color::WHITE, 18.0, 400, aaa).required, 4.5);
        assert_eq!(assess(GREY, Color::WHITE, 17.0, 400, aaa).required, 7.0);
    }

    #[test]
    fn test_is_large_text() {
        assert!(is_large_text(18.0, 400));
        assert!(is_large_text(14.0, 700));
        assert!(!is_large_text(14.0, 400));
        assert!(!is_large_text(13.9, 900));
    }

    #[test]
    fn test_evaluate_document() {
        let doc = Document::parse(
            r#"<body>
                <p style="color: #000; background-color: #fff">fine</p>
                <p style="color: rgb(119,119,119); background-color: rgb(255,255,255)">grey</p>
                <p style="color: #777">no background</p>
                <div style="background: #fff"><span>child text only</span></div>
                <p style="color: #777; background-color: transparent">transparent</p>
            </body>"#,
        );
        let report = evaluate(&style::compute(&doc), ContrastPolicy::Aaa);
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].foreground, GREY);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_unparseable_color_is_unresolved_not_black() {
        let doc = Document::parse(
            r#"<body><p style="color: var(--muted); background-color: #000">text</p></body>"#,
        );
        let report = evaluate(&style::compute(&doc), ContrastPolicy::Aaa);
        assert_eq!(report.evaluated, 0);
        assert!(report.failures.is_empty(), "unknown color must not be assumed black");
        assert_eq!(report.unresolved.len(), 1);
    }
}
