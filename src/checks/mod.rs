// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility checks.
//!
//! Each check inspects the document and either returns a [`Pass`] or
//! appends violations to the run's [`Accumulator`]. Checks are independent:
//! none reads another's output, so their order never changes the score.
//!
//! - **structure**: skip links, headings, landmarks, language, title, tables, lists, iframes
//! - **labels**: form, button, link and image names; form submission
//! - **media**: captions, transcripts, controls
//! - **keyboard**: focusability, keyboard reachability, ARIA, screen reader support
//! - **visual**: color contrast and user preference styles

pub mod keyboard;
pub mod labels;
pub mod media;
pub mod structure;
pub mod visual;

use crate::config::AuditConfig;
use crate::document::Document;
use crate::error::Result;
use crate::result::{Accumulator, AffectedNode, Incomplete, Pass};
use crate::style::{self, StyledElement};
use scraper::ElementRef;
use std::cell::OnceCell;
use tracing::{debug, error};

/// Everything a check may look at
pub struct CheckContext<'a> {
    pub document: &'a Document,
    pub config: &'a AuditConfig,
    styles: OnceCell<Vec<StyledElement<'a>>>,
}

impl<'a> CheckContext<'a> {
    pub fn new(document: &'a Document, config: &'a AuditConfig) -> Self {
        Self {
            document,
            config,
            styles: OnceCell::new(),
        }
    }

    /// Computed styles, resolved on first use
    pub fn styles(&self) -> &[StyledElement<'a>] {
        self.styles.get_or_init(|| style::compute(self.document))
    }
}

/// Trait implemented by all checks
pub trait Check: Send + Sync {
    /// Stable identifier, also used to disable the check in configuration
    fn id(&self) -> &str;

    /// Short description of what this check verifies
    fn description(&self) -> &str;

    /// Inspect the document. `Ok(Some(pass))` records a pass; violations are
    /// appended to `acc` directly.
    fn run(&self, ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>>;
}

/// Signature shared by the built-in check functions
pub type CheckFn = fn(&CheckContext<'_>, &mut Accumulator) -> Result<Option<Pass>>;

/// A check backed by a plain function
pub struct FnCheck {
    id: &'static str,
    description: &'static str,
    run: CheckFn,
}

impl FnCheck {
    pub const fn new(id: &'static str, description: &'static str, run: CheckFn) -> Self {
        Self { id, description, run }
    }
}

impl Check for FnCheck {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn run(&self, ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
        (self.run)(ctx, acc)
    }
}

/// The built-in checks, in execution order
pub fn default_checks() -> Vec<Box<dyn Check>> {
    let table: [FnCheck; 27] = [
        FnCheck::new("skip-links", "Skip links for keyboard users", structure::skip_links),
        FnCheck::new("heading-hierarchy", "Headings do not skip levels and the page has one h1", structure::heading_hierarchy),
        FnCheck::new("landmark-regions", "Main, navigation, banner and contentinfo landmarks", structure::landmarks),
        FnCheck::new("focus-management", "Page has focusable elements", keyboard::focus_management),
        FnCheck::new("form-labels", "Form inputs have labels", labels::form_labels),
        FnCheck::new("button-labels", "Buttons have accessible names", labels::button_labels),
        FnCheck::new("link-text", "Links have descriptive text", labels::link_text),
        FnCheck::new("language-attribute", "Root element declares a language", structure::language_attribute),
        FnCheck::new("viewport-meta", "Viewport adapts to device width", structure::viewport_meta),
        FnCheck::new("document-title", "Document has a title", structure::document_title),
        FnCheck::new("page-language", "Language tag is well formed", structure::page_language),
        FnCheck::new("table-headers", "Tables have header cells", structure::table_headers),
        FnCheck::new("list-semantics", "Lists use list elements", structure::list_semantics),
        FnCheck::new("iframe-titles", "Iframes have titles", structure::iframe_titles),
        FnCheck::new("video-captions", "Videos have caption tracks", media::video_captions),
        FnCheck::new("audio-transcripts", "Audio has transcripts", media::audio_transcripts),
        FnCheck::new("media-controls", "Media exposes playback controls", media::media_controls),
        FnCheck::new("motion-preferences", "Styles respect reduced motion", visual::motion_preferences),
        FnCheck::new("contrast-preferences", "Styles respect contrast preferences", visual::contrast_preferences),
        FnCheck::new("font-scaling", "Base font size", visual::font_scaling),
        FnCheck::new("color-contrast", "Text meets contrast thresholds", visual::color_contrast),
        FnCheck::new("html-structure", "Document has doctype, head and body", structure::html_structure),
        FnCheck::new("keyboard-navigation", "Interactive elements are keyboard reachable", keyboard::keyboard_navigation),
        FnCheck::new("aria-attributes", "ARIA attributes are valid", keyboard::aria_attributes),
        FnCheck::new("forms-validated", "Forms can be submitted", labels::form_submit),
        FnCheck::new("image-alt-text", "Images have alt text", labels::image_alt_text),
        FnCheck::new("screen-reader-support", "Live regions and ARIA labels", keyboard::screen_reader_support),
    ];
    table
        .into_iter()
        .map(|c| Box::new(c) as Box<dyn Check>)
        .collect()
}

/// Run every enabled check, isolating failures.
///
/// A check that returns an error is logged and recorded as incomplete; the
/// remaining checks still run.
pub fn run_checks(checks: &[Box<dyn Check>], ctx: &CheckContext<'_>, acc: &mut Accumulator) {
    for check in checks {
        if ctx.config.is_disabled(check.id()) {
            debug!(check = check.id(), "check disabled by configuration");
            continue;
        }

        let before = acc.violation_count();
        match check.run(ctx, acc) {
            Ok(Some(pass)) => {
                debug!(check = check.id(), "passed");
                acc.add_pass(pass);
            }
            Ok(None) => {
                debug!(
                    check = check.id(),
                    violations = acc.violation_count() - before,
                    "completed"
                );
            }
            Err(e) => {
                error!(check = check.id(), error = %e, "check failed");
                acc.add_incomplete(Incomplete::new(
                    &format!("check-failed:{}", check.id()),
                    check.description(),
                    e.to_string(),
                ));
            }
        }
    }
}

/// Describe a set of elements for a record
pub(crate) fn describe_all(elements: &[ElementRef<'_>]) -> Vec<AffectedNode> {
    elements.iter().map(AffectedNode::from_element).collect()
}

/// Pluralize a count for messages: `plural(1, "link")` is `"1 link"`
pub(crate) fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Pick the verb form that agrees with a count
pub(crate) fn verb<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
