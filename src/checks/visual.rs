// SPDX-License-Identifier: PMPL-1.0-or-later
//! Visual checks - WCAG 1.4.3/1.4.6 Contrast, 1.4.4 Resize Text,
//! 2.3.3 Animation from Interactions

use super::{plural, verb, CheckContext};
use crate::contrast;
use crate::error::Result;
use crate::result::{Accumulator, Impact, Incomplete, Pass, Violation};
use crate::style::DEFAULT_FONT_PX;

/// Whether any inline stylesheet or `media` attribute mentions one of `features`
fn styles_mention(ctx: &CheckContext<'_>, features: &[&str]) -> Result<bool> {
    let doc = ctx.document;
    let in_sheets = doc
        .stylesheets()
        .iter()
        .map(|css| css.to_lowercase())
        .any(|css| features.iter().any(|f| css.contains(f)));
    if in_sheets {
        return Ok(true);
    }
    let in_media = doc.select("[media]")?.iter().any(|el| {
        let media = el.value().attr("media").unwrap_or_default().to_lowercase();
        features.iter().any(|f| media.contains(f))
    });
    Ok(in_media)
}

pub fn motion_preferences(ctx: &CheckContext<'_>, _acc: &mut Accumulator) -> Result<Option<Pass>> {
    let handled = styles_mention(ctx, &["prefers-reduced-motion"])?;
    Ok(Some(Pass::new(
        "motion-preferences",
        format!(
            "Reduced motion preference: {}",
            if handled { "handled" } else { "not handled" }
        ),
    )))
}

pub fn contrast_preferences(ctx: &CheckContext<'_>, _acc: &mut Accumulator) -> Result<Option<Pass>> {
    let handled = styles_mention(ctx, &["prefers-contrast", "forced-colors"])?;
    Ok(Some(Pass::new(
        "contrast-preferences",
        format!(
            "High contrast preference: {}",
            if handled { "handled" } else { "not handled" }
        ),
    )))
}

pub fn font_scaling(ctx: &CheckContext<'_>, _acc: &mut Accumulator) -> Result<Option<Pass>> {
    let base = ctx
        .styles()
        .first()
        .map_or(DEFAULT_FONT_PX, |root| root.style.font_size_px);
    Ok(Some(Pass::new(
        "font-scaling",
        format!("Base font size: {}px", base),
    )))
}

pub fn color_contrast(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let policy = ctx.config.contrast_policy;
    let report = contrast::evaluate(ctx.styles(), policy);

    if !report.unresolved.is_empty() {
        let reasons: Vec<&str> = report.unresolved.iter().map(|u| u.reason.as_str()).collect();
        acc.add_incomplete(
            Incomplete::new(
                "color-contrast-unresolved",
                format!(
                    "Contrast of {} could not be determined",
                    plural(report.unresolved.len(), "element")
                ),
                reasons.join("; "),
            )
            .with_nodes(report.unresolved.iter().map(|u| u.node.clone()).collect()),
        );
    }

    if report.failures.is_empty() {
        // nothing was actually measured, so there is nothing to pass
        if report.evaluated == 0 && !report.unresolved.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Pass::new(
            "color-contrast",
            format!(
                "All {} {} WCAG {} contrast",
                plural(report.evaluated, "evaluated element"),
                verb(report.evaluated, "meets", "meet"),
                policy
            ),
        )));
    }

    let worst = report
        .failures
        .iter()
        .min_by(|a, b| a.assessment.ratio.total_cmp(&b.assessment.ratio))
        .map(|f| {
            format!(
                "lowest {:.2}:1 for {} on {}, needs {}:1",
                f.assessment.ratio, f.foreground, f.background, f.assessment.required
            )
        })
        .unwrap_or_default();

    acc.add_violation(
        Violation::new(
            "color-contrast-failed",
            &format!(
                "{} {} WCAG {} color contrast ({})",
                plural(report.failures.len(), "element"),
                verb(report.failures.len(), "fails", "fail"),
                policy,
                worst
            ),
            Impact::Critical,
            "Increase contrast between text and background",
        )
        .with_nodes(report.failures.into_iter().map(|f| f.node).collect()),
    );
    Ok(None)
}
