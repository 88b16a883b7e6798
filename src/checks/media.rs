// SPDX-License-Identifier: PMPL-1.0-or-later
//! Media checks - WCAG 1.2.1 Audio-only and Video-only, 1.2.2 Captions,
//! 2.2.2 Pause, Stop, Hide
//!
//! - Video has a captions track
//! - Audio is followed by a transcript
//! - Video and audio expose playback controls

use super::{describe_all, plural, verb, CheckContext};
use crate::document::{next_element_sibling, text_content};
use crate::error::Result;
use crate::result::{Accumulator, Impact, Pass, Violation};
use scraper::ElementRef;

/// Whether a video carries a `<track kind="captions">`
pub fn has_caption_track(video: &ElementRef<'_>) -> bool {
    video
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "track")
        .any(|track| {
            track
                .value()
                .attr("kind")
                .is_some_and(|k| k.trim().eq_ignore_ascii_case("captions"))
        })
}

/// Whether the element following an `<audio>` mentions a transcript
pub fn has_adjacent_transcript(audio: &ElementRef<'_>) -> bool {
    next_element_sibling(audio)
        .is_some_and(|sibling| text_content(&sibling).to_lowercase().contains("transcript"))
}

pub fn video_captions(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let videos = ctx.document.select("video")?;
    let uncaptioned: Vec<ElementRef<'_>> =
        videos.iter().filter(|v| !has_caption_track(v)).copied().collect();

    if uncaptioned.is_empty() {
        return Ok(Some(Pass::new(
            "video-captions",
            format!(
                "All {} {} captions",
                plural(videos.len(), "video"),
                verb(videos.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "video-captions-missing",
            &format!("{} missing captions", plural(uncaptioned.len(), "video")),
            Impact::Critical,
            "Add caption tracks to all videos",
        )
        .with_nodes(describe_all(&uncaptioned)),
    );
    Ok(None)
}

pub fn audio_transcripts(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let audios = ctx.document.select("audio")?;
    let missing: Vec<ElementRef<'_>> =
        audios.iter().filter(|a| !has_adjacent_transcript(a)).copied().collect();

    if missing.is_empty() {
        return Ok(Some(Pass::new(
            "audio-transcripts",
            format!(
                "All {} {} transcripts",
                plural(audios.len(), "audio element"),
                verb(audios.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "audio-transcripts-missing",
            &format!("{} missing transcripts", plural(missing.len(), "audio element")),
            Impact::Critical,
            "Provide transcripts for all audio content",
        )
        .with_nodes(describe_all(&missing)),
    );
    Ok(None)
}

pub fn media_controls(ctx: &CheckContext<'_>, acc: &mut Accumulator) -> Result<Option<Pass>> {
    let media = ctx.document.select("video, audio")?;
    let uncontrolled: Vec<ElementRef<'_>> = media
        .iter()
        .filter(|m| m.value().attr("controls").is_none())
        .copied()
        .collect();

    if uncontrolled.is_empty() {
        return Ok(Some(Pass::new(
            "media-controls",
            format!(
                "All {} {} controls",
                plural(media.len(), "media element"),
                verb(media.len(), "has", "have")
            ),
        )));
    }

    acc.add_violation(
        Violation::new(
            "media-controls-missing",
            &format!("{} missing controls", plural(uncontrolled.len(), "media element")),
            Impact::Moderate,
            "Add controls attribute to media elements",
        )
        .with_nodes(describe_all(&uncontrolled)),
    );
    Ok(None)
}
