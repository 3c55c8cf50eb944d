// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Which formats each interaction mode offers.

use vizport_model::{Format, InteractionMode};

use crate::RenderError;

const ANIMATED: [Format; 3] = [Format::Webm, Format::Mp4, Format::Gif];

/// Single-frame formats of `mode`; the first is the automatic default.
pub fn static_formats(mode: InteractionMode) -> &'static [Format] {
    match mode {
        InteractionMode::Static => &[Format::Png, Format::Svg, Format::Pdf],
        InteractionMode::Interactive => &[Format::Html, Format::Json],
        InteractionMode::LiveEmbed => &[Format::Html],
    }
}

/// Multi-frame formats of `mode`.
pub fn multi_frame_formats(_mode: InteractionMode) -> &'static [Format] {
    &ANIMATED
}

/// Every format `mode` accepts, static formats first.
pub fn supported_formats(mode: InteractionMode) -> Vec<Format> {
    static_formats(mode)
        .iter()
        .chain(multi_frame_formats(mode))
        .copied()
        .collect()
}

/// Reject `format` unless `mode` offers it.
pub fn validate_format(mode: InteractionMode, format: Format) -> Result<(), RenderError> {
    let allowed = supported_formats(mode);
    if allowed.contains(&format) {
        Ok(())
    } else {
        Err(RenderError::UnsupportedFormat {
            format,
            mode,
            allowed,
        })
    }
}
