// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Renderer preferences.

use serde::{Deserialize, Serialize};
use vizport_model::{Format, FormatRequest, InteractionMode};

/// Store key under which [`RendererPrefs`] are persisted.
pub const RENDERER_PREFS_KEY: &str = "renderer";

/// An external encoder version known to produce broken output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderGap {
    /// Program name, e.g. `ffmpeg`.
    pub program: String,
    /// Matches every reported version starting with this prefix.
    pub version_prefix: String,
    /// Shown to the user when the check fails.
    pub reason: String,
}

impl EncoderGap {
    /// `true` if `program` at `version` falls in this gap.
    pub fn matches(&self, program: &str, version: &str) -> bool {
        self.program == program && version.starts_with(&self.version_prefix)
    }
}

/// Saved renderer settings.
///
/// `fig` and `holomap` drive automatic format selection: `None` renders
/// nothing. `Some(Auto)` picks the mode's first static format for `fig` and
/// its first animated format for `holomap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererPrefs {
    /// Backend name used for option lookup.
    pub backend: String,
    /// Format for single-frame objects.
    pub fig: Option<FormatRequest>,
    /// Format for multi-frame objects.
    pub holomap: Option<FormatRequest>,
    /// Delivery mode.
    pub mode: InteractionMode,
    /// Output resolution; `None` keeps the figure's own.
    pub dpi: Option<f32>,
    /// Animation frame rate.
    pub fps: f32,
    /// Padding around tight crops, in inches.
    pub pad_inches: f64,
    /// Default figure size in inches when no `fig_inches` option is set.
    pub fig_inches: f64,
    /// Encoder versions that must be refused.
    pub known_broken_encoders: Vec<EncoderGap>,
}

impl Default for RendererPrefs {
    fn default() -> Self {
        Self {
            backend: "vizport".to_owned(),
            fig: Some(FormatRequest::Explicit(Format::Svg)),
            holomap: Some(FormatRequest::Explicit(Format::Gif)),
            mode: InteractionMode::Static,
            dpi: None,
            fps: 20.0,
            pad_inches: 0.1,
            fig_inches: 4.0,
            known_broken_encoders: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let prefs: RendererPrefs =
            serde_json::from_str(r#"{"mode":"d3","fig":"auto","holomap":null}"#).unwrap();
        assert_eq!(prefs.mode, InteractionMode::Interactive);
        assert_eq!(prefs.fig, Some(FormatRequest::Auto));
        assert_eq!(prefs.holomap, None);
        assert!((prefs.fps - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn gap_matches_by_prefix() {
        let gap = EncoderGap {
            program: "ffmpeg".into(),
            version_prefix: "4.4".into(),
            reason: "drops frames".into(),
        };
        assert!(gap.matches("ffmpeg", "4.4.2"));
        assert!(!gap.matches("ffmpeg", "5.1"));
        assert!(!gap.matches("convert", "4.4.2"));
    }
}
