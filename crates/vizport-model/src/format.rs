// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Output format tokens.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A concrete output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Raster image.
    Png,
    /// Vector markup.
    Svg,
    /// Paginated vector document.
    Pdf,
    /// Inline HTML markup.
    Html,
    /// Structured figure tree.
    Json,
    /// VP8 video in a WebM container.
    Webm,
    /// H.264 video in an MP4 container.
    Mp4,
    /// Animated GIF.
    Gif,
}

impl Format {
    /// Every format, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Png,
        Self::Svg,
        Self::Pdf,
        Self::Html,
        Self::Json,
        Self::Webm,
        Self::Mp4,
        Self::Gif,
    ];

    /// Lowercase token, which is also the file extension.
    pub fn token(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Json => "json",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
        }
    }

    /// File extension written by `save`.
    pub fn extension(self) -> &'static str {
        self.token()
    }

    /// MIME type of the rendered payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
            Self::Html => "text/html",
            Self::Json => "text/json",
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
            Self::Gif => "image/gif",
        }
    }

    /// `true` for single-frame formats produced by a figure draw.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            Self::Png | Self::Svg | Self::Pdf | Self::Html | Self::Json
        )
    }

    /// `true` if the payload is text rather than binary.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Svg | Self::Html | Self::Json)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.token() == s)
            .ok_or_else(|| format!("unknown format {s:?}"))
    }
}

/// A requested format: either explicit or chosen by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FormatRequest {
    /// Let the renderer pick based on frame count and configuration.
    #[default]
    Auto,
    /// A specific format.
    Explicit(Format),
}

impl From<Format> for FormatRequest {
    fn from(format: Format) -> Self {
        Self::Explicit(format)
    }
}

impl fmt::Display for FormatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Explicit(format) => format.fmt(f),
        }
    }
}

impl FromStr for FormatRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Explicit)
        }
    }
}

impl TryFrom<String> for FormatRequest {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormatRequest> for String {
    fn from(value: FormatRequest) -> Self {
        value.to_string()
    }
}

/// How figures are delivered to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Static documents: png, svg, pdf.
    #[default]
    #[serde(alias = "default")]
    Static,
    /// Live figures embedded in an interactive session.
    #[serde(alias = "nbagg")]
    LiveEmbed,
    /// Browser markup or a structured figure tree.
    #[serde(alias = "d3")]
    Interactive,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Static => "static",
            Self::LiveEmbed => "live_embed",
            Self::Interactive => "interactive",
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn tokens_parse_back() {
        for format in Format::ALL {
            assert_eq!(format.token().parse::<Format>(), Ok(format));
        }
        assert!("bmp".parse::<Format>().is_err());
    }

    #[test]
    fn request_serializes_as_token() {
        let json = serde_json::to_string(&FormatRequest::Auto).unwrap();
        assert_eq!(json, "\"auto\"");
        let back: FormatRequest = serde_json::from_str("\"mp4\"").unwrap();
        assert_eq!(back, FormatRequest::Explicit(Format::Mp4));
        assert!(serde_json::from_str::<FormatRequest>("\"tiff\"").is_err());
    }

    #[test]
    fn svg_is_text_png_is_not() {
        assert!(Format::Svg.is_text());
        assert!(!Format::Png.is_text());
        assert!(!Format::Gif.is_static());
        assert_eq!(Format::Svg.mime_type(), "image/svg+xml");
    }

    #[test]
    fn mode_accepts_legacy_names() {
        let mode: InteractionMode = serde_json::from_str("\"d3\"").unwrap();
        assert_eq!(mode, InteractionMode::Interactive);
        let mode: InteractionMode = serde_json::from_str("\"live_embed\"").unwrap();
        assert_eq!(mode, InteractionMode::LiveEmbed);
        assert_eq!(InteractionMode::default().to_string(), "static");
    }
}
