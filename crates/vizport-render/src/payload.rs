// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render results.

use serde::Serialize;
use vizport_model::Format;

use crate::RenderError;

/// Encoded figure or animation.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Binary data (png, pdf, video, gif).
    Bytes(Vec<u8>),
    /// Markup (svg, html).
    Text(String),
    /// Structured figure tree.
    Json(serde_json::Value),
}

impl Payload {
    /// Bytes as written to disk: UTF-8 for text, compact JSON for trees.
    pub fn encode(&self) -> Result<Vec<u8>, RenderError> {
        Ok(match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Json(value) => serde_json::to_vec(value)?,
        })
    }

    /// `true` for an empty payload, which live sessions return.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Text(text) => text.is_empty(),
            Self::Json(value) => value.is_null(),
        }
    }
}

/// Format metadata returned alongside a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RenderMeta {
    /// Format that was produced.
    pub format: Format,
    /// File extension, without the dot.
    pub file_ext: &'static str,
    /// MIME type.
    pub mime_type: &'static str,
}

impl From<Format> for RenderMeta {
    fn from(format: Format) -> Self {
        Self {
            format,
            file_ext: format.extension(),
            mime_type: format.mime_type(),
        }
    }
}

/// Payload plus metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    /// Encoded output.
    pub payload: Payload,
    /// What it is.
    pub meta: RenderMeta,
}
