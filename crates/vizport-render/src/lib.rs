// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rendering core for vizport: turns declarative objects into figures,
//! animations and saved files.
//!
//! The pieces, bottom up:
//! - [`RenderContext`] owns elements, links and the per-figure bbox cache.
//! - [`PlotBuilder`] builds a [`ResolvedPlot`] and runs link resolution once.
//! - [`BBoxCache`] computes a tight crop once per figure and reuses it.
//! - [`FigureEncoder`] serializes one frame in the configured mode.
//! - [`AnimationEncoder`] pipes rasterized frames through an external encoder.
//! - [`Renderer`] picks the format and ties everything together.
//!
//! Nothing here draws pixels; figure backends implement
//! [`vizport_model::FigureCanvas`].

use std::path::PathBuf;

use thiserror::Error;
use vizport_config::ConfigError;
use vizport_link::{ConfigurationError, LinkResolutionError};
use vizport_model::{CanvasError, ElementId, Format, InteractionMode};

mod animation;
mod bbox;
mod builder;
mod capability;
mod context;
mod figure;
mod payload;
mod renderer;

pub use animation::{
    pipeline, Animation, AnimationEncoder, EncoderCommand, EncoderOptions, EncoderOutput,
    ExternalEncoder, PipelineSpec, SystemEncoder, Writer,
};
pub use bbox::BBoxCache;
pub use builder::{PlotBuilder, ResolvedPlot};
pub use capability::{multi_frame_formats, static_formats, supported_formats, validate_format};
pub use context::RenderContext;
pub use figure::{
    FigureEncoder, FigureManager, FigureSettings, HtmlConverter, InteractiveEncoder,
    LiveEmbedEncoder, LiveSessionHost, StaticEncoder, MOUSE_POSITION_FONTSIZE,
};
pub use payload::{Payload, RenderMeta, Rendered};
pub use renderer::{Renderer, SaveMetadata};

/// Failure of a render, encode or save.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The format is not offered by the active interaction mode.
    #[error("format {format} is not supported in {mode} mode; expected one of {allowed:?}")]
    UnsupportedFormat {
        /// Requested format.
        format: Format,
        /// Active mode.
        mode: InteractionMode,
        /// Formats the mode offers.
        allowed: Vec<Format>,
    },
    /// The call is not supported as made.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// A required external tool is missing or known to be broken.
    #[error("{program} {version} cannot be used: {reason}")]
    Environment {
        /// Program name.
        program: String,
        /// Reported version, or `unknown`.
        version: String,
        /// Why it was refused.
        reason: String,
    },
    /// The external encoder exited unsuccessfully.
    #[error("{program} exited with status {status:?}: {stderr}")]
    Encoder {
        /// Program name.
        program: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The animation frame rate is zero, negative or not finite.
    #[error("frame rate must be a positive number, got {0}")]
    InvalidFrameRate(f32),
    /// The external encoder reported success but left no output file.
    #[error("encoder produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
    /// An element referenced by the object is not in the context.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
    /// An invalid link declaration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A link could not be applied while building the plot.
    #[error(transparent)]
    Link(#[from] LinkResolutionError),
    /// The figure backend failed.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    /// Preferences could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A text format produced invalid UTF-8.
    #[error("text output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
