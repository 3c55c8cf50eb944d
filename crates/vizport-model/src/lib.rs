// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port contract between the vizport link resolver, the render core and
//! figure backends.
//!
//! This crate holds pure data: element identities, tabular columns, the plot
//! tree with its shared handles, and the canvas trait a backend implements.
//! It performs no drawing and no encoding. That lives in `vizport-render`.
//!
//! # Identity
//!
//! Nothing in vizport is keyed by address. Elements live in an
//! [`ElementArena`] and are referred to by dense [`ElementId`]s; link
//! association uses a separate [`LinkKey`] so that clones can either share or
//! sever it. Figures are numbered by [`FigureId`], allocated once per built
//! plot and never reused.

use thiserror::Error;

/// Error raised by a figure backend while drawing or printing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// The canvas has not been drawn yet, so no renderer state exists.
    #[error("canvas has no renderer state; draw first")]
    NotDrawn,
    /// The backend cannot print the requested format.
    #[error("backend cannot print format {0}")]
    Format(Format),
    /// A backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

mod arena;
mod canvas;
mod column;
mod element;
mod format;
mod geom;
mod ids;
mod options;
mod plot;
mod renderable;

pub use arena::ElementArena;
pub use canvas::{Artist, BBoxInches, CanvasFactory, FigureCanvas, PrintOptions, Rgba};
pub use column::{Column, ColumnData};
pub use element::{Element, ElementKind, PathGeom};
pub use format::{Format, FormatRequest, InteractionMode};
pub use geom::BBox;
pub use ids::{ElementId, FigureId, LinkKey};
pub use options::{OptionCategory, OptionLookup, OptionTable, OptionValue, PlotOptions};
pub use plot::{
    Axis, Handle, Handles, Plot, Range1d, SharedRange, SharedSource, SubplotKey, MAIN_SUBPLOT,
};
pub use renderable::{Layout, Renderable};
