// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Figure backend port.
//!
//! A backend (raster, vector, browser bridge) implements [`FigureCanvas`]. The
//! render core only calls these methods; it never inspects pixels.

use crate::format::Format;
use crate::geom::BBox;
use crate::ids::FigureId;
use crate::plot::Plot;
use crate::CanvasError;

/// RGBA colour with 8-bit components.
pub type Rgba = [u8; 4];

/// Crop requested from [`FigureCanvas::print_figure`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BBoxInches {
    /// Full figure, no crop.
    Full,
    /// Let the backend compute a tight crop itself.
    Tight,
    /// Crop to this rectangle, in inches.
    Explicit(BBox),
}

/// Arguments to a single print call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrintOptions {
    /// Output format.
    pub format: Format,
    /// Figure background.
    pub face_color: Rgba,
    /// Figure border.
    pub edge_color: Rgba,
    /// Output resolution.
    pub dpi: f32,
    /// Crop.
    pub bbox_inches: BBoxInches,
}

/// A decorative artist (legend, title, annotation) whose extent is not part
/// of the figure's own tight box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Artist {
    /// Window extent in device pixels.
    pub extent: BBox,
    /// Whether the artist is clipped.
    pub clip_on: bool,
    /// Clip rectangle in device pixels, if any.
    pub clip_box: Option<BBox>,
    /// Extents of the fully transformed clip path, if any.
    pub clip_path: Option<BBox>,
}

/// Drawable figure owned by a built plot.
///
/// One canvas exists per [`FigureId`]. Every frame of an animation is drawn on
/// the same canvas, which is what makes per-figure caching worthwhile.
pub trait FigureCanvas {
    /// Identity of the figure this canvas draws.
    fn figure_id(&self) -> FigureId;

    /// Current resolution in dots per inch.
    fn dpi(&self) -> f32;

    /// Change the resolution.
    fn set_dpi(&mut self, dpi: f32);

    /// Figure size in inches `(width, height)`.
    fn size_inches(&self) -> (f32, f32);

    /// Figure background colour.
    fn face_color(&self) -> Rgba;

    /// Figure border colour.
    fn edge_color(&self) -> Rgba;

    /// Draw `frame`, leaving renderer state behind for extent queries.
    fn draw(&mut self, frame: &Plot) -> Result<(), CanvasError>;

    /// Tight extent of the last drawn frame, in inches.
    fn tight_bbox(&self) -> Result<BBox, CanvasError>;

    /// Decorative artists of the last drawn frame.
    fn extra_artists(&self) -> Vec<Artist>;

    /// Draw `frame` and serialize it.
    fn print_figure(&mut self, frame: &Plot, options: &PrintOptions)
        -> Result<Vec<u8>, CanvasError>;
}

/// Creates canvases for newly built plots.
pub trait CanvasFactory {
    /// Create the canvas for `figure` with the given size and resolution.
    fn create(&mut self, figure: FigureId, size_inches: (f32, f32), dpi: f32)
        -> Box<dyn FigureCanvas>;
}
