// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-figure tight bounding-box cache.
//!
//! Computing a tight crop needs a full draw. An animation prints every frame
//! on one figure, so the crop of the first frame is computed once and reused,
//! which also keeps all frames the same pixel size.

use std::collections::HashMap;

use tracing::debug;
use vizport_model::{
    Artist, BBox, BBoxInches, CanvasError, FigureCanvas, FigureId, Format, Plot, PrintOptions,
};

/// Tight crops keyed by figure identity.
#[derive(Debug, Default)]
pub struct BBoxCache {
    entries: HashMap<FigureId, BBox>,
}

impl BBoxCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite a tight-crop PNG print to use the cached explicit crop.
    ///
    /// Only PNG prints asking for [`BBoxInches::Tight`] are touched; anything
    /// else is returned unchanged. On a miss the crop is computed by drawing
    /// `frame`; if that fails the options are returned unchanged and nothing
    /// is cached, so the next call retries.
    pub fn compute_or_get(
        &mut self,
        canvas: &mut dyn FigureCanvas,
        frame: &Plot,
        mut options: PrintOptions,
        pad_inches: f64,
    ) -> PrintOptions {
        if options.format != Format::Png || options.bbox_inches != BBoxInches::Tight {
            return options;
        }
        let figure = canvas.figure_id();
        if let Some(bbox) = self.entries.get(&figure) {
            debug!(%figure, "bbox cache hit");
            options.bbox_inches = BBoxInches::Explicit(*bbox);
            return options;
        }
        match compute_bbox(canvas, frame, options.dpi, pad_inches) {
            Ok(bbox) => {
                debug!(%figure, ?bbox, "bbox cache miss; computed");
                self.entries.insert(figure, bbox);
                options.bbox_inches = BBoxInches::Explicit(bbox);
            }
            Err(err) => debug!(%figure, %err, "bbox computation failed; using backend crop"),
        }
        options
    }

    /// Cached crop of `figure`.
    pub fn get(&self, figure: FigureId) -> Option<BBox> {
        self.entries.get(&figure).copied()
    }

    /// Drop the entry of a figure that has been torn down.
    pub fn evict(&mut self, figure: FigureId) -> Option<BBox> {
        self.entries.remove(&figure)
    }

    /// Number of cached figures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clipped_extent(artist: &Artist) -> Option<BBox> {
    let mut extent = artist.extent;
    if artist.clip_on {
        if let Some(clip) = artist.clip_box {
            extent = extent.intersection(&clip)?;
        }
        if let Some(clip) = artist.clip_path {
            extent = extent.intersection(&clip)?;
        }
    }
    Some(extent)
}

fn compute_bbox(
    canvas: &mut dyn FigureCanvas,
    frame: &Plot,
    dpi: f32,
    pad_inches: f64,
) -> Result<BBox, CanvasError> {
    if dpi <= 0.0 {
        return Err(CanvasError::Backend(format!("non-positive dpi {dpi}")));
    }
    canvas.set_dpi(dpi);
    canvas.draw(frame)?;
    let tight = canvas.tight_bbox()?;
    let extents: Vec<BBox> = canvas
        .extra_artists()
        .iter()
        .filter_map(clipped_extent)
        .filter(|b| b.width() != 0.0 || b.height() != 0.0)
        .collect();
    let bbox = match BBox::union(&extents) {
        Some(extra) => {
            let extra = extra.scaled(1.0 / f64::from(dpi));
            BBox::union(&[tight, extra]).unwrap_or(tight)
        }
        None => tight,
    };
    Ok(bbox.padded(pad_inches))
}
