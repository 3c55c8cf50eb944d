// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plot construction: declarative object in, resolved plot tree out.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, instrument};
use vizport_link::LinkResolver;
use vizport_model::{
    Axis, CanvasFactory, Column, ColumnData, Element, ElementId, ElementKind, FigureCanvas,
    FigureId, Layout, OptionCategory, OptionValue, PathGeom, Plot, PlotOptions, Range1d,
    Renderable, SubplotKey,
};

use crate::animation::Animation;
use crate::context::RenderContext;
use crate::RenderError;

/// A built plot: one canvas, one resolved tree per frame.
///
/// The current frame is the last one after construction, which is the frame
/// a static render shows.
pub struct ResolvedPlot {
    figure: FigureId,
    canvas: Box<dyn FigureCanvas>,
    frames: Vec<Plot>,
    current: usize,
}

impl ResolvedPlot {
    /// Figure identity.
    pub fn figure(&self) -> FigureId {
        self.figure
    }

    /// Number of frames; at least one.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Resolved trees, in frame order.
    pub fn frames(&self) -> &[Plot] {
        &self.frames
    }

    /// The frame a static render shows.
    pub fn current(&self) -> &Plot {
        &self.frames[self.current]
    }

    /// Make frame `index` current. Returns `false` if out of range.
    pub fn select_frame(&mut self, index: usize) -> bool {
        let ok = index < self.frames.len();
        if ok {
            self.current = index;
        }
        ok
    }

    /// The figure canvas.
    pub fn state(&self) -> &dyn FigureCanvas {
        self.canvas.as_ref()
    }

    /// The figure canvas, mutably.
    pub fn state_mut(&mut self) -> &mut dyn FigureCanvas {
        self.canvas.as_mut()
    }

    /// Canvas and current frame, borrowed together.
    pub fn parts_mut(&mut self) -> (&mut dyn FigureCanvas, &Plot) {
        (self.canvas.as_mut(), &self.frames[self.current])
    }

    /// Canvas and every frame, borrowed together.
    pub fn all_parts_mut(&mut self) -> (&mut dyn FigureCanvas, &[Plot]) {
        (self.canvas.as_mut(), &self.frames)
    }

    /// Animation over every frame at `fps`.
    pub fn anim(&mut self, fps: f32) -> Animation<'_> {
        Animation::new(self, fps)
    }
}

impl std::fmt::Debug for ResolvedPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedPlot")
            .field("figure", &self.figure)
            .field("frames", &self.frames.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Builds [`ResolvedPlot`]s and runs link resolution on each frame.
pub struct PlotBuilder<'a> {
    resolver: &'a LinkResolver,
    canvases: &'a mut dyn CanvasFactory,
    backend: &'a str,
    fig_inches: f64,
    dpi: f32,
}

impl<'a> PlotBuilder<'a> {
    /// Builder with a 4 inch default figure at 72 dpi.
    pub fn new(
        resolver: &'a LinkResolver,
        canvases: &'a mut dyn CanvasFactory,
        backend: &'a str,
    ) -> Self {
        Self {
            resolver,
            canvases,
            backend,
            fig_inches: 4.0,
            dpi: 72.0,
        }
    }

    /// Figure size used when no `fig_inches` plot option is set.
    pub fn fig_inches(mut self, fig_inches: f64) -> Self {
        self.fig_inches = fig_inches;
        self
    }

    /// Canvas resolution.
    pub fn dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Build `obj`. Returns `None` when there is nothing to draw.
    ///
    /// Links are resolved exactly once per frame, after every leaf has its
    /// handles and before anything is drawn.
    #[instrument(level = "debug", skip_all)]
    pub fn build(
        &mut self,
        ctx: &mut RenderContext,
        obj: &Renderable,
    ) -> Result<Option<ResolvedPlot>, RenderError> {
        let frames = obj.frames();
        if frames.iter().all(|frame| frame.elements().is_empty()) {
            debug!("nothing to plot");
            return Ok(None);
        }
        let mut trees = Vec::with_capacity(frames.len());
        for frame in &frames {
            let mut tree = self.build_tree(ctx, frame)?;
            let report = self.resolver.resolve(&ctx.links, &mut tree)?;
            debug!(
                ranges = report.ranges,
                data = report.data,
                custom = report.custom,
                "links resolved"
            );
            trees.push(tree);
        }

        let size = obj
            .last()
            .and_then(|frame| frame.elements().first().copied())
            .map_or((self.fig_inches, self.fig_inches), |id| {
                let options = ctx
                    .options()
                    .lookup_options(self.backend, id, OptionCategory::Plot);
                fig_inches_of(&options, self.fig_inches)
            });
        let figure = ctx.allocate_figure();
        #[allow(clippy::cast_possible_truncation)]
        let canvas = self
            .canvases
            .create(figure, (size.0 as f32, size.1 as f32), self.dpi);
        debug!(%figure, frames = trees.len(), "plot built");
        Ok(Some(ResolvedPlot {
            figure,
            canvas,
            current: trees.len() - 1,
            frames: trees,
        }))
    }

    fn build_tree(&self, ctx: &RenderContext, frame: &Renderable) -> Result<Plot, RenderError> {
        let layout = match frame {
            Renderable::Layout(layout) => layout.clone(),
            other => Layout::row(other.elements()),
        };
        let mut root = Plot::composite();
        for (index, id) in layout.items.iter().enumerate() {
            let (row, col) = layout.position(index);
            let mut cell = Plot::composite();
            cell.subplots
                .insert(SubplotKey::main(), self.build_leaf(ctx, *id)?);
            root.subplots.insert(SubplotKey::cell(row, col), cell);
        }
        Ok(root)
    }

    fn build_leaf(&self, ctx: &RenderContext, id: ElementId) -> Result<Plot, RenderError> {
        let element = ctx
            .elements
            .get(id)
            .ok_or(RenderError::UnknownElement(id))?;
        let key = ctx
            .elements
            .link_key(id)
            .ok_or(RenderError::UnknownElement(id))?;
        let style = ctx
            .options()
            .lookup_options(self.backend, id, OptionCategory::Style);
        let color = match style.get("color") {
            Some(OptionValue::Text(dim)) => Some(dim.as_str()),
            _ => None,
        };

        let mut leaf = Plot::leaf(id, key);
        leaf.handles
            .set_source(Rc::new(RefCell::new(data_source(element, color))));
        if element.kind.has_axes() {
            for axis in [Axis::X, Axis::Y] {
                let range = element
                    .extent(axis)
                    .map_or_else(Range1d::default, |(lo, hi)| Range1d::new(lo, hi));
                leaf.handles.set_range(axis, Rc::new(RefCell::new(range)));
            }
        }
        Ok(leaf)
    }
}

/// `fig_inches` from plot options as `(width, height)`.
pub(crate) fn fig_inches_of(options: &PlotOptions, default: f64) -> (f64, f64) {
    match options.get("fig_inches") {
        Some(OptionValue::Pair(w, h)) => (*w, *h),
        Some(OptionValue::Float(side)) => (*side, *side),
        _ => (default, default),
    }
}

/// The data source a leaf draws from.
///
/// Columnar elements contribute their columns. Geometry contributes one row
/// per path: ragged `xs`/`ys` plus each value dimension, as a scalar when it
/// is constant along the path. A `Path` coloured by a value dimension is split
/// into one row per segment instead.
pub(crate) fn data_source(element: &Element, color: Option<&str>) -> ColumnData {
    if !element.kind.is_geometry() {
        return element.columns.clone();
    }
    match color {
        Some(dim) if element.kind == ElementKind::Path && element.vdims.iter().any(|d| d == dim) => {
            segment_source(&element.paths, dim)
        }
        _ => path_source(element),
    }
}

fn constant(values: &[f64]) -> Option<f64> {
    let first = *values.first()?;
    values
        .iter()
        .all(|v| v.to_bits() == first.to_bits())
        .then_some(first)
}

fn path_source(element: &Element) -> ColumnData {
    let paths = &element.paths;
    let mut data = ColumnData::new();
    data.insert("xs", Column::Ragged(paths.iter().map(|p| p.xs.clone()).collect()));
    data.insert("ys", Column::Ragged(paths.iter().map(|p| p.ys.clone()).collect()));
    for dim in &element.vdims {
        let per_path: Vec<Vec<f64>> = paths
            .iter()
            .map(|p| p.values.get(dim).cloned().unwrap_or_default())
            .collect();
        let scalars: Option<Vec<f64>> = per_path.iter().map(|v| constant(v)).collect();
        let column = match scalars {
            Some(values) => Column::Float(values),
            None => Column::Ragged(per_path),
        };
        data.insert(dim.clone(), column);
    }
    data
}

fn segment_source(paths: &[PathGeom], dim: &str) -> ColumnData {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut values = Vec::new();
    for path in paths {
        let path_values = path.values.get(dim);
        for (i, (x, y)) in path.xs.windows(2).zip(path.ys.windows(2)).enumerate() {
            xs.push(x.to_vec());
            ys.push(y.to_vec());
            values.push(
                path_values
                    .and_then(|v| v.get(i))
                    .copied()
                    .unwrap_or(f64::NAN),
            );
        }
    }
    [
        ("xs", Column::Ragged(xs)),
        ("ys", Column::Ragged(ys)),
        (dim, Column::Float(values)),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn square(value: f64) -> PathGeom {
        PathGeom::from_vertices(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
            .with_values("z", vec![value; 4])
    }

    #[test]
    fn constant_path_values_become_scalars() {
        let polys = Element::polygons(vec![square(1.0), square(2.0)]);
        let data = data_source(&polys, None);
        assert_eq!(data.row_count(), Some(2));
        assert_eq!(data.get("z"), Some(&Column::Float(vec![1.0, 2.0])));
        assert!(matches!(data.get("xs"), Some(Column::Ragged(xs)) if xs[0].len() == 4));
    }

    #[test]
    fn coloured_path_splits_into_segments() {
        let paths = vec![
            PathGeom::from_vertices(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 1.0]])
                .with_values("z", vec![0.0, 1.0, 2.0, 3.0]),
            PathGeom::from_vertices(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]])
                .with_values("z", vec![5.0, 6.0, 7.0]),
        ];
        let data = data_source(&Element::path(paths), Some("z"));
        assert_eq!(data.row_count(), Some(5));
        assert_eq!(
            data.get("z"),
            Some(&Column::Float(vec![0.0, 1.0, 2.0, 5.0, 6.0]))
        );
        assert_eq!(
            data.get("xs"),
            Some(&Column::Ragged(vec![
                vec![0.0, 1.0],
                vec![1.0, 2.0],
                vec![2.0, 3.0],
                vec![0.0, 1.0],
                vec![1.0, 2.0],
            ]))
        );
    }

    #[test]
    fn colour_naming_a_missing_dim_keeps_paths_whole() {
        let data = data_source(&Element::path(vec![square(1.0)]), Some("w"));
        assert_eq!(data.row_count(), Some(1));
    }

    #[test]
    fn fig_inches_accepts_scalar_or_pair() {
        let mut options = PlotOptions::new();
        assert_eq!(fig_inches_of(&options, 4.0), (4.0, 4.0));
        options.insert("fig_inches".into(), OptionValue::Float(3.0));
        assert_eq!(fig_inches_of(&options, 4.0), (3.0, 3.0));
        options.insert("fig_inches".into(), OptionValue::Pair(6.0, 2.0));
        assert_eq!(fig_inches_of(&options, 4.0), (6.0, 2.0));
    }
}
