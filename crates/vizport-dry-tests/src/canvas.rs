// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mock figure canvas for headless testing of the render core.
//!
//! [`MockCanvas`] never rasterizes anything. It records every draw, extent
//! query and print in a [`CanvasProbe`] shared with the test, and prints a
//! small textual stand-in for the requested format.

use std::sync::{Arc, Mutex, MutexGuard};

use vizport_model::{
    Artist, BBox, CanvasError, CanvasFactory, FigureCanvas, FigureId, Format, Plot,
    PrintOptions, Rgba,
};

/// Tight box reported by default, in inches.
pub const DEFAULT_TIGHT_BBOX: BBox = BBox {
    x0: 0.5,
    y0: 0.25,
    x1: 3.75,
    y1: 3.5,
};

#[derive(Debug)]
struct ProbeState {
    created: Vec<(FigureId, (f32, f32), f32)>,
    draws: usize,
    tight_bbox_calls: usize,
    prints: Vec<PrintOptions>,
    printed_leaves: Vec<usize>,
    tight_bbox: Option<BBox>,
    artists: Vec<Artist>,
    fail_draw: bool,
}

impl Default for ProbeState {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            draws: 0,
            tight_bbox_calls: 0,
            prints: Vec::new(),
            printed_leaves: Vec::new(),
            tight_bbox: Some(DEFAULT_TIGHT_BBOX),
            artists: Vec::new(),
            fail_draw: false,
        }
    }
}

/// Shared view of everything the mock canvases did.
///
/// Clones share state, so a test keeps one clone while the renderer owns the
/// factory holding another.
#[derive(Clone, Debug, Default)]
pub struct CanvasProbe {
    inner: Arc<Mutex<ProbeState>>,
}

impl CanvasProbe {
    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Figures created so far, in creation order.
    pub fn created(&self) -> Vec<FigureId> {
        self.lock().created.iter().map(|(id, _, _)| *id).collect()
    }

    /// Size in inches each canvas was created with.
    pub fn created_sizes(&self) -> Vec<(f32, f32)> {
        self.lock().created.iter().map(|(_, size, _)| *size).collect()
    }

    /// Explicit `draw` calls, including failed ones.
    pub fn draws(&self) -> usize {
        self.lock().draws
    }

    /// `tight_bbox` queries.
    pub fn tight_bbox_calls(&self) -> usize {
        self.lock().tight_bbox_calls
    }

    /// Successful prints.
    pub fn print_count(&self) -> usize {
        self.lock().prints.len()
    }

    /// Options of every successful print.
    pub fn prints(&self) -> Vec<PrintOptions> {
        self.lock().prints.clone()
    }

    /// Options of the last successful print.
    pub fn last_print(&self) -> Option<PrintOptions> {
        self.lock().prints.last().copied()
    }

    /// Leaf count of each printed frame.
    pub fn printed_leaves(&self) -> Vec<usize> {
        self.lock().printed_leaves.clone()
    }

    /// `true` if nothing was drawn or printed.
    pub fn untouched(&self) -> bool {
        let state = self.lock();
        state.draws == 0 && state.prints.is_empty() && state.tight_bbox_calls == 0
    }

    /// Tight box to report; `None` makes the query fail.
    pub fn set_tight_bbox(&self, bbox: Option<BBox>) {
        self.lock().tight_bbox = bbox;
    }

    /// Decorative artists to report.
    pub fn set_artists(&self, artists: Vec<Artist>) {
        self.lock().artists = artists;
    }

    /// Make draws and prints fail.
    pub fn set_fail_draw(&self, fail: bool) {
        self.lock().fail_draw = fail;
    }
}

/// Headless [`FigureCanvas`].
#[derive(Debug)]
pub struct MockCanvas {
    figure: FigureId,
    size: (f32, f32),
    dpi: f32,
    drawn: bool,
    probe: CanvasProbe,
}

impl MockCanvas {
    /// Canvas recording into `probe`.
    pub fn new(figure: FigureId, size: (f32, f32), dpi: f32, probe: CanvasProbe) -> Self {
        Self {
            figure,
            size,
            dpi,
            drawn: false,
            probe,
        }
    }

    fn simulate_draw(&mut self) -> Result<(), CanvasError> {
        if self.probe.lock().fail_draw {
            return Err(CanvasError::Backend("simulated draw failure".into()));
        }
        self.drawn = true;
        Ok(())
    }
}

impl FigureCanvas for MockCanvas {
    fn figure_id(&self) -> FigureId {
        self.figure
    }

    fn dpi(&self) -> f32 {
        self.dpi
    }

    fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
    }

    fn size_inches(&self) -> (f32, f32) {
        self.size
    }

    fn face_color(&self) -> Rgba {
        [255, 255, 255, 255]
    }

    fn edge_color(&self) -> Rgba {
        [255, 255, 255, 0]
    }

    fn draw(&mut self, _frame: &Plot) -> Result<(), CanvasError> {
        self.probe.lock().draws += 1;
        self.simulate_draw()
    }

    fn tight_bbox(&self) -> Result<BBox, CanvasError> {
        let mut state = self.probe.lock();
        state.tight_bbox_calls += 1;
        if !self.drawn {
            return Err(CanvasError::NotDrawn);
        }
        state
            .tight_bbox
            .ok_or_else(|| CanvasError::Backend("simulated extent failure".into()))
    }

    fn extra_artists(&self) -> Vec<Artist> {
        self.probe.lock().artists.clone()
    }

    fn print_figure(
        &mut self,
        frame: &Plot,
        options: &PrintOptions,
    ) -> Result<Vec<u8>, CanvasError> {
        self.simulate_draw()?;
        let leaves = frame.leaves().len();
        let mut state = self.probe.lock();
        state.prints.push(*options);
        state.printed_leaves.push(leaves);
        let out = match options.format {
            Format::Svg => format!(
                "<svg data-figure=\"{}\" data-leaves=\"{leaves}\" data-dpi=\"{}\"></svg>",
                self.figure, options.dpi
            ),
            format => format!(
                "{}|{}|leaves={leaves}|dpi={}",
                format.token().to_uppercase(),
                self.figure,
                options.dpi
            ),
        };
        Ok(out.into_bytes())
    }
}

/// [`CanvasFactory`] producing [`MockCanvas`]es that share one probe.
#[derive(Clone, Debug, Default)]
pub struct MockCanvasFactory {
    probe: CanvasProbe,
}

impl MockCanvasFactory {
    /// Factory with a fresh probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// The probe every canvas from this factory records into.
    pub fn probe(&self) -> CanvasProbe {
        self.probe.clone()
    }
}

impl CanvasFactory for MockCanvasFactory {
    fn create(
        &mut self,
        figure: FigureId,
        size_inches: (f32, f32),
        dpi: f32,
    ) -> Box<dyn FigureCanvas> {
        self.probe.lock().created.push((figure, size_inches, dpi));
        Box::new(MockCanvas::new(figure, size_inches, dpi, self.probe.clone()))
    }
}
