// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fakes for the live-embed and interactive figure encoders.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use vizport_model::{CanvasError, FigureCanvas, FigureId, Plot};
use vizport_render::{FigureManager, HtmlConverter, LiveSessionHost, ResolvedPlot};

#[derive(Default)]
struct HostState {
    unavailable: bool,
    opened: Vec<(u64, FigureId)>,
    shows: usize,
}

/// [`LiveSessionHost`] that records opened sessions. Clones share state.
#[derive(Clone, Default)]
pub struct RecordingSessionHost {
    inner: Arc<Mutex<HostState>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl RecordingSessionHost {
    /// Host with sessions available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate having no live session to embed into.
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.inner).unavailable = unavailable;
    }

    /// `(session, figure)` of every opened session.
    pub fn opened(&self) -> Vec<(u64, FigureId)> {
        lock(&self.inner).opened.clone()
    }

    /// `show` calls across all managers.
    pub fn shows(&self) -> usize {
        lock(&self.inner).shows
    }
}

struct RecordingManager {
    session: u64,
    host: Arc<Mutex<HostState>>,
}

impl FigureManager for RecordingManager {
    fn session(&self) -> u64 {
        self.session
    }

    fn show(&mut self) -> Result<(), CanvasError> {
        lock(&self.host).shows += 1;
        Ok(())
    }
}

impl LiveSessionHost for RecordingSessionHost {
    fn open(&mut self, session: u64, plot: &ResolvedPlot) -> Option<Box<dyn FigureManager>> {
        let mut state = lock(&self.inner);
        if state.unavailable {
            return None;
        }
        state.opened.push((session, plot.figure()));
        Some(Box::new(RecordingManager {
            session,
            host: Arc::clone(&self.inner),
        }))
    }
}

/// [`HtmlConverter`] producing tiny deterministic markup. Clones share state.
#[derive(Clone, Default)]
pub struct FakeHtmlConverter {
    connected: Arc<Mutex<Vec<(FigureId, u32)>>>,
}

impl FakeHtmlConverter {
    /// Fresh converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// `(figure, fontsize)` of every mouse-position plugin attached.
    pub fn connected(&self) -> Vec<(FigureId, u32)> {
        lock(&self.connected).clone()
    }
}

impl HtmlConverter for FakeHtmlConverter {
    fn connect_mouse_position(&mut self, figure: FigureId, fontsize: u32) {
        lock(&self.connected).push((figure, fontsize));
    }

    fn to_json(
        &mut self,
        canvas: &mut dyn FigureCanvas,
        frame: &Plot,
    ) -> Result<serde_json::Value, CanvasError> {
        canvas.draw(frame)?;
        Ok(json!({
            "figure": canvas.figure_id().to_string(),
            "dpi": canvas.dpi(),
            "axes": frame.leaves().len(),
        }))
    }

    fn to_html(
        &mut self,
        canvas: &mut dyn FigureCanvas,
        frame: &Plot,
    ) -> Result<String, CanvasError> {
        canvas.draw(frame)?;
        Ok(format!(
            "<div class=\"figure\" data-figure=\"{}\" data-axes=\"{}\"></div>",
            canvas.figure_id(),
            frame.leaves().len()
        ))
    }
}
