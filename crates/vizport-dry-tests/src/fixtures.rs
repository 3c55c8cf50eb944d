// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Element and renderer fixtures.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vizport_config::RendererPrefs;
use vizport_link::{Link, LinkCallback, LinkId, LinkResolutionError};
use vizport_model::{Element, InteractionMode, OptionTable, PathGeom, Plot};
use vizport_render::{
    AnimationEncoder, FigureEncoder, InteractiveEncoder, LiveEmbedEncoder, RenderContext,
    RenderError, Renderer, StaticEncoder,
};

use crate::canvas::{CanvasProbe, MockCanvasFactory};
use crate::encoder::FakeEncoder;
use crate::session::{FakeHtmlConverter, RecordingSessionHost};

/// `n` deterministic pseudo-random values in `[-1, 1)`.
pub fn sample(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Curve of `n` pseudo-random values over `0..n`.
pub fn curve(n: usize, seed: u64) -> Element {
    #[allow(clippy::cast_precision_loss)]
    let xs = (0..n).map(|i| i as f64).collect();
    Element::curve(xs, sample(n, seed))
}

/// `n` pseudo-random points.
pub fn points(n: usize, seed: u64) -> Element {
    Element::points(sample(n, seed), sample(n, seed.wrapping_add(1)))
}

/// `n` unit squares side by side, square `i` carrying constant `z = i`.
pub fn squares(n: usize) -> Vec<PathGeom> {
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64 * 2.0;
            PathGeom::from_vertices(&[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0]])
                .with_values("z", vec![x / 2.0; 4])
        })
        .collect()
}

/// [`LinkCallback`] recording each application as `(link, had_target)`.
///
/// With a rejection message set, every application fails with it.
#[derive(Clone, Default)]
pub struct CountingCallback {
    calls: Arc<Mutex<Vec<(LinkId, bool)>>>,
    reject: Option<String>,
}

impl CountingCallback {
    /// Callback that accepts every link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that rejects every link with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_owned()),
            ..Self::default()
        }
    }

    /// Recorded applications.
    pub fn calls(&self) -> Vec<(LinkId, bool)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl LinkCallback for CountingCallback {
    fn apply(
        &self,
        link: &Link,
        _source: &mut Plot,
        target: Option<&mut Plot>,
    ) -> Result<(), LinkResolutionError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((link.id, target.is_some()));
        match &self.reject {
            Some(reason) => Err(LinkResolutionError::Callback {
                name: link.kind.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A renderer wired to mock collaborators, plus the probes to inspect them.
pub struct RendererHarness {
    /// Renderer under test.
    pub renderer: Renderer,
    /// Context objects are declared in.
    pub ctx: RenderContext,
    /// What the canvases did.
    pub canvas: CanvasProbe,
    /// What the external encoder was asked to do.
    pub encoder: FakeEncoder,
}

impl RendererHarness {
    /// Harness for `prefs` with a caller-chosen figure encoder.
    pub fn new(prefs: RendererPrefs, figures: FigureEncoder) -> Result<Self, RenderError> {
        let factory = MockCanvasFactory::new();
        let canvas = factory.probe();
        let encoder = FakeEncoder::new();
        let animations = AnimationEncoder::new(
            Box::new(encoder.clone()),
            prefs.known_broken_encoders.clone(),
        );
        let renderer = Renderer::new(prefs, figures, animations, Box::new(factory))?;
        Ok(Self {
            renderer,
            ctx: RenderContext::new(),
            canvas,
            encoder,
        })
    }

    /// Harness in live-embed mode over `host`.
    pub fn live(mut prefs: RendererPrefs, host: RecordingSessionHost) -> Result<Self, RenderError> {
        prefs.mode = InteractionMode::LiveEmbed;
        Self::new(prefs, LiveEmbedEncoder::new(Box::new(host)).into())
    }

    /// Harness in interactive mode over `converter`.
    pub fn interactive(
        mut prefs: RendererPrefs,
        converter: FakeHtmlConverter,
    ) -> Result<Self, RenderError> {
        prefs.mode = InteractionMode::Interactive;
        Self::new(prefs, InteractiveEncoder::new(Box::new(converter)).into())
    }

    /// Replace the context with one resolving options through `options`.
    pub fn with_options(mut self, options: OptionTable) -> Self {
        self.ctx = RenderContext::with_options(Box::new(options));
        self
    }
}

/// Harness in static mode.
pub fn static_renderer(mut prefs: RendererPrefs) -> Result<RendererHarness, RenderError> {
    prefs.mode = InteractionMode::Static;
    RendererHarness::new(prefs, StaticEncoder.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_deterministic_and_bounded() {
        let a = sample(50, 7);
        assert_eq!(a, sample(50, 7));
        assert_ne!(a, sample(50, 8));
        assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
    }
}
