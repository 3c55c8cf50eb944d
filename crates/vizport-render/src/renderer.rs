// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Renderer facade.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use vizport_config::{ConfigService, ConfigStore, RendererPrefs};
use vizport_link::{LinkCallback, LinkResolver};
use vizport_model::{
    CanvasFactory, Format, FormatRequest, InteractionMode, OptionCategory, OptionValue,
    PlotOptions, Renderable,
};

use crate::animation::AnimationEncoder;
use crate::builder::{PlotBuilder, ResolvedPlot};
use crate::capability::{multi_frame_formats, static_formats, validate_format};
use crate::context::RenderContext;
use crate::figure::{FigureEncoder, FigureSettings};
use crate::payload::{Payload, Rendered};
use crate::RenderError;

/// Extra file metadata requested on save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveMetadata {
    /// Key/value pairs to embed.
    pub entries: BTreeMap<String, String>,
}

impl SaveMetadata {
    /// `true` if nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns renderable objects into encoded figures, animations and files.
pub struct Renderer {
    prefs: RendererPrefs,
    figures: FigureEncoder,
    animations: AnimationEncoder,
    canvases: Box<dyn CanvasFactory>,
    resolver: LinkResolver,
}

impl Renderer {
    /// Renderer for `prefs`.
    ///
    /// `figures` must serve `prefs.mode`.
    pub fn new(
        prefs: RendererPrefs,
        figures: FigureEncoder,
        animations: AnimationEncoder,
        canvases: Box<dyn CanvasFactory>,
    ) -> Result<Self, RenderError> {
        if figures.mode() != prefs.mode {
            return Err(RenderError::UnsupportedOperation(format!(
                "{} figure encoder cannot serve {} mode",
                figures.mode(),
                prefs.mode
            )));
        }
        Ok(Self {
            prefs,
            figures,
            animations,
            canvases,
            resolver: LinkResolver::new(),
        })
    }

    /// Renderer with preferences loaded from `config`; missing prefs give defaults.
    pub fn from_config<S: ConfigStore>(
        config: &ConfigService<S>,
        figures: FigureEncoder,
        animations: AnimationEncoder,
        canvases: Box<dyn CanvasFactory>,
    ) -> Result<Self, RenderError> {
        let prefs = config.load_or_default()?;
        Self::new(prefs, figures, animations, canvases)
    }

    /// Active preferences.
    pub fn prefs(&self) -> &RendererPrefs {
        &self.prefs
    }

    /// Active interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.prefs.mode
    }

    /// The single-frame encoder.
    pub fn figure_encoder(&self) -> &FigureEncoder {
        &self.figures
    }

    /// Register the callback applied by custom links named `name`.
    pub fn register_link_callback(
        &mut self,
        name: impl Into<String>,
        callback: Box<dyn LinkCallback>,
    ) {
        self.resolver.register(name, callback);
    }

    fn settings(&self) -> FigureSettings {
        FigureSettings {
            mode: self.prefs.mode,
            dpi: self.prefs.dpi,
            pad_inches: self.prefs.pad_inches,
        }
    }

    /// Build `obj` into a plot with links resolved.
    pub fn get_plot(
        &mut self,
        ctx: &mut RenderContext,
        obj: &Renderable,
    ) -> Result<Option<ResolvedPlot>, RenderError> {
        let mut builder = PlotBuilder::new(&self.resolver, self.canvases.as_mut(), &self.prefs.backend)
            .fig_inches(self.prefs.fig_inches)
            .dpi(self.prefs.dpi.unwrap_or(72.0));
        builder.build(ctx, obj)
    }

    /// Format chosen for `Auto` on a plot with `frames` frames.
    pub fn auto_format(&self, frames: usize) -> Option<Format> {
        let (setting, choices) = match self.prefs.holomap {
            Some(holomap) if frames > 1 => (holomap, multi_frame_formats(self.prefs.mode)),
            _ => (self.prefs.fig?, static_formats(self.prefs.mode)),
        };
        match setting {
            FormatRequest::Auto => choices.first().copied(),
            FormatRequest::Explicit(format) => Some(format),
        }
    }

    /// Build, encode and tear down `obj`.
    ///
    /// An explicit format is validated before anything is built, so an
    /// unsupported request has no side effects. Returns `None` when there is
    /// nothing to draw or automatic selection picks no format.
    #[instrument(skip_all, fields(mode = %self.prefs.mode, request = %fmt))]
    pub fn render(
        &mut self,
        ctx: &mut RenderContext,
        obj: &Renderable,
        fmt: FormatRequest,
    ) -> Result<Option<Rendered>, RenderError> {
        if let FormatRequest::Explicit(format) = fmt {
            validate_format(self.prefs.mode, format)?;
        }
        let Some(mut plot) = self.get_plot(ctx, obj)? else {
            return Ok(None);
        };
        let rendered = self.render_plot(ctx, &mut plot, fmt);
        ctx.close_figure(plot.figure());
        rendered
    }

    /// Encode an already built plot. The plot stays open.
    pub fn render_plot(
        &mut self,
        ctx: &mut RenderContext,
        plot: &mut ResolvedPlot,
        fmt: FormatRequest,
    ) -> Result<Option<Rendered>, RenderError> {
        let format = match fmt {
            FormatRequest::Explicit(format) => format,
            FormatRequest::Auto => match self.auto_format(plot.frame_count()) {
                Some(format) => format,
                None => {
                    debug!(frames = plot.frame_count(), "no format configured");
                    return Ok(None);
                }
            },
        };
        validate_format(self.prefs.mode, format)?;
        let settings = self.settings();
        let payload = if format.is_static() {
            self.figures
                .encode(&mut ctx.bbox_cache, plot, format, &settings)?
        } else {
            let anim = plot.anim(self.prefs.fps);
            Payload::Bytes(
                self.animations
                    .encode(anim, format, &mut ctx.bbox_cache, &settings)?,
            )
        };
        debug!(%format, figure = %plot.figure(), "rendered");
        Ok(Some(Rendered {
            payload,
            meta: format.into(),
        }))
    }

    /// Render `obj` and write it to `basename` plus the format's extension.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a failed save never leaves a partial file behind.
    #[instrument(skip_all, fields(basename = %basename.display()))]
    pub fn save(
        &mut self,
        ctx: &mut RenderContext,
        obj: &Renderable,
        basename: &Path,
        fmt: FormatRequest,
        metadata: &SaveMetadata,
    ) -> Result<Option<PathBuf>, RenderError> {
        if !metadata.is_empty() {
            return Err(RenderError::UnsupportedOperation(
                "save does not support file metadata".to_owned(),
            ));
        }
        let Some(rendered) = self.render(ctx, obj, fmt)? else {
            return Ok(None);
        };
        let path = with_extension(basename, rendered.meta.file_ext);
        let bytes = rendered.payload.encode()?;
        write_atomic(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "saved");
        Ok(Some(path))
    }

    /// Plot options of `obj` with `fig_inches` scaled to `percent`.
    ///
    /// Multi-frame objects use their last frame.
    pub fn plot_options(&self, ctx: &RenderContext, obj: &Renderable, percent: f64) -> PlotOptions {
        let Some(element) = obj.last().and_then(|frame| frame.elements().first().copied()) else {
            return PlotOptions::new();
        };
        let mut options = ctx
            .options()
            .lookup_options(&self.prefs.backend, element, OptionCategory::Plot);
        let factor = percent / 100.0;
        let scaled = match options.get("fig_inches") {
            Some(OptionValue::Pair(w, h)) => OptionValue::Pair(w * factor, h * factor),
            Some(OptionValue::Float(side)) => OptionValue::Float(side * factor),
            _ => OptionValue::Float(self.prefs.fig_inches * factor),
        };
        options.insert("fig_inches".to_owned(), scaled);
        options
    }

    /// Pixel size of `plot`: inches times the configured or canvas dpi.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn get_size(&self, plot: &ResolvedPlot) -> (u32, u32) {
        let canvas = plot.state();
        let (w, h) = canvas.size_inches();
        let dpi = self.prefs.dpi.unwrap_or_else(|| canvas.dpi());
        ((w * dpi) as u32, (h * dpi) as u32)
    }
}

fn with_extension(basename: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(basename.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
