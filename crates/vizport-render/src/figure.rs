// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-frame figure encoding, one strategy per interaction mode.

use tracing::debug;
use vizport_model::{
    BBoxInches, CanvasError, FigureCanvas, FigureId, Format, InteractionMode, Plot, PrintOptions,
};

use crate::bbox::BBoxCache;
use crate::builder::ResolvedPlot;
use crate::capability::static_formats;
use crate::payload::Payload;
use crate::RenderError;

/// Font size of the mouse-position readout attached to interactive figures.
pub const MOUSE_POSITION_FONTSIZE: u32 = 14;

/// Renderer settings that affect encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FigureSettings {
    /// Active interaction mode.
    pub mode: InteractionMode,
    /// Output resolution; `None` keeps the canvas's own.
    pub dpi: Option<f32>,
    /// Padding around tight crops, in inches.
    pub pad_inches: f64,
}

impl Default for FigureSettings {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Static,
            dpi: None,
            pad_inches: 0.1,
        }
    }
}

fn check_static(mode: InteractionMode, format: Format) -> Result<(), RenderError> {
    let allowed = static_formats(mode);
    if allowed.contains(&format) {
        Ok(())
    } else {
        Err(RenderError::UnsupportedFormat {
            format,
            mode,
            allowed: allowed.to_vec(),
        })
    }
}

/// Prints static documents through the canvas.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticEncoder;

impl StaticEncoder {
    /// Print the current frame of `plot` as `format`.
    pub fn encode(
        &self,
        cache: &mut BBoxCache,
        plot: &mut ResolvedPlot,
        format: Format,
        settings: &FigureSettings,
    ) -> Result<Payload, RenderError> {
        check_static(InteractionMode::Static, format)?;
        let (canvas, frame) = plot.parts_mut();
        let bytes = Self::print_frame(cache, canvas, frame, format, settings)?;
        Ok(if format.is_text() {
            Payload::Text(String::from_utf8(bytes)?)
        } else {
            Payload::Bytes(bytes)
        })
    }

    /// Print one frame with a tight crop, through the bbox cache.
    pub(crate) fn print_frame(
        cache: &mut BBoxCache,
        canvas: &mut dyn FigureCanvas,
        frame: &Plot,
        format: Format,
        settings: &FigureSettings,
    ) -> Result<Vec<u8>, RenderError> {
        let options = PrintOptions {
            format,
            face_color: canvas.face_color(),
            edge_color: canvas.edge_color(),
            dpi: settings.dpi.unwrap_or_else(|| canvas.dpi()),
            bbox_inches: BBoxInches::Tight,
        };
        let options = cache.compute_or_get(canvas, frame, options, settings.pad_inches);
        Ok(canvas.print_figure(frame, &options)?)
    }
}

/// A live figure session kept open by the host.
pub trait FigureManager {
    /// Session number assigned at creation.
    fn session(&self) -> u64;
    /// Display the figure.
    fn show(&mut self) -> Result<(), CanvasError>;
}

/// Host side of live embedding.
pub trait LiveSessionHost {
    /// Open a session numbered `session` for `plot`.
    ///
    /// Returns `None` when no live session is available.
    fn open(&mut self, session: u64, plot: &ResolvedPlot) -> Option<Box<dyn FigureManager>>;
}

/// Hands figures to live sessions instead of returning markup.
pub struct LiveEmbedEncoder {
    host: Box<dyn LiveSessionHost>,
    counter: u64,
    managers: Vec<Box<dyn FigureManager>>,
}

impl LiveEmbedEncoder {
    /// Encoder opening sessions on `host`.
    pub fn new(host: Box<dyn LiveSessionHost>) -> Self {
        Self {
            host,
            counter: 0,
            managers: Vec::new(),
        }
    }

    /// Sessions opened so far; the next session gets this number.
    pub fn sessions(&self) -> u64 {
        self.counter
    }

    /// Managers held open.
    pub fn managers(&self) -> &[Box<dyn FigureManager>] {
        &self.managers
    }

    fn encode(&mut self, plot: &ResolvedPlot, format: Format) -> Result<Payload, RenderError> {
        check_static(InteractionMode::LiveEmbed, format)?;
        let Some(mut manager) = self.host.open(self.counter, plot) else {
            debug!(figure = %plot.figure(), "no live session; nothing embedded");
            return Ok(Payload::Text(String::new()));
        };
        self.counter += 1;
        manager.show()?;
        debug!(figure = %plot.figure(), session = manager.session(), "figure embedded");
        self.managers.push(manager);
        Ok(Payload::Text(String::new()))
    }
}

/// Converts a drawn figure into browser markup or a figure tree.
pub trait HtmlConverter {
    /// Attach a mouse-position readout to `figure`.
    fn connect_mouse_position(&mut self, figure: FigureId, fontsize: u32);
    /// Structured tree of `frame`.
    fn to_json(
        &mut self,
        canvas: &mut dyn FigureCanvas,
        frame: &Plot,
    ) -> Result<serde_json::Value, CanvasError>;
    /// HTML markup of `frame`.
    fn to_html(&mut self, canvas: &mut dyn FigureCanvas, frame: &Plot)
        -> Result<String, CanvasError>;
}

/// Encodes figures as HTML or JSON through an [`HtmlConverter`].
pub struct InteractiveEncoder {
    converter: Box<dyn HtmlConverter>,
}

impl InteractiveEncoder {
    /// Encoder converting with `converter`.
    pub fn new(converter: Box<dyn HtmlConverter>) -> Self {
        Self { converter }
    }

    fn encode(
        &mut self,
        plot: &mut ResolvedPlot,
        format: Format,
        settings: &FigureSettings,
    ) -> Result<Payload, RenderError> {
        check_static(InteractionMode::Interactive, format)?;
        let figure = plot.figure();
        let (canvas, frame) = plot.parts_mut();
        if let Some(dpi) = settings.dpi {
            canvas.set_dpi(dpi);
        }
        self.converter
            .connect_mouse_position(figure, MOUSE_POSITION_FONTSIZE);
        Ok(match format {
            Format::Json => Payload::Json(self.converter.to_json(canvas, frame)?),
            _ => {
                let html = self.converter.to_html(canvas, frame)?;
                Payload::Text(format!("<center>{html}</center>"))
            }
        })
    }
}

/// Single-frame encoder for the configured interaction mode.
pub enum FigureEncoder {
    /// png, svg, pdf.
    Static(StaticEncoder),
    /// Live sessions.
    LiveEmbed(LiveEmbedEncoder),
    /// html, json.
    Interactive(InteractiveEncoder),
}

impl FigureEncoder {
    /// The mode this encoder serves.
    pub fn mode(&self) -> InteractionMode {
        match self {
            Self::Static(_) => InteractionMode::Static,
            Self::LiveEmbed(_) => InteractionMode::LiveEmbed,
            Self::Interactive(_) => InteractionMode::Interactive,
        }
    }

    /// Encode the current frame of `plot`.
    pub fn encode(
        &mut self,
        cache: &mut BBoxCache,
        plot: &mut ResolvedPlot,
        format: Format,
        settings: &FigureSettings,
    ) -> Result<Payload, RenderError> {
        match self {
            Self::Static(encoder) => encoder.encode(cache, plot, format, settings),
            Self::LiveEmbed(encoder) => encoder.encode(plot, format),
            Self::Interactive(encoder) => encoder.encode(plot, format, settings),
        }
    }
}

impl From<StaticEncoder> for FigureEncoder {
    fn from(encoder: StaticEncoder) -> Self {
        Self::Static(encoder)
    }
}

impl From<LiveEmbedEncoder> for FigureEncoder {
    fn from(encoder: LiveEmbedEncoder) -> Self {
        Self::LiveEmbed(encoder)
    }
}

impl From<InteractiveEncoder> for FigureEncoder {
    fn from(encoder: InteractiveEncoder) -> Self {
        Self::Interactive(encoder)
    }
}
