// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Multi-frame encoding through an external encoder process.
//!
//! Every frame is printed as PNG into a scratch directory, then one external
//! program (ffmpeg or ImageMagick `convert`) turns the frame sequence into
//! the container format. The scratch directory is a [`tempfile::TempDir`]
//! and disappears on every exit path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};
use vizport_config::EncoderGap;
use vizport_model::Format;

use crate::bbox::BBoxCache;
use crate::builder::ResolvedPlot;
use crate::capability::multi_frame_formats;
use crate::figure::{FigureSettings, StaticEncoder};
use crate::RenderError;

/// External program family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Writer {
    /// `ffmpeg`.
    Ffmpeg,
    /// ImageMagick `convert`.
    ImageMagick,
}

impl Writer {
    /// Executable name.
    pub fn program(self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::ImageMagick => "convert",
        }
    }
}

/// Fixed encoding recipe of one animated format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineSpec {
    /// Program family.
    pub writer: Writer,
    /// Container passed to the writer.
    pub container: &'static str,
    /// Video codec, if the writer needs one named.
    pub codec: Option<&'static str>,
    /// Frame rate overriding the renderer's.
    pub fps: Option<f32>,
    /// Extra writer arguments.
    pub extra_args: &'static [&'static str],
}

/// Recipe for `format`, or `None` if it is not an animated format.
pub fn pipeline(format: Format) -> Option<PipelineSpec> {
    let spec = match format {
        Format::Webm => PipelineSpec {
            writer: Writer::Ffmpeg,
            container: "webm",
            codec: None,
            fps: None,
            extra_args: &["-vcodec", "libvpx", "-b", "1000k"],
        },
        Format::Mp4 => PipelineSpec {
            writer: Writer::Ffmpeg,
            container: "mp4",
            codec: Some("libx264"),
            fps: None,
            extra_args: &["-pix_fmt", "yuv420p"],
        },
        Format::Gif => PipelineSpec {
            writer: Writer::ImageMagick,
            container: "gif",
            codec: None,
            fps: Some(10.0),
            extra_args: &[],
        },
        _ => return None,
    };
    Some(spec)
}

/// Pipeline recipe merged with renderer settings.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderOptions {
    /// Video codec.
    pub codec: Option<String>,
    /// Frame rate; `None` uses the animation's.
    pub fps: Option<f32>,
    /// Frame rasterization resolution; `None` keeps the canvas's.
    pub dpi: Option<f32>,
    /// Extra writer arguments.
    pub extra_args: Vec<String>,
}

impl EncoderOptions {
    /// Merge `spec` with the renderer's `fps` and `dpi`.
    ///
    /// Only gif takes a frame rate from here, and its recipe rate wins.
    pub fn merge(spec: &PipelineSpec, format: Format, fps: f32, dpi: Option<f32>) -> Self {
        Self {
            codec: spec.codec.map(str::to_owned),
            fps: (format == Format::Gif).then(|| spec.fps.unwrap_or(fps)),
            dpi,
            extra_args: spec.extra_args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

/// One external encoder invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Executable.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// File the encoder is expected to write.
    pub output: PathBuf,
}

impl EncoderCommand {
    fn new(
        spec: &PipelineSpec,
        options: &EncoderOptions,
        fps: f32,
        frame_dir: &Path,
        frames: &[PathBuf],
        output: &Path,
    ) -> Result<Self, RenderError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(RenderError::InvalidFrameRate(fps));
        }
        let mut args: Vec<String> = Vec::new();
        match spec.writer {
            Writer::Ffmpeg => {
                args.extend(["-y".into(), "-r".into(), fps.to_string(), "-i".into()]);
                args.push(frame_dir.join("frame_%05d.png").display().to_string());
                if let Some(codec) = &options.codec {
                    args.extend(["-vcodec".into(), codec.clone()]);
                }
                args.extend(options.extra_args.iter().cloned());
                args.extend(["-f".into(), spec.container.to_owned()]);
            }
            Writer::ImageMagick => {
                args.extend([
                    "-delay".into(),
                    format!("{:.0}", 100.0 / fps),
                    "-loop".into(),
                    "0".into(),
                ]);
                args.extend(frames.iter().map(|f| f.display().to_string()));
                args.extend(options.extra_args.iter().cloned());
            }
        }
        args.push(output.display().to_string());
        Ok(Self {
            program: spec.writer.program().to_owned(),
            args,
            output: output.to_path_buf(),
        })
    }
}

/// Exit status and diagnostics of an encoder run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderOutput {
    /// Exit code; `None` if killed by a signal.
    pub status: Option<i32>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl EncoderOutput {
    /// `true` for a zero exit code.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external encoder programs.
pub trait ExternalEncoder {
    /// Reported version of `program`, if it can be determined.
    fn version(&self, program: &str) -> Option<String>;
    /// Run `command` to completion.
    fn run(&mut self, command: &EncoderCommand) -> io::Result<EncoderOutput>;
}

/// Runs encoders as child processes found on `PATH`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEncoder;

impl ExternalEncoder for SystemEncoder {
    fn version(&self, program: &str) -> Option<String> {
        let output = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        parse_version(&String::from_utf8_lossy(&output.stdout))
    }

    fn run(&mut self, command: &EncoderCommand) -> io::Result<EncoderOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()?;
        Ok(EncoderOutput {
            status: output.status.code(),
            stderr: output.stderr,
        })
    }
}

/// First numeric token of the first line, e.g. `6.0` from
/// `ffmpeg version 6.0 Copyright ...`.
fn parse_version(banner: &str) -> Option<String> {
    banner
        .lines()
        .next()?
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))
        .map(str::to_owned)
}

/// Frames of a built plot, played at a fixed rate.
pub struct Animation<'a> {
    plot: &'a mut ResolvedPlot,
    fps: f32,
}

impl<'a> Animation<'a> {
    pub(crate) fn new(plot: &'a mut ResolvedPlot, fps: f32) -> Self {
        Self { plot, fps }
    }

    /// Playback rate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.plot.frame_count()
    }
}

/// Encodes animations with an [`ExternalEncoder`].
pub struct AnimationEncoder {
    runner: Box<dyn ExternalEncoder>,
    known_broken: Vec<EncoderGap>,
}

impl AnimationEncoder {
    /// Encoder running `runner`, refusing versions in `known_broken`.
    pub fn new(runner: Box<dyn ExternalEncoder>, known_broken: Vec<EncoderGap>) -> Self {
        Self {
            runner,
            known_broken,
        }
    }

    /// Encoder running programs from `PATH`.
    pub fn system(known_broken: Vec<EncoderGap>) -> Self {
        Self::new(Box::new(SystemEncoder), known_broken)
    }

    /// Fail if `program` reports a version listed as broken.
    pub fn check_environment(&self, program: &str) -> Result<(), RenderError> {
        let Some(version) = self.runner.version(program) else {
            debug!(program, "encoder version unknown; skipping check");
            return Ok(());
        };
        match self.known_broken.iter().find(|gap| gap.matches(program, &version)) {
            Some(gap) => Err(RenderError::Environment {
                program: program.to_owned(),
                version,
                reason: gap.reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Encode every frame of `anim` as `format`.
    #[instrument(skip_all, fields(format = %format, frames = anim.frame_count()))]
    pub fn encode(
        &mut self,
        anim: Animation<'_>,
        format: Format,
        cache: &mut BBoxCache,
        settings: &FigureSettings,
    ) -> Result<Vec<u8>, RenderError> {
        let spec = pipeline(format).ok_or_else(|| RenderError::UnsupportedFormat {
            format,
            mode: settings.mode,
            allowed: multi_frame_formats(settings.mode).to_vec(),
        })?;
        let program = spec.writer.program();
        self.check_environment(program)?;

        let options = EncoderOptions::merge(&spec, format, anim.fps, settings.dpi);
        let fps = options.fps.unwrap_or(anim.fps);
        let frame_settings = FigureSettings {
            dpi: options.dpi,
            ..*settings
        };

        let scratch = tempfile::Builder::new().prefix("vizport-anim-").tempdir()?;
        let paths: Vec<PathBuf> = (0..anim.frame_count())
            .map(|index| scratch.path().join(format!("frame_{index:05}.png")))
            .collect();
        let output = scratch.path().join(format!("animation.{}", format.extension()));
        let command = EncoderCommand::new(&spec, &options, fps, scratch.path(), &paths, &output)?;

        let (canvas, frames) = anim.plot.all_parts_mut();
        for (frame, path) in frames.iter().zip(&paths) {
            let png = StaticEncoder::print_frame(cache, canvas, frame, Format::Png, &frame_settings)?;
            fs::write(path, png)?;
        }

        info!(program, frames = paths.len(), fps, "running encoder");
        let result = self.runner.run(&command).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RenderError::Environment {
                program: program.to_owned(),
                version: "unknown".to_owned(),
                reason: "not found on PATH".to_owned(),
            },
            _ => RenderError::Io(err),
        })?;
        if !result.success() {
            return Err(RenderError::Encoder {
                program: program.to_owned(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        match fs::read(&output) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(RenderError::MissingOutput(output))
            }
            Err(err) => Err(err.into()),
        }
    }
}
