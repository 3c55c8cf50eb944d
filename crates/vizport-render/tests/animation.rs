// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Multi-frame rendering through a faked external encoder.
#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

use vizport_config::{EncoderGap, RendererPrefs};
use vizport_dry_tests::fixtures::curve;
use vizport_dry_tests::{static_renderer, RendererHarness};
use vizport_model::{Format, FormatRequest, Renderable};
use vizport_render::{Payload, RenderError};

fn holomap(h: &mut RendererHarness, frames: u64) -> Renderable {
    Renderable::HoloMap(
        (0..frames)
            .map(|seed| Renderable::Element(h.ctx.add(curve(8, seed))))
            .collect(),
    )
}

fn scratch_removed(h: &RendererHarness) -> bool {
    h.encoder.scratch_dirs().iter().all(|dir| !dir.exists())
}

#[test]
fn gif_prints_every_frame_and_runs_convert_once() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    let obj = holomap(&mut h, 3);

    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.format, Format::Gif);
    assert_eq!(out.payload, Payload::Bytes(b"convert:3".to_vec()));

    assert_eq!(h.encoder.run_count(), 1);
    assert_eq!(h.encoder.frames_seen(), vec![3]);
    let cmd = &h.encoder.commands()[0];
    assert_eq!(cmd.program, "convert");
    assert_eq!(cmd.args[..4], ["-delay", "10", "-loop", "0"]);
    assert!(cmd.args[4].ends_with("frame_00000.png"));
    assert!(cmd.output.ends_with("animation.gif"));
    assert!(scratch_removed(&h));

    // one figure, one crop, three prints
    assert_eq!(h.canvas.created().len(), 1);
    assert_eq!(h.canvas.tight_bbox_calls(), 1);
    assert_eq!(h.canvas.printed_leaves(), vec![1, 1, 1]);
}

#[test]
fn mp4_runs_ffmpeg_at_the_configured_rate() {
    let mut h = static_renderer(RendererPrefs {
        fps: 12.0,
        ..RendererPrefs::default()
    })
    .unwrap();
    let obj = holomap(&mut h, 2);

    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Mp4))
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.mime_type, "video/mp4");
    assert_eq!(out.payload, Payload::Bytes(b"ffmpeg:2".to_vec()));

    let cmd = &h.encoder.commands()[0];
    assert_eq!(cmd.program, "ffmpeg");
    assert_eq!(cmd.args[..3], ["-y", "-r", "12"]);
    assert!(cmd.args[4].ends_with("frame_%05d.png"));
    let tail: Vec<&str> = cmd.args[5..].iter().map(String::as_str).collect();
    assert_eq!(
        tail[..6],
        ["-vcodec", "libx264", "-pix_fmt", "yuv420p", "-f", "mp4"]
    );
}

#[test]
fn single_frame_object_can_be_animated() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    let id = h.ctx.add(curve(4, 1));
    let out = h
        .renderer
        .render(
            &mut h.ctx,
            &Renderable::Element(id),
            FormatRequest::Explicit(Format::Webm),
        )
        .unwrap()
        .unwrap();
    assert_eq!(out.payload, Payload::Bytes(b"ffmpeg:1".to_vec()));
    assert!(h.encoder.commands()[0]
        .args
        .windows(2)
        .any(|pair| pair == ["-vcodec", "libvpx"]));
}

#[test]
fn configured_dpi_applies_to_every_frame() {
    let mut h = static_renderer(RendererPrefs {
        dpi: Some(50.0),
        ..RendererPrefs::default()
    })
    .unwrap();
    let obj = holomap(&mut h, 2);
    h.renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Gif))
        .unwrap();
    let dpis: Vec<f32> = h.canvas.prints().iter().map(|p| p.dpi).collect();
    assert_eq!(dpis, vec![50.0, 50.0]);
}

#[test]
fn non_zero_exit_surfaces_stderr_and_cleans_up() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    h.encoder.set_exit(Some(1), "unknown encoder 'libx264'");
    let obj = holomap(&mut h, 2);

    let err = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Mp4))
        .unwrap_err();
    match err {
        RenderError::Encoder {
            program,
            status,
            stderr,
        } => {
            assert_eq!(program, "ffmpeg");
            assert_eq!(status, Some(1));
            assert!(stderr.contains("libx264"));
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(scratch_removed(&h));
    // the figure was still torn down
    assert!(h.ctx.bbox_cache.is_empty());
}

#[test]
fn missing_program_is_an_environment_error() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    h.encoder.set_missing(true);
    let obj = holomap(&mut h, 2);
    let err = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Gif))
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Environment { ref program, .. } if program == "convert"
    ));
}

#[test]
fn missing_output_file_is_reported() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    h.encoder.set_skip_output(true);
    let obj = holomap(&mut h, 2);
    let err = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Gif))
        .unwrap_err();
    match err {
        RenderError::MissingOutput(path) => {
            assert!(path.ends_with("animation.gif"));
            assert!(!path.exists());
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(scratch_removed(&h));
}

#[test]
fn known_broken_encoder_is_refused_before_any_frame() {
    let mut h = static_renderer(RendererPrefs {
        known_broken_encoders: vec![EncoderGap {
            program: "ffmpeg".into(),
            version_prefix: "4.4".into(),
            reason: "drops the final frame".into(),
        }],
        ..RendererPrefs::default()
    })
    .unwrap();
    let _ = h.encoder.clone().with_version("ffmpeg", "4.4.2");
    let obj = holomap(&mut h, 2);

    let err = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Webm))
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Environment { ref version, ref reason, .. }
            if version == "4.4.2" && reason == "drops the final frame"
    ));
    assert_eq!(h.encoder.run_count(), 0);
    assert_eq!(h.canvas.print_count(), 0);

    // gif goes through convert, which is not listed
    assert!(h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Gif))
        .is_ok());
}

#[test]
fn zero_frame_rate_fails_before_printing() {
    let mut h = static_renderer(RendererPrefs {
        fps: 0.0,
        ..RendererPrefs::default()
    })
    .unwrap();
    let obj = holomap(&mut h, 2);

    let err = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Mp4))
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidFrameRate(fps) if fps == 0.0));
    assert_eq!(h.encoder.run_count(), 0);
    assert_eq!(h.canvas.print_count(), 0);

    // the gif recipe carries its own rate
    assert!(h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Explicit(Format::Gif))
        .is_ok());
}
