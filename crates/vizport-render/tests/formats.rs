// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Format validation, automatic format choice and the three figure encoders.
#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use vizport_config::RendererPrefs;
use vizport_dry_tests::fixtures::{curve, points};
use vizport_dry_tests::{
    static_renderer, FakeHtmlConverter, RecordingSessionHost, RendererHarness,
};
use vizport_model::{
    FigureId, Format, FormatRequest, InteractionMode, Layout, Renderable,
};
use vizport_render::{LiveEmbedEncoder, Payload, RenderError};

fn explicit(format: Format) -> FormatRequest {
    FormatRequest::Explicit(format)
}

fn one_curve(h: &mut RendererHarness) -> Renderable {
    Renderable::Element(h.ctx.add(curve(6, 3)))
}

#[test]
fn unsupported_format_fails_before_any_draw() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    let obj = one_curve(&mut h);

    for format in [Format::Html, Format::Json] {
        let err = h.renderer.render(&mut h.ctx, &obj, explicit(format)).unwrap_err();
        match err {
            RenderError::UnsupportedFormat {
                format: rejected,
                mode,
                allowed,
            } => {
                assert_eq!(rejected, format);
                assert_eq!(mode, InteractionMode::Static);
                assert_eq!(&allowed[..3], &[Format::Png, Format::Svg, Format::Pdf]);
            }
            other => panic!("unexpected error {other}"),
        }
    }
    assert!(h.canvas.untouched());
    assert!(h.canvas.created().is_empty());
}

#[test]
fn interactive_mode_rejects_raster_output() {
    let conv = FakeHtmlConverter::new();
    let mut h = RendererHarness::interactive(RendererPrefs::default(), conv.clone()).unwrap();
    let obj = one_curve(&mut h);
    assert!(matches!(
        h.renderer.render(&mut h.ctx, &obj, explicit(Format::Png)),
        Err(RenderError::UnsupportedFormat { .. })
    ));
    assert!(h.canvas.untouched());
    assert!(conv.connected().is_empty());
}

#[test]
fn encoder_must_match_the_configured_mode() {
    let built = RendererHarness::new(
        RendererPrefs::default(),
        LiveEmbedEncoder::new(Box::new(RecordingSessionHost::new())).into(),
    );
    assert!(matches!(built, Err(RenderError::UnsupportedOperation(_))));
}

#[test]
fn auto_uses_the_configured_figure_format() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    let obj = one_curve(&mut h);
    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.format, Format::Svg);
    match out.payload {
        Payload::Text(svg) => assert!(svg.starts_with("<svg data-figure=\"figure#0\"")),
        other => panic!("expected text payload, got {other:?}"),
    }
}

#[test]
fn auto_setting_picks_the_mode_default() {
    let mut h = static_renderer(RendererPrefs {
        fig: Some(FormatRequest::Auto),
        ..RendererPrefs::default()
    })
    .unwrap();
    let obj = one_curve(&mut h);
    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.format, Format::Png);
    assert_eq!(out.meta.mime_type, "image/png");
}

#[test]
fn auto_with_nothing_configured_renders_nothing() {
    let mut h = static_renderer(RendererPrefs {
        fig: None,
        ..RendererPrefs::default()
    })
    .unwrap();
    let obj = one_curve(&mut h);
    assert!(h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .is_none());
    assert_eq!(h.canvas.print_count(), 0);
}

#[test]
fn auto_format_switches_on_frame_count() {
    let h = static_renderer(RendererPrefs::default()).unwrap();
    assert_eq!(h.renderer.auto_format(1), Some(Format::Svg));
    assert_eq!(h.renderer.auto_format(4), Some(Format::Gif));

    let h = static_renderer(RendererPrefs {
        holomap: None,
        ..RendererPrefs::default()
    })
    .unwrap();
    assert_eq!(h.renderer.auto_format(4), Some(Format::Svg));
}

#[test]
fn auto_holomap_setting_picks_an_animated_format() {
    let mut h = static_renderer(RendererPrefs {
        holomap: Some(FormatRequest::Auto),
        ..RendererPrefs::default()
    })
    .unwrap();
    assert_eq!(h.renderer.auto_format(3), Some(Format::Webm));
    assert_eq!(h.renderer.auto_format(1), Some(Format::Svg));

    let obj = Renderable::HoloMap(
        (0..3)
            .map(|seed| Renderable::Element(h.ctx.add(curve(8, seed))))
            .collect(),
    );
    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.format, Format::Webm);
    assert_eq!(out.payload, Payload::Bytes(b"ffmpeg:3".to_vec()));
    assert_eq!(h.encoder.run_count(), 1);
    assert_eq!(h.encoder.frames_seen(), vec![3]);
}

#[test]
fn empty_object_renders_nothing() {
    let mut h = static_renderer(RendererPrefs::default()).unwrap();
    let empty = Renderable::Layout(Layout::row(Vec::new()));
    assert!(h
        .renderer
        .render(&mut h.ctx, &empty, explicit(Format::Png))
        .unwrap()
        .is_none());
    assert!(h.canvas.created().is_empty());
}

#[test]
fn live_embed_opens_one_session_per_render() {
    let host = RecordingSessionHost::new();
    let mut h = RendererHarness::live(RendererPrefs::default(), host.clone()).unwrap();
    assert_eq!(h.renderer.mode(), InteractionMode::LiveEmbed);
    let obj = one_curve(&mut h);

    for _ in 0..2 {
        let out = h
            .renderer
            .render(&mut h.ctx, &obj, explicit(Format::Html))
            .unwrap()
            .unwrap();
        assert!(out.payload.is_empty());
    }
    assert_eq!(host.opened(), vec![(0, FigureId(0)), (1, FigureId(1))]);
    assert_eq!(host.shows(), 2);
    // nothing is printed; the session draws the figure itself
    assert_eq!(h.canvas.print_count(), 0);
}

#[test]
fn live_embed_without_a_session_returns_empty_markup() {
    let host = RecordingSessionHost::new();
    host.set_unavailable(true);
    let mut h = RendererHarness::live(RendererPrefs::default(), host.clone()).unwrap();
    let obj = one_curve(&mut h);
    let out = h
        .renderer
        .render(&mut h.ctx, &obj, explicit(Format::Html))
        .unwrap()
        .unwrap();
    assert_eq!(out.payload, Payload::Text(String::new()));
    assert!(host.opened().is_empty());
}

#[test]
fn interactive_json_carries_the_figure_tree() {
    let conv = FakeHtmlConverter::new();
    let mut h = RendererHarness::interactive(
        RendererPrefs {
            dpi: Some(100.0),
            ..RendererPrefs::default()
        },
        conv.clone(),
    )
    .unwrap();
    let a = h.ctx.add(curve(5, 1));
    let b = h.ctx.add(points(5, 2));
    let obj = Renderable::Layout(Layout::row(vec![a, b]));

    let out = h
        .renderer
        .render(&mut h.ctx, &obj, explicit(Format::Json))
        .unwrap()
        .unwrap();
    assert_eq!(
        out.payload,
        Payload::Json(json!({"figure": "figure#0", "dpi": 100.0, "axes": 2}))
    );
    assert_eq!(out.meta.mime_type, "text/json");
    assert_eq!(conv.connected(), vec![(FigureId(0), 14)]);
}

#[test]
fn interactive_html_is_centered() {
    let prefs = RendererPrefs {
        fig: Some(FormatRequest::Auto),
        ..RendererPrefs::default()
    };
    let mut h = RendererHarness::interactive(prefs, FakeHtmlConverter::new()).unwrap();
    let obj = one_curve(&mut h);
    let out = h
        .renderer
        .render(&mut h.ctx, &obj, FormatRequest::Auto)
        .unwrap()
        .unwrap();
    assert_eq!(out.meta.format, Format::Html);
    assert_eq!(
        out.payload,
        Payload::Text(
            "<center><div class=\"figure\" data-figure=\"figure#0\" data-axes=\"1\"></div></center>"
                .to_owned()
        )
    );
}
