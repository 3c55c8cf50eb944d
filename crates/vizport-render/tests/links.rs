// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Link resolution through the full plot build.
#![allow(clippy::unwrap_used, clippy::panic, clippy::cast_precision_loss)]

use std::rc::Rc;

use vizport_config::RendererPrefs;
use vizport_dry_tests::fixtures::{curve, points, squares};
use vizport_dry_tests::{static_renderer, RendererHarness};
use vizport_link::{LinkResolutionError, LinkSpec};
use vizport_model::{
    Axis, Column, ColumnData, Element, ElementId, Format, FormatRequest, Layout, OptionCategory,
    OptionTable, OptionValue, PathGeom, Renderable,
};
use vizport_render::{RenderError, ResolvedPlot};

fn harness() -> RendererHarness {
    static_renderer(RendererPrefs::default()).unwrap()
}

fn layout(ids: &[ElementId]) -> Renderable {
    Renderable::Layout(Layout::row(ids.to_vec()))
}

fn build(h: &mut RendererHarness, obj: &Renderable) -> ResolvedPlot {
    h.renderer.get_plot(&mut h.ctx, obj).unwrap().unwrap()
}

fn labels(n: usize) -> Element {
    let names = (0..n).map(|i| format!("row{i}")).collect();
    let columns: ColumnData = [
        ("A", Column::Text(names)),
        ("B", Column::Float((0..n).map(|i| i as f64).collect())),
    ]
    .into_iter()
    .collect();
    Element::table(&["A"], &["B"], columns)
}

fn column_names(plot: &ResolvedPlot, row: u16, col: u16) -> Vec<String> {
    let leaf = plot.current().cell(row, col).unwrap();
    let source = leaf.handles.source().unwrap().borrow();
    let names = source.names().map(str::to_owned).collect();
    names
}

#[test]
fn x_range_link_shares_only_the_x_range() {
    let mut h = harness();
    let a = h.ctx.add(curve(10, 1));
    let b = h.ctx.add(curve(10, 2));
    h.ctx.link(LinkSpec::range(a, b).with_axes(&[Axis::X])).unwrap();

    let plot = build(&mut h, &layout(&[a, b]));
    let src = plot.current().cell(0, 0).unwrap();
    let tgt = plot.current().cell(0, 1).unwrap();
    assert!(Rc::ptr_eq(
        src.handles.range(Axis::X).unwrap(),
        tgt.handles.range(Axis::X).unwrap()
    ));
    assert!(!Rc::ptr_eq(
        src.handles.range(Axis::Y).unwrap(),
        tgt.handles.range(Axis::Y).unwrap()
    ));

    // panning the source moves the target
    src.handles.range(Axis::X).unwrap().borrow_mut().pan(2.5);
    let moved = *tgt.handles.range(Axis::X).unwrap().borrow();
    assert!((moved.start - 2.5).abs() < 1e-12);
}

#[test]
fn xy_range_link_shares_both_ranges() {
    let mut h = harness();
    let a = h.ctx.add(points(6, 3));
    let b = h.ctx.add(points(6, 4));
    h.ctx
        .link(LinkSpec::range(a, b).with_axes(&[Axis::X, Axis::Y]))
        .unwrap();

    let plot = build(&mut h, &layout(&[a, b]));
    let src = plot.current().cell(0, 0).unwrap();
    let tgt = plot.current().cell(0, 1).unwrap();
    for axis in [Axis::X, Axis::Y] {
        assert!(Rc::ptr_eq(
            src.handles.range(axis).unwrap(),
            tgt.handles.range(axis).unwrap()
        ));
    }
}

#[test]
fn polygons_linked_to_table_share_one_merged_source() {
    let mut h = harness();
    let polys = h.ctx.add(Element::polygons(squares(5)));
    let table = h.ctx.add(labels(5));
    h.ctx.link(LinkSpec::data(polys, table)).unwrap();

    let plot = build(&mut h, &layout(&[polys, table]));
    let sources = plot.current().distinct_sources();
    assert_eq!(sources.len(), 1);

    let merged = sources[0].borrow();
    let names: Vec<&str> = merged.names().collect();
    for name in ["xs", "ys", "z", "A", "B"] {
        assert!(names.contains(&name), "missing column {name}");
    }
    assert_eq!(merged.row_count(), Some(5));
    assert_eq!(
        merged.get("z"),
        Some(&Column::Float(vec![0.0, 1.0, 2.0, 3.0, 4.0]))
    );
    match merged.get("A") {
        Some(Column::Text(rows)) => assert_eq!(rows[3], "row3"),
        other => panic!("unexpected A column {other:?}"),
    }
}

#[test]
fn points_linked_to_table_merge_columns() {
    let mut h = harness();
    let pts = h.ctx.add(points(4, 9));
    let table = h.ctx.add(labels(4));
    h.ctx.link(LinkSpec::data(pts, table)).unwrap();

    let plot = build(&mut h, &layout(&[pts, table]));
    assert_eq!(plot.current().distinct_sources().len(), 1);
    assert_eq!(column_names(&plot, 0, 1), vec!["A", "B", "x", "y"]);
}

#[test]
fn unlinked_clones_keep_independent_sources() {
    let mut h = harness();
    let polys = h.ctx.add(Element::polygons(squares(3)));
    let table = h.ctx.add(labels(3));
    h.ctx.link(LinkSpec::data(polys, table)).unwrap();

    let polys2 = h.ctx.clone_element(polys, false).unwrap();
    let table2 = h.ctx.clone_element(table, false).unwrap();
    assert!(h.ctx.links.lookup_element(&h.ctx.elements, polys2).is_empty());
    assert!(h.ctx.links.lookup_element(&h.ctx.elements, table2).is_empty());

    let plot = build(&mut h, &layout(&[polys2, table2]));
    assert_eq!(plot.current().distinct_sources().len(), 2);
    assert_eq!(column_names(&plot, 0, 0), vec!["xs", "ys", "z"]);
}

#[test]
fn linked_clone_inherits_the_link() {
    let mut h = harness();
    let a = h.ctx.add(curve(8, 1));
    let b = h.ctx.add(curve(8, 2));
    h.ctx.link(LinkSpec::range(a, b)).unwrap();
    let a2 = h.ctx.clone_element(a, true).unwrap();

    let plot = build(&mut h, &layout(&[a2, b]));
    let src = plot.current().cell(0, 0).unwrap();
    let tgt = plot.current().cell(0, 1).unwrap();
    assert!(Rc::ptr_eq(
        src.handles.range(Axis::X).unwrap(),
        tgt.handles.range(Axis::X).unwrap()
    ));
}

fn zigzags() -> Element {
    Element::path(vec![
        PathGeom::from_vertices(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 1.0]])
            .with_values("z", vec![0.0, 1.0, 2.0, 3.0]),
        PathGeom::from_vertices(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]])
            .with_values("z", vec![5.0, 6.0, 7.0]),
    ])
}

#[test]
fn coloured_path_links_to_table_per_segment() {
    let mut style = OptionTable::new();
    style.set(
        "vizport",
        ElementId(0),
        OptionCategory::Style,
        "color",
        OptionValue::Text("z".into()),
    );
    let mut h = harness().with_options(style);
    let path = h.ctx.add(zigzags());
    assert_eq!(path, ElementId(0));
    let table = h.ctx.add(labels(5));
    h.ctx.link(LinkSpec::data(path, table)).unwrap();

    let plot = build(&mut h, &layout(&[path, table]));
    let path_leaf = plot.current().cell(0, 0).unwrap();
    let table_leaf = plot.current().cell(0, 1).unwrap();
    assert!(Rc::ptr_eq(
        path_leaf.handles.source().unwrap(),
        table_leaf.handles.source().unwrap()
    ));

    let merged = path_leaf.handles.source().unwrap().borrow();
    assert_eq!(merged.row_count(), Some(5));
    assert_eq!(
        merged.get("z"),
        Some(&Column::Float(vec![0.0, 1.0, 2.0, 5.0, 6.0]))
    );
    assert!(merged.get("A").is_some());
}

#[test]
fn uncoloured_path_keeps_one_row_per_path() {
    let mut h = harness();
    let path = h.ctx.add(zigzags());
    let table = h.ctx.add(labels(5));
    h.ctx.link(LinkSpec::data(path, table)).unwrap();

    let err = h
        .renderer
        .get_plot(&mut h.ctx, &layout(&[path, table]))
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Link(LinkResolutionError::LengthMismatch {
            source_len: 2,
            target_len: 5
        })
    ));
}

#[test]
fn chained_data_links_share_one_source() {
    let mut h = harness();
    let left = h.ctx.add(labels(5));
    let polys = h.ctx.add(Element::polygons(squares(5)));
    let right = h.ctx.add(labels(5));
    h.ctx.link(LinkSpec::data(left, right)).unwrap();
    h.ctx.link(LinkSpec::data(polys, left)).unwrap();

    let plot = build(&mut h, &layout(&[left, polys, right]));
    let sources = plot.current().distinct_sources();
    assert_eq!(sources.len(), 1);
    assert_eq!(column_names(&plot, 0, 2), vec!["A", "B", "xs", "ys", "z"]);
}

#[test]
fn chained_range_links_share_one_range() {
    let mut h = harness();
    let a = h.ctx.add(curve(6, 1));
    let b = h.ctx.add(curve(6, 2));
    let c = h.ctx.add(curve(6, 3));
    h.ctx.link(LinkSpec::range(b, c)).unwrap();
    h.ctx.link(LinkSpec::range(a, b)).unwrap();

    let plot = build(&mut h, &layout(&[b, a, c]));
    let shared = plot.current().cell(0, 1).unwrap().handles.range(Axis::X).unwrap();
    for col in [0, 2] {
        let leaf = plot.current().cell(0, col).unwrap();
        assert!(Rc::ptr_eq(shared, leaf.handles.range(Axis::X).unwrap()));
    }
}

#[test]
fn row_mismatch_fails_at_render_not_declaration() {
    let mut h = harness();
    let polys = h.ctx.add(Element::polygons(squares(2)));
    let table = h.ctx.add(labels(3));
    h.ctx.link(LinkSpec::data(polys, table)).unwrap();

    let err = h
        .renderer
        .render(
            &mut h.ctx,
            &layout(&[polys, table]),
            FormatRequest::Explicit(Format::Png),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Link(LinkResolutionError::LengthMismatch {
            source_len: 2,
            target_len: 3
        })
    ));
    // nothing was drawn
    assert!(h.canvas.untouched());
}

#[test]
fn target_outside_the_composite_is_an_error() {
    let mut h = harness();
    let a = h.ctx.add(curve(4, 1));
    let b = h.ctx.add(curve(4, 2));
    h.ctx.link(LinkSpec::range(a, b)).unwrap();

    let err = h
        .renderer
        .get_plot(&mut h.ctx, &Renderable::Element(a))
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Link(LinkResolutionError::TargetNotFound { .. })
    ));

    // the target alone renders fine: it is not a link source
    assert!(h
        .renderer
        .get_plot(&mut h.ctx, &Renderable::Element(b))
        .unwrap()
        .is_some());
}

#[test]
fn removing_the_source_drops_its_links() {
    let mut h = harness();
    let a = h.ctx.add(curve(4, 1));
    let b = h.ctx.add(curve(4, 2));
    h.ctx.link(LinkSpec::range(a, b)).unwrap();
    h.ctx.remove(a).unwrap();
    assert!(h.ctx.links.is_empty());
}
