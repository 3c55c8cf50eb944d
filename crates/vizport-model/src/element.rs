// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative elements: the smallest things a plot can be built from.

use std::collections::BTreeMap;

use crate::column::{Column, ColumnData};
use crate::plot::Axis;

/// Element type, which decides how the element becomes a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Connected line over one key dimension.
    Curve,
    /// Unconnected markers over one key dimension.
    Scatter,
    /// Markers over two key dimensions.
    Points,
    /// Plain tabular data, drawn as a table with no axes.
    Table,
    /// Closed multi-path geometry.
    Polygons,
    /// Open multi-path geometry.
    Path,
}

impl ElementKind {
    /// `true` for multi-path kinds whose rows are paths rather than samples.
    pub fn is_geometry(self) -> bool {
        matches!(self, Self::Polygons | Self::Path)
    }

    /// `true` if plots of this kind carry axis ranges.
    pub fn has_axes(self) -> bool {
        !matches!(self, Self::Table)
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Curve => "curve",
            Self::Scatter => "scatter",
            Self::Points => "points",
            Self::Table => "table",
            Self::Polygons => "polygons",
            Self::Path => "path",
        }
    }
}

/// One path of a multi-path element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathGeom {
    /// Vertex x coordinates.
    pub xs: Vec<f64>,
    /// Vertex y coordinates.
    pub ys: Vec<f64>,
    /// Per-vertex values keyed by value dimension.
    pub values: BTreeMap<String, Vec<f64>>,
}

impl PathGeom {
    /// Build a path from `(x, y)` vertices.
    pub fn from_vertices(vertices: &[[f64; 2]]) -> Self {
        Self {
            xs: vertices.iter().map(|v| v[0]).collect(),
            ys: vertices.iter().map(|v| v[1]).collect(),
            values: BTreeMap::new(),
        }
    }

    /// Attach per-vertex values for a value dimension.
    pub fn with_values(mut self, dim: impl Into<String>, values: Vec<f64>) -> Self {
        self.values.insert(dim.into(), values);
        self
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// `true` if the path has no vertices.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// A single visual object in the declarative data model.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Element type.
    pub kind: ElementKind,
    /// Key dimension names, in declaration order.
    pub kdims: Vec<String>,
    /// Value dimension names, in declaration order.
    pub vdims: Vec<String>,
    /// Columnar data (empty for geometry kinds).
    pub columns: ColumnData,
    /// Paths (empty for columnar kinds).
    pub paths: Vec<PathGeom>,
}

impl Element {
    fn columnar(kind: ElementKind, kdims: &[&str], vdims: &[&str], columns: ColumnData) -> Self {
        Self {
            kind,
            kdims: kdims.iter().map(|d| (*d).to_owned()).collect(),
            vdims: vdims.iter().map(|d| (*d).to_owned()).collect(),
            columns,
            paths: Vec::new(),
        }
    }

    fn xy(kind: ElementKind, kdims: &[&str], vdims: &[&str], xs: Vec<f64>, ys: Vec<f64>) -> Self {
        let x = kdims.first().copied().unwrap_or("x");
        let y = kdims.get(1).or_else(|| vdims.first()).copied().unwrap_or("y");
        let columns = [(x, Column::Float(xs)), (y, Column::Float(ys))]
            .into_iter()
            .collect();
        Self::columnar(kind, kdims, vdims, columns)
    }

    /// Curve over `x` with values `y`.
    pub fn curve(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self::xy(ElementKind::Curve, &["x"], &["y"], xs, ys)
    }

    /// Scatter over `x` with values `y`.
    pub fn scatter(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self::xy(ElementKind::Scatter, &["x"], &["y"], xs, ys)
    }

    /// Points keyed by `(x, y)`.
    pub fn points(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self::xy(ElementKind::Points, &["x", "y"], &[], xs, ys)
    }

    /// Table with the given key and value dimensions.
    ///
    /// Columns are matched to dimensions by name; `columns` must contain one
    /// entry per dimension.
    pub fn table(kdims: &[&str], vdims: &[&str], columns: ColumnData) -> Self {
        Self::columnar(ElementKind::Table, kdims, vdims, columns)
    }

    /// Closed polygons.
    pub fn polygons(paths: Vec<PathGeom>) -> Self {
        Self::geometry(ElementKind::Polygons, paths)
    }

    /// Open paths.
    pub fn path(paths: Vec<PathGeom>) -> Self {
        Self::geometry(ElementKind::Path, paths)
    }

    fn geometry(kind: ElementKind, paths: Vec<PathGeom>) -> Self {
        let mut vdims: Vec<String> = Vec::new();
        for path in &paths {
            for dim in path.values.keys() {
                if !vdims.contains(dim) {
                    vdims.push(dim.clone());
                }
            }
        }
        Self {
            kind,
            kdims: vec!["x".to_owned(), "y".to_owned()],
            vdims,
            columns: ColumnData::new(),
            paths,
        }
    }

    /// Name of the dimension plotted along `axis`, if any.
    pub fn axis_dim(&self, axis: Axis) -> Option<&str> {
        if !self.kind.has_axes() {
            return None;
        }
        let dim = match axis {
            Axis::X => self.kdims.first(),
            Axis::Y => self.kdims.get(1).or_else(|| self.vdims.first()),
        };
        dim.map(String::as_str)
    }

    /// Data extent along `axis` as `(min, max)`, ignoring NaNs.
    ///
    /// Returns `None` for kinds without axes or when there is no finite data.
    pub fn extent(&self, axis: Axis) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = if self.kind.is_geometry() {
            Box::new(self.paths.iter().flat_map(move |p| match axis {
                Axis::X => p.xs.iter().copied(),
                Axis::Y => p.ys.iter().copied(),
            }))
        } else {
            match self.axis_dim(axis).and_then(|d| self.columns.get(d)) {
                Some(Column::Float(v)) => Box::new(v.iter().copied()),
                _ => return None,
            }
        };
        values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
