// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plot tree and the shared handles links operate on.
//!
//! A composite plot is a tree: the root holds one [`SubplotKey::Cell`] per
//! layout position and each cell holds a [`MAIN_SUBPLOT`] leaf bound to one
//! element. Leaves own [`Handles`], the live backend objects that links
//! rewire. Handles are reference-counted so that linking is object sharing,
//! not value copying: after a range link both leaves hold the *same*
//! [`SharedRange`], and a pan on either is visible through both.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::column::ColumnData;
use crate::ids::{ElementId, LinkKey};

/// Name of the leaf subplot inside a layout cell.
pub const MAIN_SUBPLOT: &str = "main";

/// Plot axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    /// Handle name of this axis' range (`x_range` / `y_range`).
    pub fn range_handle(self) -> &'static str {
        match self {
            Self::X => "x_range",
            Self::Y => "y_range",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
        })
    }
}

/// Visible extent along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range1d {
    /// Lower bound.
    pub start: f64,
    /// Upper bound.
    pub end: f64,
}

impl Range1d {
    /// Range from bounds.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Shift both bounds by `delta`.
    pub fn pan(&mut self, delta: f64) {
        self.start += delta;
        self.end += delta;
    }
}

impl Default for Range1d {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Live axis range shared between linked plots.
pub type SharedRange = Rc<RefCell<Range1d>>;

/// Live data source shared between linked plots.
pub type SharedSource = Rc<RefCell<ColumnData>>;

/// A concrete backend object held by a plot.
#[derive(Clone, Debug)]
pub enum Handle {
    /// Axis range.
    Range(SharedRange),
    /// Tabular data source.
    Source(SharedSource),
}

/// Named handles of one plot.
#[derive(Clone, Debug, Default)]
pub struct Handles {
    entries: BTreeMap<String, Handle>,
}

impl Handles {
    /// Look up a handle by name.
    pub fn get(&self, name: &str) -> Option<&Handle> {
        self.entries.get(name)
    }

    /// Insert or replace a handle.
    pub fn insert(&mut self, name: impl Into<String>, handle: Handle) -> Option<Handle> {
        self.entries.insert(name.into(), handle)
    }

    /// Handle names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Range handle for `axis`, if present.
    pub fn range(&self, axis: Axis) -> Option<&SharedRange> {
        match self.entries.get(axis.range_handle()) {
            Some(Handle::Range(r)) => Some(r),
            _ => None,
        }
    }

    /// Replace the range handle for `axis`.
    pub fn set_range(&mut self, axis: Axis, range: SharedRange) {
        self.entries
            .insert(axis.range_handle().to_owned(), Handle::Range(range));
    }

    /// The `source` handle, if present.
    pub fn source(&self) -> Option<&SharedSource> {
        match self.entries.get("source") {
            Some(Handle::Source(s)) => Some(s),
            _ => None,
        }
    }

    /// Replace the `source` handle.
    pub fn set_source(&mut self, source: SharedSource) {
        self.entries.insert("source".to_owned(), Handle::Source(source));
    }
}

/// Key of a subplot inside its parent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubplotKey {
    /// Layout position.
    Cell {
        /// Row index.
        row: u16,
        /// Column index.
        col: u16,
    },
    /// Named child, e.g. [`MAIN_SUBPLOT`].
    Named(String),
}

impl SubplotKey {
    /// Layout cell key.
    pub fn cell(row: u16, col: u16) -> Self {
        Self::Cell { row, col }
    }

    /// The `main` leaf key.
    pub fn main() -> Self {
        Self::Named(MAIN_SUBPLOT.to_owned())
    }
}

impl fmt::Display for SubplotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell { row, col } => write!(f, "({row}, {col})"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A resolved, drawable plot node.
#[derive(Clone, Debug, Default)]
pub struct Plot {
    /// Element drawn by this node (leaves only).
    pub element: Option<ElementId>,
    /// Link key of that element at build time.
    pub link_key: Option<LinkKey>,
    /// Child plots.
    pub subplots: BTreeMap<SubplotKey, Plot>,
    /// Live backend objects.
    pub handles: Handles,
}

impl Plot {
    /// Empty composite node.
    pub fn composite() -> Self {
        Self::default()
    }

    /// Leaf bound to an element.
    pub fn leaf(element: ElementId, link_key: LinkKey) -> Self {
        Self {
            element: Some(element),
            link_key: Some(link_key),
            ..Self::default()
        }
    }

    /// `true` if this node draws an element itself.
    pub fn is_leaf(&self) -> bool {
        self.element.is_some()
    }

    /// Paths to every leaf, depth-first in key order.
    pub fn leaf_paths(&self) -> Vec<Vec<SubplotKey>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect_leaf_paths(&mut prefix, &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &mut Vec<SubplotKey>, out: &mut Vec<Vec<SubplotKey>>) {
        if self.is_leaf() {
            out.push(prefix.clone());
        }
        for (key, child) in &self.subplots {
            prefix.push(key.clone());
            child.collect_leaf_paths(prefix, out);
            prefix.pop();
        }
    }

    /// Node at `path`, relative to this one.
    pub fn at(&self, path: &[SubplotKey]) -> Option<&Self> {
        path.iter().try_fold(self, |node, key| node.subplots.get(key))
    }

    /// Mutable node at `path`, relative to this one.
    pub fn at_mut(&mut self, path: &[SubplotKey]) -> Option<&mut Self> {
        path.iter()
            .try_fold(self, |node, key| node.subplots.get_mut(key))
    }

    /// The `main` leaf of layout cell `(row, col)`.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Self> {
        self.at(&[SubplotKey::cell(row, col), SubplotKey::main()])
    }

    /// All leaves, depth-first in key order.
    pub fn leaves(&self) -> Vec<&Self> {
        self.leaf_paths()
            .iter()
            .filter_map(|path| self.at(path))
            .collect()
    }

    /// Distinct data sources across all leaves, compared by identity.
    pub fn distinct_sources(&self) -> Vec<SharedSource> {
        let mut out: Vec<SharedSource> = Vec::new();
        for leaf in self.leaves() {
            if let Some(source) = leaf.handles.source() {
                if !out.iter().any(|s| Rc::ptr_eq(s, source)) {
                    out.push(Rc::clone(source));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn layout_of(n: u16) -> Plot {
        let mut root = Plot::composite();
        for col in 0..n {
            let mut cell = Plot::composite();
            let mut leaf = Plot::leaf(ElementId(u32::from(col)), LinkKey(u32::from(col)));
            leaf.handles
                .set_source(Rc::new(RefCell::new(ColumnData::new())));
            cell.subplots.insert(SubplotKey::main(), leaf);
            root.subplots.insert(SubplotKey::cell(0, col), cell);
        }
        root
    }

    #[test]
    fn leaf_paths_follow_key_order() {
        let root = layout_of(3);
        let paths = root.leaf_paths();
        assert_eq!(paths.len(), 3);
        assert_eq!(
            paths[1],
            vec![SubplotKey::cell(0, 1), SubplotKey::main()]
        );
        assert_eq!(root.cell(0, 2).and_then(|p| p.element), Some(ElementId(2)));
    }

    #[test]
    fn distinct_sources_compares_identity() {
        let mut root = layout_of(2);
        assert_eq!(root.distinct_sources().len(), 2);

        let shared = Rc::clone(root.cell(0, 0).unwrap().handles.source().unwrap());
        let path = [SubplotKey::cell(0, 1), SubplotKey::main()];
        root.at_mut(&path).unwrap().handles.set_source(shared);
        assert_eq!(root.distinct_sources().len(), 1);
    }

    #[test]
    fn shared_range_observes_pan() {
        let range: SharedRange = Rc::new(RefCell::new(Range1d::default()));
        let mut a = Handles::default();
        let mut b = Handles::default();
        a.set_range(Axis::X, Rc::clone(&range));
        b.set_range(Axis::X, range);
        a.range(Axis::X).unwrap().borrow_mut().pan(2.0);
        assert_eq!(b.range(Axis::X).unwrap().borrow().start, 2.0);
    }
}
