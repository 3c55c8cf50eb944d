// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative objects accepted by the renderer.

use crate::ids::ElementId;

/// Elements arranged on a grid, filled row by row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Elements in display order.
    pub items: Vec<ElementId>,
    /// Grid width; at least one.
    pub cols: u16,
}

impl Layout {
    /// A single-row layout.
    pub fn row(items: Vec<ElementId>) -> Self {
        let cols = u16::try_from(items.len().max(1)).unwrap_or(u16::MAX);
        Self { items, cols }
    }

    /// Grid position `(row, col)` of the `index`-th item.
    pub fn position(&self, index: usize) -> (u16, u16) {
        let cols = usize::from(self.cols.max(1));
        let row = u16::try_from(index / cols).unwrap_or(u16::MAX);
        let col = u16::try_from(index % cols).unwrap_or(u16::MAX);
        (row, col)
    }
}

/// Anything the renderer can turn into a plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Renderable {
    /// A single element.
    Element(ElementId),
    /// A composite of elements.
    Layout(Layout),
    /// A sequence of frames rendered on one figure.
    HoloMap(Vec<Renderable>),
}

impl Renderable {
    /// Frames of this object; a non-map object is one frame.
    ///
    /// Nested maps are flattened.
    pub fn frames(&self) -> Vec<&Self> {
        match self {
            Self::HoloMap(frames) => frames.iter().flat_map(Self::frames).collect(),
            other => vec![other],
        }
    }

    /// The last frame, used for size heuristics.
    pub fn last(&self) -> Option<&Self> {
        self.frames().last().copied()
    }

    /// Elements of one frame, in display order.
    pub fn elements(&self) -> Vec<ElementId> {
        match self {
            Self::Element(id) => vec![*id],
            Self::Layout(layout) => layout.items.clone(),
            Self::HoloMap(_) => self.last().map(Self::elements).unwrap_or_default(),
        }
    }
}
