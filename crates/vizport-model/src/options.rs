// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Style-option lookup port.
//!
//! Option resolution (precedence, inheritance, themes) belongs to the host.
//! The render core only asks for the already-resolved options of one element.

use std::collections::BTreeMap;

use crate::ids::ElementId;

/// Option group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionCategory {
    /// Figure-level options (`fig_inches`, …).
    Plot,
    /// Glyph styling (`color`, …).
    Style,
    /// Colour normalization.
    Norm,
}

/// One resolved option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// Flag.
    Bool(bool),
    /// Scalar.
    Float(f64),
    /// Two-component value such as `(width, height)`.
    Pair(f64, f64),
    /// String, including dimension references.
    Text(String),
}

/// Resolved options of one category.
pub type PlotOptions = BTreeMap<String, OptionValue>;

/// Host-provided option resolution.
pub trait OptionLookup {
    /// Resolved options of `category` for `element` under `backend`.
    fn lookup_options(&self, backend: &str, element: ElementId, category: OptionCategory)
        -> PlotOptions;
}

/// Flat option table: the simplest [`OptionLookup`].
#[derive(Clone, Debug, Default)]
pub struct OptionTable {
    entries: BTreeMap<(String, ElementId, OptionCategory), PlotOptions>,
}

impl OptionTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option.
    pub fn set(
        &mut self,
        backend: &str,
        element: ElementId,
        category: OptionCategory,
        key: impl Into<String>,
        value: OptionValue,
    ) -> &mut Self {
        self.entries
            .entry((backend.to_owned(), element, category))
            .or_default()
            .insert(key.into(), value);
        self
    }
}

impl OptionLookup for OptionTable {
    fn lookup_options(
        &self,
        backend: &str,
        element: ElementId,
        category: OptionCategory,
    ) -> PlotOptions {
        self.entries
            .get(&(backend.to_owned(), element, category))
            .cloned()
            .unwrap_or_default()
    }
}
