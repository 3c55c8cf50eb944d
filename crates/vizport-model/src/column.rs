// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tabular columns and the column store backing a plot's `source` handle.

use std::collections::btree_map::{self, BTreeMap};

/// One named column of a data source.
///
/// The length of a column is its outer length: for [`Column::Ragged`] that is
/// the number of paths, not the number of vertices.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numeric values, one per row.
    Float(Vec<f64>),
    /// Categorical values, one per row.
    Text(Vec<String>),
    /// One coordinate array per row (multi-path geometry).
    Ragged(Vec<Vec<f64>>),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Ragged(v) => v.len(),
        }
    }

    /// `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the column's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Ragged(_) => "ragged",
        }
    }
}

/// Named columns keyed in sorted order.
///
/// This is what a plot's `source` handle points at. Linked plots share one
/// `ColumnData` behind a [`SharedSource`](crate::SharedSource).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnData {
    columns: BTreeMap<String, Column>,
}

impl ColumnData {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Row count, taken from the first column in key order.
    ///
    /// Returns `None` when the store has no columns.
    pub fn row_count(&self) -> Option<usize> {
        self.columns.values().next().map(Column::len)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// `true` if the store has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// `true` if a column named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Insert or replace a column, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Option<Column> {
        self.columns.insert(name.into(), column)
    }

    /// Column names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterate `(name, column)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Column> {
        self.columns.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Column)> for ColumnData {
    fn from_iter<I: IntoIterator<Item = (S, Column)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ColumnData {
    type Item = (&'a String, &'a Column);
    type IntoIter = btree_map::Iter<'a, String, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
