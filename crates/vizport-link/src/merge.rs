// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Data-link column merge.

use vizport_model::{Column, ColumnData};

use crate::LinkResolutionError;

const RTOL: f64 = 1e-5;
const ATOL: f64 = 1e-8;

fn close(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

fn all_close(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| close(*x, *y))
}

fn columns_match(a: &Column, b: &Column) -> bool {
    match (a, b) {
        (Column::Float(a), Column::Float(b)) => all_close(a, b),
        (Column::Text(a), Column::Text(b)) => a == b,
        (Column::Ragged(a), Column::Ragged(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| all_close(x, y))
        }
        _ => false,
    }
}

/// Merge `target` into `source`, producing the shared store of a data link.
///
/// Both sides must have the same row count, and every column present on both
/// sides must hold equal values (floats within tolerance, NaN equal to NaN).
/// Target columns are layered over the source's, so the result holds the
/// union of both column sets row-aligned by index.
pub fn merge_sources(
    source: &ColumnData,
    target: &ColumnData,
) -> Result<ColumnData, LinkResolutionError> {
    if let (Some(source_len), Some(target_len)) = (source.row_count(), target.row_count()) {
        if source_len != target_len {
            return Err(LinkResolutionError::LengthMismatch {
                source_len,
                target_len,
            });
        }
    }
    for (name, column) in target {
        if let Some(existing) = source.get(name) {
            if !columns_match(existing, column) {
                return Err(LinkResolutionError::ColumnMismatch {
                    column: name.clone(),
                });
            }
        }
    }
    let mut merged = source.clone();
    for (name, column) in target {
        merged.insert(name.clone(), column.clone());
    }
    Ok(merged)
}
