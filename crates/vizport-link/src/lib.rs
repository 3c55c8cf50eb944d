// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Link declarations and their render-time resolution.
//!
//! A link binds two independently declared elements. The [`LinkRegistry`]
//! stores declarations keyed by the source's [`LinkKey`]; the
//! [`LinkResolver`] runs once per plot construction and rewires the built
//! plot tree so that linked leaves share live handles:
//!
//! - a range link makes the target observe the source's axis range object;
//! - a data link merges both data sources into one shared column store.
//!
//! Declaration errors surface immediately as [`ConfigurationError`].
//! Resolution errors surface at render time as [`LinkResolutionError`] and
//! abort that render.

use thiserror::Error;
use vizport_model::{Axis, ElementId, LinkKey};

mod link;
mod merge;
mod registry;
mod resolve;

pub use link::{AxisSet, Link, LinkId, LinkKind, LinkSpec};
pub use merge::merge_sources;
pub use registry::LinkRegistry;
pub use resolve::{LinkCallback, LinkResolver, ResolveReport};

/// An invalid link declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The link kind needs a target and none was given.
    #[error("{kind} link requires a target element")]
    MissingTarget {
        /// Display name of the link kind.
        kind: String,
    },
    /// The axis set is not allowed for the link kind.
    #[error("invalid axes {axes:?} for {kind} link: {reason}")]
    InvalidAxes {
        /// Display name of the link kind.
        kind: String,
        /// The axes as given.
        axes: Vec<String>,
        /// What is wrong with them.
        reason: &'static str,
    },
    /// An endpoint is not a live element.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
}

/// A link that could not be applied to the plot being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkResolutionError {
    /// The link's target is not part of the composite being rendered.
    #[error("link {link} targets {target}, which is not present in this plot")]
    TargetNotFound {
        /// Offending link.
        link: LinkId,
        /// Missing endpoint.
        target: LinkKey,
    },
    /// A linked plot lacks the handle the link operates on.
    #[error("link {link}: plot at {path} has no {handle} handle")]
    MissingHandle {
        /// Offending link.
        link: LinkId,
        /// Subplot path, rendered for display.
        path: String,
        /// Handle name.
        handle: String,
    },
    /// Source and target data sources have different row counts.
    #[error(
        "data link source length {source_len} does not match target length {target_len}"
    )]
    LengthMismatch {
        /// Row count on the source side.
        source_len: usize,
        /// Row count on the target side.
        target_len: usize,
    },
    /// A column present on both sides holds different values.
    #[error("data link requires overlapping columns to be equal; {column} differs")]
    ColumnMismatch {
        /// Column name.
        column: String,
    },
    /// A custom link has no registered callback.
    #[error("no callback registered for custom link kind {0}")]
    MissingCallback(String),
    /// A custom callback rejected the link.
    #[error("custom link {name} failed: {reason}")]
    Callback {
        /// Custom kind name.
        name: String,
        /// Callback message.
        reason: String,
    },
}

pub(crate) fn axis_names(axes: &[Axis]) -> Vec<String> {
    axes.iter().map(ToString::to_string).collect()
}
