// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Link declarations.

use core::fmt;

use vizport_model::{Axis, ElementId, LinkKey};

use crate::{axis_names, ConfigurationError};

/// Registry-assigned link identifier.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// What a link shares.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// The target observes the source's axis range objects.
    Range,
    /// Source and target draw from one merged data source.
    Data,
    /// Host-defined behaviour, applied by a named [`LinkCallback`](crate::LinkCallback).
    Custom {
        /// Callback name.
        name: String,
        /// Whether a target element is mandatory.
        requires_target: bool,
    },
}

impl LinkKind {
    /// Whether declarations of this kind must name a target.
    pub fn requires_target(&self) -> bool {
        match self {
            Self::Range | Self::Data => true,
            Self::Custom {
                requires_target, ..
            } => *requires_target,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range => f.write_str("range"),
            Self::Data => f.write_str("data"),
            Self::Custom { name, .. } => write!(f, "custom:{name}"),
        }
    }
}

/// A validated, duplicate-free subset of {x, y}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AxisSet {
    x: bool,
    y: bool,
}

impl AxisSet {
    /// The empty set.
    pub const NONE: Self = Self { x: false, y: false };
    /// `{x}`, the range-link default.
    pub const X: Self = Self { x: true, y: false };
    /// `{x, y}`.
    pub const XY: Self = Self { x: true, y: true };

    /// Parse axis names, rejecting unknown names and duplicates.
    pub fn parse(kind: &LinkKind, names: &[&str]) -> Result<Self, ConfigurationError> {
        let invalid = |reason| ConfigurationError::InvalidAxes {
            kind: kind.to_string(),
            axes: names.iter().map(|s| (*s).to_owned()).collect(),
            reason,
        };
        let mut axes = Vec::with_capacity(names.len());
        for name in names {
            axes.push(match *name {
                "x" => Axis::X,
                "y" => Axis::Y,
                _ => return Err(invalid("axes must be drawn from {x, y}")),
            });
        }
        Self::from_axes(kind, &axes)
    }

    /// Build from axes, rejecting duplicates.
    pub fn from_axes(kind: &LinkKind, axes: &[Axis]) -> Result<Self, ConfigurationError> {
        let mut set = Self::NONE;
        for axis in axes {
            let slot = match axis {
                Axis::X => &mut set.x,
                Axis::Y => &mut set.y,
            };
            if *slot {
                return Err(ConfigurationError::InvalidAxes {
                    kind: kind.to_string(),
                    axes: axis_names(axes),
                    reason: "axis listed more than once",
                });
            }
            *slot = true;
        }
        Ok(set)
    }

    /// `true` if no axis is set.
    pub fn is_empty(self) -> bool {
        !self.x && !self.y
    }

    /// `true` if `axis` is in the set.
    pub fn contains(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Axes in the set, x before y.
    pub fn iter(self) -> impl Iterator<Item = Axis> {
        [(self.x, Axis::X), (self.y, Axis::Y)]
            .into_iter()
            .filter_map(|(on, axis)| on.then_some(axis))
    }
}

/// A link declaration as written by the user, before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkSpec {
    /// Source element.
    pub source: ElementId,
    /// Target element, if any.
    pub target: Option<ElementId>,
    /// Link kind.
    pub kind: LinkKind,
    /// Requested axes; empty means the kind's default.
    pub axes: Vec<Axis>,
    /// Whether the link is copied onto unlinked clones of the source.
    pub transient: bool,
}

impl LinkSpec {
    fn new(kind: LinkKind, source: ElementId, target: Option<ElementId>) -> Self {
        Self {
            source,
            target,
            kind,
            axes: Vec::new(),
            transient: false,
        }
    }

    /// Range link from `source` to `target`.
    pub fn range(source: ElementId, target: ElementId) -> Self {
        Self::new(LinkKind::Range, source, Some(target))
    }

    /// Data link from `source` to `target`.
    pub fn data(source: ElementId, target: ElementId) -> Self {
        Self::new(LinkKind::Data, source, Some(target))
    }

    /// Custom link applied by the callback registered under `name`.
    pub fn custom(name: impl Into<String>, source: ElementId, target: Option<ElementId>) -> Self {
        let kind = LinkKind::Custom {
            name: name.into(),
            requires_target: target.is_some(),
        };
        Self::new(kind, source, target)
    }

    /// Set the axes.
    pub fn with_axes(mut self, axes: &[Axis]) -> Self {
        self.axes = axes.to_vec();
        self
    }

    /// Mark the link transient.
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }
}

/// A registered link, keyed by link identity rather than element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Registry id.
    pub id: LinkId,
    /// Source endpoint.
    pub source: LinkKey,
    /// Target endpoint, if the kind has one.
    pub target: Option<LinkKey>,
    /// Link kind.
    pub kind: LinkKind,
    /// Validated axes.
    pub axes: AxisSet,
    /// Copied onto unlinked clones of the source.
    pub transient: bool,
}

impl Link {
    /// `true` if this link has the same (source, target, kind) identity.
    pub fn same_binding(&self, source: LinkKey, target: Option<LinkKey>, kind: &LinkKind) -> bool {
        self.source == source && self.target == target && &self.kind == kind
    }
}
