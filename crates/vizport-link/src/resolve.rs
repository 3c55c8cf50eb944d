// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render-time link resolution.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use tracing::{debug, instrument};
use vizport_model::{LinkKey, Plot, SubplotKey};

use crate::link::{Link, LinkKind};
use crate::merge::merge_sources;
use crate::registry::LinkRegistry;
use crate::LinkResolutionError;

/// Behaviour of a [`LinkKind::Custom`] link.
pub trait LinkCallback {
    /// Apply `link` to the built source and target plots.
    fn apply(
        &self,
        link: &Link,
        source: &mut Plot,
        target: Option<&mut Plot>,
    ) -> Result<(), LinkResolutionError>;
}

/// Counts of links applied by one [`LinkResolver::resolve`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Range links applied.
    pub ranges: usize,
    /// Data links applied.
    pub data: usize,
    /// Custom links applied.
    pub custom: usize,
}

impl ResolveReport {
    /// Total links applied.
    pub fn total(&self) -> usize {
        self.ranges + self.data + self.custom
    }
}

type PlotPath = Vec<SubplotKey>;

fn display_path(path: &[SubplotKey]) -> String {
    let mut out = String::from("root");
    for key in path {
        let _ = write!(out, "/{key}");
    }
    out
}

/// Binds registered links into a freshly built plot tree.
///
/// Run exactly once per plot construction, after every leaf has its handles
/// and before the first draw.
#[derive(Default)]
pub struct LinkResolver {
    callbacks: BTreeMap<String, Box<dyn LinkCallback>>,
}

impl LinkResolver {
    /// Resolver with no custom callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback for custom links named `name`.
    pub fn register(&mut self, name: impl Into<String>, callback: Box<dyn LinkCallback>) {
        self.callbacks.insert(name.into(), callback);
    }

    /// Apply every link whose source is a leaf of `root`.
    ///
    /// Leaves are visited in key order. The target of a link is the first
    /// other leaf carrying the target's [`LinkKey`]; if there is none the
    /// render fails with [`LinkResolutionError::TargetNotFound`].
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(
        &self,
        registry: &LinkRegistry,
        root: &mut Plot,
    ) -> Result<ResolveReport, LinkResolutionError> {
        let keyed: Vec<(PlotPath, LinkKey)> = root
            .leaf_paths()
            .into_iter()
            .filter_map(|path| {
                let key = root.at(&path)?.link_key?;
                Some((path, key))
            })
            .collect();

        let mut report = ResolveReport::default();
        for (src_path, key) in &keyed {
            for link in registry.lookup(*key) {
                let tgt_path = match link.target {
                    None => None,
                    Some(target) => Some(
                        keyed
                            .iter()
                            .find(|(path, k)| *k == target && path != src_path)
                            .map(|(path, _)| path.as_slice())
                            .ok_or(LinkResolutionError::TargetNotFound {
                                link: link.id,
                                target,
                            })?,
                    ),
                };
                debug!(link = %link.id, kind = %link.kind, "resolving link");
                match &link.kind {
                    LinkKind::Range => {
                        Self::apply_range(link, root, src_path, tgt_path)?;
                        report.ranges += 1;
                    }
                    LinkKind::Data => {
                        Self::apply_data(link, root, src_path, tgt_path)?;
                        report.data += 1;
                    }
                    LinkKind::Custom { name, .. } => {
                        let callback = self
                            .callbacks
                            .get(name)
                            .ok_or_else(|| LinkResolutionError::MissingCallback(name.clone()))?;
                        Self::apply_custom(callback.as_ref(), link, root, src_path, tgt_path)?;
                        report.custom += 1;
                    }
                }
            }
        }
        Ok(report)
    }

    fn missing(link: &Link, path: &[SubplotKey], handle: &str) -> LinkResolutionError {
        LinkResolutionError::MissingHandle {
            link: link.id,
            path: display_path(path),
            handle: handle.to_owned(),
        }
    }

    fn node<'a>(
        link: &Link,
        root: &'a Plot,
        path: &[SubplotKey],
    ) -> Result<&'a Plot, LinkResolutionError> {
        root.at(path).ok_or_else(|| Self::missing(link, path, "plot"))
    }

    fn node_mut<'a>(
        link: &Link,
        root: &'a mut Plot,
        path: &[SubplotKey],
    ) -> Result<&'a mut Plot, LinkResolutionError> {
        root.at_mut(path)
            .ok_or_else(|| Self::missing(link, path, "plot"))
    }

    fn target_path<'p>(
        link: &Link,
        tgt_path: Option<&'p [SubplotKey]>,
    ) -> Result<&'p [SubplotKey], LinkResolutionError> {
        tgt_path.ok_or(LinkResolutionError::TargetNotFound {
            link: link.id,
            target: link.target.unwrap_or(link.source),
        })
    }

    fn apply_range(
        link: &Link,
        root: &mut Plot,
        src_path: &[SubplotKey],
        tgt_path: Option<&[SubplotKey]>,
    ) -> Result<(), LinkResolutionError> {
        let tgt_path = Self::target_path(link, tgt_path)?;
        for axis in link.axes.iter() {
            let shared = Self::node(link, root, src_path)?
                .handles
                .range(axis)
                .cloned()
                .ok_or_else(|| Self::missing(link, src_path, axis.range_handle()))?;
            let replaced = Self::node(link, root, tgt_path)?
                .handles
                .range(axis)
                .cloned()
                .ok_or_else(|| Self::missing(link, tgt_path, axis.range_handle()))?;
            // Leaves joined to the target by earlier links follow it.
            for path in root.leaf_paths() {
                if let Some(leaf) = root.at_mut(&path) {
                    if leaf
                        .handles
                        .range(axis)
                        .is_some_and(|r| Rc::ptr_eq(r, &replaced))
                    {
                        leaf.handles.set_range(axis, Rc::clone(&shared));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_data(
        link: &Link,
        root: &mut Plot,
        src_path: &[SubplotKey],
        tgt_path: Option<&[SubplotKey]>,
    ) -> Result<(), LinkResolutionError> {
        let tgt_path = Self::target_path(link, tgt_path)?;
        let source = Self::node(link, root, src_path)?
            .handles
            .source()
            .cloned()
            .ok_or_else(|| Self::missing(link, src_path, "source"))?;
        let target = Self::node(link, root, tgt_path)?
            .handles
            .source()
            .cloned()
            .ok_or_else(|| Self::missing(link, tgt_path, "source"))?;
        if Rc::ptr_eq(&source, &target) {
            return Ok(());
        }
        let merged = merge_sources(&source.borrow(), &target.borrow())?;
        *source.borrow_mut() = merged;
        for path in root.leaf_paths() {
            if let Some(leaf) = root.at_mut(&path) {
                if leaf
                    .handles
                    .source()
                    .is_some_and(|s| Rc::ptr_eq(s, &target))
                {
                    leaf.handles.set_source(Rc::clone(&source));
                }
            }
        }
        Ok(())
    }

    fn apply_custom(
        callback: &dyn LinkCallback,
        link: &Link,
        root: &mut Plot,
        src_path: &[SubplotKey],
        tgt_path: Option<&[SubplotKey]>,
    ) -> Result<(), LinkResolutionError> {
        let Some(tgt_path) = tgt_path else {
            return callback.apply(link, Self::node_mut(link, root, src_path)?, None);
        };
        // Detach the target so source and target can be borrowed mutably together.
        let mut target = std::mem::take(Self::node_mut(link, root, tgt_path)?);
        let result = match root.at_mut(src_path) {
            Some(source) => callback.apply(link, source, Some(&mut target)),
            None => Err(Self::missing(link, src_path, "plot")),
        };
        *Self::node_mut(link, root, tgt_path)? = target;
        result
    }
}
