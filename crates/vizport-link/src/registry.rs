// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Context-owned link registry.

use std::collections::BTreeMap;

use tracing::debug;
use vizport_model::{ElementArena, ElementId, LinkKey};

use crate::link::{AxisSet, Link, LinkId, LinkKind, LinkSpec};
use crate::ConfigurationError;

/// Active link declarations, keyed by source [`LinkKey`].
///
/// Lookup is by identity only. Two elements with equal data but distinct
/// link keys never see each other's links. The registry does no locking; a
/// host rendering from several threads keeps one registry per thread.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    by_source: BTreeMap<LinkKey, Vec<Link>>,
    next_id: u32,
}

impl LinkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a link.
    ///
    /// Re-declaring an existing (source, target, kind) binding is a no-op
    /// that returns the id of the link already stored.
    pub fn declare(
        &mut self,
        arena: &ElementArena,
        spec: LinkSpec,
    ) -> Result<LinkId, ConfigurationError> {
        let source = arena
            .link_key(spec.source)
            .ok_or(ConfigurationError::UnknownElement(spec.source))?;
        let target = match spec.target {
            Some(id) => Some(
                arena
                    .link_key(id)
                    .ok_or(ConfigurationError::UnknownElement(id))?,
            ),
            None => None,
        };
        if spec.kind.requires_target() && target.is_none() {
            return Err(ConfigurationError::MissingTarget {
                kind: spec.kind.to_string(),
            });
        }
        let axes = Self::validate_axes(&spec)?;

        let links = self.by_source.entry(source).or_default();
        if let Some(existing) = links
            .iter()
            .find(|l| l.same_binding(source, target, &spec.kind))
        {
            debug!(link = %existing.id, "link already declared");
            return Ok(existing.id);
        }

        let id = LinkId(self.next_id);
        self.next_id += 1;
        debug!(link = %id, kind = %spec.kind, %source, "link declared");
        links.push(Link {
            id,
            source,
            target,
            kind: spec.kind,
            axes,
            transient: spec.transient,
        });
        Ok(id)
    }

    fn validate_axes(spec: &LinkSpec) -> Result<AxisSet, ConfigurationError> {
        let axes = AxisSet::from_axes(&spec.kind, &spec.axes)?;
        match spec.kind {
            LinkKind::Range if axes.is_empty() => Ok(AxisSet::X),
            LinkKind::Data if !axes.is_empty() => Err(ConfigurationError::InvalidAxes {
                kind: spec.kind.to_string(),
                axes: crate::axis_names(&spec.axes),
                reason: "data links do not take axes",
            }),
            _ => Ok(axes),
        }
    }

    /// Links whose source is `key`, in declaration order.
    pub fn lookup(&self, key: LinkKey) -> &[Link] {
        self.by_source.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Links whose source is the element `id`.
    pub fn lookup_element(&self, arena: &ElementArena, id: ElementId) -> &[Link] {
        match arena.link_key(id) {
            Some(key) => self.lookup(key),
            None => &[],
        }
    }

    /// Remove one link.
    pub fn remove(&mut self, id: LinkId) -> Option<Link> {
        let mut removed = None;
        for links in self.by_source.values_mut() {
            if let Some(pos) = links.iter().position(|l| l.id == id) {
                removed = Some(links.remove(pos));
                break;
            }
        }
        self.by_source.retain(|_, links| !links.is_empty());
        removed
    }

    /// Remove every link whose source is `key`; used on element teardown.
    pub fn remove_source(&mut self, key: LinkKey) -> Vec<Link> {
        self.by_source.remove(&key).unwrap_or_default()
    }

    /// Clone an element, applying link semantics.
    ///
    /// With `link` set the clone shares the original's key and therefore all
    /// of its links. Without it the clone starts with no links except the
    /// transient ones, which are re-declared onto the fresh key.
    pub fn clone_element(
        &mut self,
        arena: &mut ElementArena,
        id: ElementId,
        link: bool,
    ) -> Option<ElementId> {
        let original = arena.link_key(id)?;
        let clone = arena.clone_element(id, link)?;
        if link {
            return Some(clone);
        }
        let fresh = arena.link_key(clone)?;
        let carried: Vec<Link> = self
            .lookup(original)
            .iter()
            .filter(|l| l.transient)
            .cloned()
            .collect();
        for mut carried_link in carried {
            carried_link.id = LinkId(self.next_id);
            self.next_id += 1;
            carried_link.source = fresh;
            self.by_source.entry(fresh).or_default().push(carried_link);
        }
        Some(clone)
    }

    /// Total number of links.
    pub fn len(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }

    /// `true` if no link is registered.
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Every link, grouped by source key order.
    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.by_source.values().flatten()
    }
}
