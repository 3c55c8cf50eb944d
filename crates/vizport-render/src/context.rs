// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rendering context: the state one host thread renders from.

use tracing::debug;
use vizport_link::{ConfigurationError, LinkId, LinkRegistry, LinkSpec};
use vizport_model::{Element, ElementArena, ElementId, FigureId, OptionLookup, OptionTable};

use crate::bbox::BBoxCache;

/// Owns elements, links, the bbox cache and the figure id allocator.
///
/// Contexts are independent: nothing is shared between two of them, so a host
/// that renders on several threads keeps one context per thread.
pub struct RenderContext {
    /// Element storage.
    pub elements: ElementArena,
    /// Declared links.
    pub links: LinkRegistry,
    /// Tight crops of live figures.
    pub bbox_cache: BBoxCache,
    options: Box<dyn OptionLookup>,
    next_figure: u64,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Context with an empty option table.
    pub fn new() -> Self {
        Self::with_options(Box::new(OptionTable::new()))
    }

    /// Context resolving style options through `options`.
    pub fn with_options(options: Box<dyn OptionLookup>) -> Self {
        Self {
            elements: ElementArena::new(),
            links: LinkRegistry::new(),
            bbox_cache: BBoxCache::new(),
            options,
            next_figure: 0,
        }
    }

    /// Option lookup port.
    pub fn options(&self) -> &dyn OptionLookup {
        self.options.as_ref()
    }

    /// Add an element.
    pub fn add(&mut self, element: Element) -> ElementId {
        self.elements.insert(element)
    }

    /// Declare a link between two elements of this context.
    pub fn link(&mut self, spec: LinkSpec) -> Result<LinkId, ConfigurationError> {
        self.links.declare(&self.elements, spec)
    }

    /// Clone an element; see [`LinkRegistry::clone_element`].
    pub fn clone_element(&mut self, id: ElementId, link: bool) -> Option<ElementId> {
        self.links.clone_element(&mut self.elements, id, link)
    }

    /// Remove an element. Its links go once no live element holds its key.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let key = self.elements.link_key(id)?;
        let element = self.elements.remove(id)?;
        if self.elements.holders(key) == 0 {
            let dropped = self.links.remove_source(key);
            debug!(element = %id, links = dropped.len(), "element removed");
        }
        Some(element)
    }

    /// Allocate a never-reused figure id.
    pub fn allocate_figure(&mut self) -> FigureId {
        let id = FigureId(self.next_figure);
        self.next_figure += 1;
        id
    }

    /// Tear down a figure, evicting its cached crop.
    pub fn close_figure(&mut self, figure: FigureId) {
        if self.bbox_cache.evict(figure).is_some() {
            debug!(%figure, "evicted cached bbox");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn links_outlive_a_removed_element_while_a_linked_clone_holds_the_key() {
        let mut ctx = RenderContext::new();
        let a = ctx.add(Element::curve(vec![0.0, 1.0], vec![0.0, 1.0]));
        let b = ctx.add(Element::curve(vec![0.0, 1.0], vec![1.0, 0.0]));
        ctx.link(LinkSpec::range(a, b)).unwrap();
        let a2 = ctx.clone_element(a, true).unwrap();

        ctx.remove(a).unwrap();
        assert_eq!(ctx.links.len(), 1);
        ctx.remove(a2).unwrap();
        assert!(ctx.links.is_empty());
    }

    #[test]
    fn figure_ids_are_never_reused() {
        let mut ctx = RenderContext::new();
        let first = ctx.allocate_figure();
        ctx.close_figure(first);
        assert_ne!(ctx.allocate_figure(), first);
    }
}
