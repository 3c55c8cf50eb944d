// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Context-owned element storage.

use crate::element::Element;
use crate::ids::{ElementId, LinkKey};

#[derive(Debug)]
struct Slot {
    element: Element,
    link_key: LinkKey,
}

/// Owns every element of a rendering context.
///
/// Ids are dense indices that are never reused: removing an element leaves a
/// tombstone, so a stale `ElementId` can never alias a newer element.
#[derive(Debug, Default)]
pub struct ElementArena {
    slots: Vec<Option<Slot>>,
    next_link_key: u32,
}

impl ElementArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_link_key(&mut self) -> LinkKey {
        let key = LinkKey(self.next_link_key);
        self.next_link_key += 1;
        key
    }

    fn push(&mut self, element: Element, link_key: LinkKey) -> ElementId {
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(Slot { element, link_key }));
        ElementId(index)
    }

    /// Insert an element under a fresh link key.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let key = self.fresh_link_key();
        self.push(element, key)
    }

    /// Clone an element into a new slot.
    ///
    /// With `link` set the clone shares the original's [`LinkKey`] and so takes
    /// part in every link declared on the original. Without it the clone gets
    /// a fresh key. Returns `None` if `id` is not live.
    pub fn clone_element(&mut self, id: ElementId, link: bool) -> Option<ElementId> {
        let slot = self.slot(id)?;
        let (element, shared_key) = (slot.element.clone(), slot.link_key);
        let key = if link {
            shared_key
        } else {
            self.fresh_link_key()
        };
        Some(self.push(element, key))
    }

    /// Remove an element. Returns it if it was live.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .map(|slot| slot.element)
    }

    fn slot(&self, id: ElementId) -> Option<&Slot> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Borrow a live element.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slot(id).map(|s| &s.element)
    }

    /// Mutably borrow a live element.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .map(|s| &mut s.element)
    }

    /// Link key of a live element.
    pub fn link_key(&self, id: ElementId) -> Option<LinkKey> {
        self.slot(id).map(|s| s.link_key)
    }

    /// Number of live elements holding `key`.
    pub fn holders(&self, key: LinkKey) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.link_key == key)
            .count()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `true` if no element is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
