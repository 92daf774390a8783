//! Ordered element storage
//!
//! Elements live in one ordered arena; list order is draw order (first drawn
//! at the bottom). Everything outside the manager refers to elements by
//! `ElementId`, which stays valid across reordering and is never reused, so
//! a removed element can never be reached through a stale handle.

use serde::{Deserialize, Serialize};

use crate::domain::Point;
use crate::elements::Element;
use crate::error::{EngineError, Result};

/// Stable handle to an element in an `ElementManager`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of several overlapping elements a point query returns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitOrder {
    /// First match in draw order (the bottom-most element)
    #[default]
    DrawOrder,
    /// Last match in draw order (the element drawn on top)
    Topmost,
}

#[derive(Debug, Default)]
pub struct ElementManager {
    entries: Vec<(ElementId, Element)>,
    next_id: u64,
}

impl ElementManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh id without inserting anything
    pub fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append on top of the draw order
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = self.allocate_id();
        self.entries.push((id, element));
        id
    }

    /// Insert under an existing id at `index` (clamped to the end)
    ///
    /// Used to put back an element that was removed earlier. Fails when the
    /// id is already present.
    pub fn insert(&mut self, id: ElementId, element: Element, index: usize) -> Result<()> {
        if self.contains(id) {
            return Err(EngineError::InvalidArgument(format!(
                "element {id} is already present"
            )));
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, (id, element));
        Ok(())
    }

    /// Remove an element, returning it with the index it occupied
    pub fn remove(&mut self, id: ElementId) -> Result<(Element, usize)> {
        let index = self.index_of(id).ok_or_else(|| absent(id))?;
        let (_, element) = self.entries.remove(index);
        Ok((element, index))
    }

    /// Move to the top of the draw order
    pub fn bring_to_front(&mut self, id: ElementId) -> Result<()> {
        let index = self.index_of(id).ok_or_else(|| absent(id))?;
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        Ok(())
    }

    /// Move to the bottom of the draw order, above any background
    pub fn send_to_back(&mut self, id: ElementId) -> Result<()> {
        let index = self.index_of(id).ok_or_else(|| absent(id))?;
        let entry = self.entries.remove(index);
        let floor = self
            .entries
            .iter()
            .take_while(|(_, e)| matches!(e, Element::Background(_)))
            .count();
        self.entries.insert(floor, entry);
        Ok(())
    }

    /// The selectable element under `p`
    pub fn element_at(&self, p: Point, order: HitOrder) -> Option<ElementId> {
        let hit = |(_, e): &&(ElementId, Element)| e.can_be_selected() && e.hit_test(p);
        let found = match order {
            HitOrder::DrawOrder => self.entries.iter().find(hit),
            HitOrder::Topmost => self.entries.iter().rev().find(hit),
        };
        found.map(|(id, _)| *id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| *entry_id == id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, e)| e)
    }

    /// Elements in draw order
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ElementId, &mut Element)> {
        self.entries.iter_mut().map(|(id, e)| (*id, e))
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn absent(id: ElementId) -> EngineError {
    EngineError::InvalidArgument(format!("element {id} is not in the scene"))
}
