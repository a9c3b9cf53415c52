//! Update order over every linked entity.
//!
//! Entities are appended at allocation, so the default traversal order is
//! allocation order. [`UpdateSequence::requeue`] moves a slot to the tail,
//! which is how `reset` gives an entity a new place in the order without
//! touching its slot.

use crate::resources::linklist::{IndexLists, Iter};

const LIST: u16 = 0;

#[derive(Clone, Debug)]
pub struct UpdateSequence {
    lists: IndexLists,
}

impl UpdateSequence {
    pub fn new(capacity: usize) -> Self {
        Self {
            lists: IndexLists::new(capacity, 1),
        }
    }

    pub fn insert_at_tail(&mut self, slot: u32) {
        self.lists.push_back(LIST, slot);
    }

    /// Returns false if the slot was not linked.
    pub fn remove(&mut self, slot: u32) -> bool {
        self.lists.remove(slot).is_some()
    }

    pub fn requeue(&mut self, slot: u32) {
        self.lists.move_to_back(slot, LIST);
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.lists.contains(slot)
    }

    pub fn first(&self) -> Option<u32> {
        self.lists.head(LIST)
    }

    pub fn last(&self) -> Option<u32> {
        self.lists.tail(LIST)
    }

    pub fn next(&self, slot: u32) -> Option<u32> {
        self.lists.next(slot)
    }

    pub fn len(&self) -> usize {
        self.lists.len(LIST)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Iter<'_> {
        self.lists.iter(LIST)
    }
}
