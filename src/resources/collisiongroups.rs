//! Per-group collision membership.
//!
//! One list per collision group, all sharing a single link table, so an
//! entity is structurally unable to sit in two groups at once. Relocation
//! is immediate: it only touches these lists, never the update sequence or
//! the render order, so it is safe while either of those is being walked.

use crate::resources::linklist::{IndexLists, Iter};

#[derive(Clone, Debug)]
pub struct CollisionGroupIndex {
    lists: IndexLists,
}

impl CollisionGroupIndex {
    pub fn new(capacity: usize, groups: u16) -> Self {
        Self {
            lists: IndexLists::new(capacity, usize::from(groups)),
        }
    }

    pub fn group_count(&self) -> u16 {
        self.lists.list_count() as u16
    }

    pub fn is_valid_group(&self, group: u16) -> bool {
        usize::from(group) < self.lists.list_count()
    }

    pub fn insert(&mut self, group: u16, slot: u32) {
        debug_assert!(self.is_valid_group(group));
        self.lists.push_back(group, slot);
    }

    /// Returns the group the slot was removed from.
    pub fn remove(&mut self, slot: u32) -> Option<u16> {
        self.lists.remove(slot)
    }

    /// Move `slot` to the tail of `group`. Relocating into the group the
    /// slot already occupies also sends it to that list's tail.
    pub fn relocate(&mut self, slot: u32, group: u16) {
        debug_assert!(self.is_valid_group(group));
        self.lists.move_to_back(slot, group);
    }

    pub fn group_of(&self, slot: u32) -> Option<u16> {
        self.lists.list_of(slot)
    }

    pub fn first(&self, group: u16) -> Option<u32> {
        self.lists.head(group)
    }

    pub fn next(&self, slot: u32) -> Option<u32> {
        self.lists.next(slot)
    }

    pub fn len(&self, group: u16) -> usize {
        self.lists.len(group)
    }

    pub fn iter(&self, group: u16) -> Iter<'_> {
        self.lists.iter(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocate_changes_membership_immediately() {
        let mut idx = CollisionGroupIndex::new(8, 4);
        idx.insert(0, 0);
        idx.insert(0, 1);
        idx.insert(2, 2);
        idx.relocate(0, 2);
        assert_eq!(idx.group_of(0), Some(2));
        assert_eq!(idx.iter(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(idx.iter(2).collect::<Vec<_>>(), vec![2, 0]);
        assert_eq!(idx.len(2), 2);
    }

    #[test]
    fn group_bounds() {
        let idx = CollisionGroupIndex::new(1, 3);
        assert!(idx.is_valid_group(2));
        assert!(!idx.is_valid_group(3));
        assert_eq!(idx.group_count(), 3);
    }
}
