//! Layer-ordered render traversal.
//!
//! Entities are kept sorted by `(layer, uid)`: lower layers are drawn first
//! (painter's algorithm) and equal layers fall back to creation order, which
//! makes the draw order deterministic for replays.
//!
//! Traversal is cursor based ([`RenderOrder::first`] then
//! [`RenderOrder::next_after`]) rather than a borrowing iterator, so the
//! structure can be edited while a traversal is in flight. A re-keyed
//! entity is seen at its new position by any traversal that has not passed
//! that position yet; whether the current frame's render picks it up is not
//! guaranteed.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::components::handle::Uid;

#[derive(Clone, Copy, Debug)]
pub struct RenderKey {
    pub layer: f64,
    pub uid: Uid,
}

impl PartialEq for RenderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RenderKey {}

impl PartialOrd for RenderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.layer
            .total_cmp(&other.layer)
            .then(self.uid.cmp(&other.uid))
    }
}

#[derive(Clone, Debug)]
pub struct RenderOrder {
    sorted: BTreeMap<RenderKey, u32>,
    keys: Vec<Option<RenderKey>>,
}

impl RenderOrder {
    pub fn new(capacity: usize) -> Self {
        Self {
            sorted: BTreeMap::new(),
            keys: vec![None; capacity],
        }
    }

    pub fn insert(&mut self, slot: u32, layer: f64, uid: Uid) {
        debug_assert!(
            self.keys[slot as usize].is_none(),
            "slot {slot} is already in the render order"
        );
        let key = RenderKey { layer, uid };
        self.sorted.insert(key, slot);
        self.keys[slot as usize] = Some(key);
    }

    pub fn remove(&mut self, slot: u32) -> bool {
        match self.keys[slot as usize].take() {
            Some(key) => {
                self.sorted.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Remove and reinsert under a new key.
    pub fn rekey(&mut self, slot: u32, layer: f64, uid: Uid) {
        self.remove(slot);
        self.insert(slot, layer, uid);
    }

    pub fn key_of(&self, slot: u32) -> Option<RenderKey> {
        self.keys[slot as usize]
    }

    pub fn first(&self) -> Option<(RenderKey, u32)> {
        self.sorted.iter().next().map(|(k, s)| (*k, *s))
    }

    /// The entry that sorts immediately after `key`, whether or not `key`
    /// itself is still present.
    pub fn next_after(&self, key: RenderKey) -> Option<(RenderKey, u32)> {
        self.sorted
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, s)| (*k, *s))
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.sorted.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_layer_then_uid() {
        let mut r = RenderOrder::new(8);
        r.insert(0, 5.0, 1);
        r.insert(1, 1.0, 2);
        r.insert(2, 5.0, 3);
        r.insert(3, -2.5, 4);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![3, 1, 0, 2]);
    }

    #[test]
    fn rekey_moves_entry() {
        let mut r = RenderOrder::new(4);
        r.insert(0, 5.0, 1);
        r.insert(1, 5.0, 2);
        r.rekey(1, 1.0, 2);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(r.key_of(1).map(|k| k.layer), Some(1.0));
    }

    #[test]
    fn cursor_survives_removal_of_current_entry() {
        let mut r = RenderOrder::new(4);
        r.insert(0, 0.0, 1);
        r.insert(1, 1.0, 2);
        r.insert(2, 2.0, 3);
        let (k0, s0) = r.first().unwrap();
        assert_eq!(s0, 0);
        r.remove(0);
        let (_, s1) = r.next_after(k0).unwrap();
        assert_eq!(s1, 1);
    }

    #[test]
    fn remove_absent_is_false() {
        let mut r = RenderOrder::new(2);
        assert!(!r.remove(1));
        assert!(r.is_empty());
    }
}
