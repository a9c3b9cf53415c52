//! Fixed-capacity slot storage with a free list.
//!
//! The arena owns every [`EntityRecord`]. Slots are recycled LIFO through an
//! internal free list; each slot carries a generation counter that is bumped
//! on free, so handles from a previous occupant fail validation. Creation
//! order is tracked separately by a monotonically increasing uid that is
//! never reused.
//!
//! The arena knows nothing about the ordered views. Linking a fresh slot
//! into them (and unlinking before [`EntityArena::free`]) is the pool's job.

use crate::components::entity::EntityRecord;
use crate::components::handle::{FIRST_UID, GENERATION_MASK, Handle, MAX_CAPACITY, UID_LIMIT, Uid};
use crate::components::status::EntityStatus;
use crate::error::{PoolError, PoolResult};

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    record: EntityRecord,
}

#[derive(Clone, Debug)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_uid: Uid,
}

impl EntityArena {
    /// Capacities past `MAX_CAPACITY` are cut down to it; larger slot
    /// indices do not fit in a handle.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);
        Self {
            slots: vec![Slot::default(); capacity],
            // Reversed so the lowest slot is handed out first.
            free: (0..capacity as u32).rev().collect(),
            next_uid: FIRST_UID,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn live_count(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// Uid the next allocation (or reset) will receive.
    pub fn peek_uid(&self) -> Uid {
        self.next_uid
    }

    pub(crate) fn take_uid(&mut self) -> PoolResult<Uid> {
        if self.next_uid >= UID_LIMIT {
            return Err(PoolError::UidExhausted);
        }
        let uid = self.next_uid;
        self.next_uid += 1;
        Ok(uid)
    }

    /// Pop the free-list head, reset the slot and mark it Active.
    pub(crate) fn allocate(&mut self) -> PoolResult<Handle> {
        let Some(&index) = self.free.last() else {
            return Err(PoolError::PoolExhausted {
                capacity: self.capacity(),
            });
        };
        let uid = self.take_uid()?;
        self.free.pop();
        let slot = &mut self.slots[index as usize];
        debug_assert_eq!(slot.record.status, EntityStatus::Free);
        slot.record = EntityRecord {
            uid,
            status: EntityStatus::Active,
            ..EntityRecord::default()
        };
        Ok(Handle::new(index, slot.generation))
    }

    /// Return a slot to the free list and invalidate its handles.
    pub(crate) fn free(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        debug_assert_ne!(slot.record.status, EntityStatus::Free, "double free of slot {index}");
        slot.generation = slot.generation.wrapping_add(1) & GENERATION_MASK;
        slot.record = EntityRecord::default();
        self.free.push(index);
    }

    /// Validate a handle: the slot exists, is occupied, and the generation
    /// still matches.
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.record.status != EntityStatus::Free)
    }

    pub fn get(&self, handle: Handle) -> Option<&EntityRecord> {
        if self.contains(handle) {
            Some(&self.slots[handle.index as usize].record)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut EntityRecord> {
        if self.contains(handle) {
            Some(&mut self.slots[handle.index as usize].record)
        } else {
            None
        }
    }

    /// Current handle for an occupied slot.
    pub fn handle_of(&self, index: u32) -> Option<Handle> {
        let slot = self.slots.get(index as usize)?;
        if slot.record.status == EntityStatus::Free {
            return None;
        }
        Some(Handle::new(index, slot.generation))
    }

    pub(crate) fn record(&self, index: u32) -> &EntityRecord {
        &self.slots[index as usize].record
    }

    pub(crate) fn record_mut(&mut self, index: u32) -> &mut EntityRecord {
        &mut self.slots[index as usize].record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_slot_first_and_assigns_increasing_uids() {
        let mut arena = EntityArena::new(4);
        let a = arena.allocate().unwrap();
        let b = arena.allocate().unwrap();
        assert_eq!(a.slot(), 0);
        assert_eq!(b.slot(), 1);
        assert!(arena.get(a).unwrap().uid() < arena.get(b).unwrap().uid());
        assert_eq!(arena.free_count(), 2);
    }

    #[test]
    fn exhaustion_is_an_explicit_error() {
        let mut arena = EntityArena::new(1);
        arena.allocate().unwrap();
        assert_eq!(
            arena.allocate(),
            Err(PoolError::PoolExhausted { capacity: 1 })
        );
    }

    #[test]
    fn free_invalidates_old_handles_on_reuse() {
        let mut arena = EntityArena::new(1);
        let old = arena.allocate().unwrap();
        let old_uid = arena.get(old).unwrap().uid();
        arena.free(old.slot());
        assert!(!arena.contains(old));

        let new = arena.allocate().unwrap();
        assert_eq!(new.slot(), old.slot());
        assert_ne!(new, old);
        assert!(arena.get(old).is_none());
        assert!(arena.get(new).unwrap().uid() > old_uid);
    }

    #[test]
    fn unknown_slots_do_not_resolve() {
        let arena = EntityArena::new(2);
        assert!(!arena.contains(Handle::new(0, 0)));
        assert!(!arena.contains(Handle::new(99, 0)));
        assert_eq!(arena.handle_of(1), None);
    }
}
