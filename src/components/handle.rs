//! Generational entity handles.
//!
//! A [`Handle`] is the only way code outside the pool refers to an entity.
//! It pairs the arena slot index with the generation the slot had when the
//! entity was allocated. Freeing a slot bumps its generation, so every handle
//! issued before the free stops resolving.
//!
//! # Bit encoding
//!
//! Scripts see handles as plain integers. [`Handle::to_bits`] packs the index
//! into the low 24 bits and the generation into the next 29 bits, keeping the
//! whole value below 2^53 so it survives a round trip through a LuaJIT double.
//! Generations therefore wrap at [`GENERATION_MASK`].

use std::fmt;

/// Number of bits reserved for the slot index in the encoded form.
pub const INDEX_BITS: u32 = 24;
/// Largest slot count a pool may be configured with.
pub const MAX_CAPACITY: usize = 1 << INDEX_BITS;
/// Generations are kept within 29 bits.
pub const GENERATION_MASK: u32 = (1 << 29) - 1;

const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Reference to a pooled entity, validated on every dereference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Handle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation: generation & GENERATION_MASK,
        }
    }

    /// Arena slot this handle points at.
    pub fn slot(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Packs the handle into an integer that fits in 53 bits.
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << INDEX_BITS) | u64::from(self.index)
    }

    /// Inverse of [`to_bits`](Self::to_bits). Returns `None` if the value
    /// carries bits outside the encoded width.
    pub fn from_bits(bits: u64) -> Option<Self> {
        if bits >> (INDEX_BITS + 29) != 0 {
            return None;
        }
        Some(Self {
            index: (bits & INDEX_MASK) as u32,
            generation: (bits >> INDEX_BITS) as u32,
        })
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Creation-order identity. Never reused, strictly increasing.
///
/// `0` and `u64::MAX` are reserved and never handed out.
pub type Uid = u64;

/// First uid handed out by a fresh pool.
pub const FIRST_UID: Uid = 1;
/// Upper bound (exclusive) on assignable uids.
pub const UID_LIMIT: Uid = u64::MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip_at_width_limits() {
        let h = Handle::new((MAX_CAPACITY - 1) as u32, GENERATION_MASK);
        let bits = h.to_bits();
        assert!(bits < (1u64 << 53));
        assert_eq!(Handle::from_bits(bits), Some(h));
    }

    #[test]
    fn from_bits_rejects_out_of_range() {
        assert_eq!(Handle::from_bits(1u64 << 53), None);
    }

    #[test]
    fn generation_is_masked_on_construction() {
        let h = Handle::new(3, GENERATION_MASK + 1);
        assert_eq!(h.generation(), 0);
        assert_eq!(h.slot(), 3);
    }
}
