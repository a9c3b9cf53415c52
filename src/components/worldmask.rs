//! World partition bit mask.
//!
//! Entities tagged with disjoint masks live in independent simulation
//! "worlds": they never collide with each other, and a pool can filter the
//! bounds and render passes down to a set of active worlds.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldMask(pub u32);

impl WorldMask {
    pub const ALL: WorldMask = WorldMask(u32::MAX);
    pub const NONE: WorldMask = WorldMask(0);

    /// True when the two masks share at least one world.
    pub fn overlaps(self, other: WorldMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for WorldMask {
    fn default() -> Self {
        WorldMask(1)
    }
}
