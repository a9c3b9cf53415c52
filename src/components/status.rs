//! Entity lifecycle status.
//!
//! ```text
//!   Free --allocate--> Active --destroy-------> PendingRemoval(Dead)   --reap--> Free
//!                             --force_destroy--> PendingRemoval(Killed) --reap--> Free
//!                             --leave bounds---> PendingRemoval(Dead)   --reap--> Free
//! ```
//!
//! Both removal kinds are reaped identically. They only select which host
//! callback fires when the entity leaves `Active`.

/// Why an entity left the `Active` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalKind {
    /// Soft removal, requested by a script or by the bounds check.
    Dead,
    /// Hard removal, forced from outside (e.g. clearing the stage).
    Killed,
}

/// Lifecycle state of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EntityStatus {
    /// Slot sits in the arena free list.
    #[default]
    Free,
    /// Linked into every view and simulated each frame.
    Active,
    /// Still linked, waiting for the reap phase.
    PendingRemoval(RemovalKind),
}

impl EntityStatus {
    pub fn is_active(self) -> bool {
        matches!(self, EntityStatus::Active)
    }

    pub fn is_pending_removal(self) -> bool {
        matches!(self, EntityStatus::PendingRemoval(_))
    }

    /// Numeric code exposed to scripts: 0 free, 1 active, 2 dead, 3 killed.
    pub fn code(self) -> i64 {
        match self {
            EntityStatus::Free => 0,
            EntityStatus::Active => 1,
            EntityStatus::PendingRemoval(RemovalKind::Dead) => 2,
            EntityStatus::PendingRemoval(RemovalKind::Killed) => 3,
        }
    }
}
