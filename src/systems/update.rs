//! Update phase.
//!
//! Walks the update sequence, runs the host's per-entity callback and then
//! the built-in advance (motion and the `timer` counter). While super-pause
//! is engaged only entities flagged `ignore_super_pause` take part; the rest
//! are frozen completely.
//!
//! Status is not consulted: an entity marked Dead or Killed earlier in the
//! frame keeps moving until Reap unlinks it, so Collision sees it where it
//! actually is. Integrate follows the same rule.

use crate::bridge::host::ScriptHost;
use crate::components::handle::{Handle, Uid};
use crate::resources::pool::EntityPool;

/// Runs the update callback and built-in advance for every entity that was
/// in the update sequence when the phase started.
///
/// The sequence is captured up front together with each entity's uid, so
/// the walk is immune to anything a callback does to the lists:
///
/// - Entities allocated from inside a callback are not part of the capture
///   and are first updated on the next frame.
/// - An entity `reset` by another callback before its turn is skipped at its
///   old position and visited once after the captured walk, in its new tail
///   order. An entity reset after its turn is not visited again.
/// - Slots are only freed in Reap, so a captured handle never points at a
///   different entity during this phase.
///
/// # Parameters
///
/// - `paused`: the super-pause sample taken for this frame
/// - `order`: scratch buffer reused across frames
///
/// # Returns
///
/// The number of entities updated.
pub fn update(
    pool: &mut EntityPool,
    host: &mut dyn ScriptHost,
    paused: bool,
    order: &mut Vec<(Handle, Uid)>,
) -> usize {
    pool.snapshot_update_uids(order);

    let mut requeued = Vec::new();
    let mut updated = 0;
    for &(handle, uid) in order.iter() {
        let Some(record) = pool.get(handle) else {
            continue;
        };
        if record.uid() != uid {
            requeued.push(handle);
            continue;
        }
        if visit(pool, host, handle, paused) {
            updated += 1;
        }
    }

    // Reset hands out increasing uids and appends to the tail, so uid order
    // is tail order.
    requeued.sort_by_key(|&h| pool.get(h).map(|r| r.uid()));
    for handle in requeued {
        if visit(pool, host, handle, paused) {
            updated += 1;
        }
    }
    updated
}

fn visit(pool: &mut EntityPool, host: &mut dyn ScriptHost, handle: Handle, paused: bool) -> bool {
    let Some(record) = pool.get(handle) else {
        return false;
    };
    if paused && !record.ignore_super_pause {
        return false;
    }

    pool.set_current(Some(handle));
    host.on_update(pool, handle);
    pool.set_current(None);

    // The callback may have reset the entity; it keeps its slot either way.
    if let Some(record) = pool.get_mut(handle) {
        record.kinematics.advance();
        record.timer += 1;
    }
    true
}
