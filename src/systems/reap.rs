//! Reap phase: the only place slots go back to the arena.
//!
//! Walks the update sequence once. Entities still Active count another
//! frame alive; everything pending removal is unlinked from all three
//! views, its slot is freed and the host is told to drop its binding and
//! any attached resource.

use log::trace;

use crate::bridge::host::ScriptHost;
use crate::resources::pool::EntityPool;

/// Frees every entity pending removal and ages the survivors.
///
/// This system runs last in the frame and:
/// - Adds one to `frames_alive` of each Active entity, super-pause or not
/// - Unlinks every Dead or Killed entity from all three views and returns
///   its slot to the arena, bumping the generation so old handles go stale
/// - Calls [`ScriptHost::on_reap`] with the binding and attachment the
///   record carried, after the slot is free
///
/// The cursor prefetches its successor before the current slot is freed.
/// `on_reap` receives no pool, so nothing can relink the sequence mid-walk.
///
/// Returns the number of entities reaped.
pub fn reap(pool: &mut EntityPool, host: &mut dyn ScriptHost) -> usize {
    let mut reaped = 0;
    let mut cursor = pool.update_sequence().first();
    while let Some(slot) = cursor {
        cursor = pool.update_sequence().next(slot);

        let record = pool.record_at_mut(slot);
        if record.status.is_active() {
            record.frames_alive += 1;
            continue;
        }
        let binding = record.binding;
        let attachment = record.attachment;
        let handle = pool.handle_at(slot);

        pool.free(slot);
        host.on_reap(handle, binding, attachment);
        reaped += 1;
    }
    if reaped > 0 {
        trace!("Reaped {} entities", reaped);
    }
    reaped
}
