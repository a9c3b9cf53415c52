//! Bounds-check phase.
//!
//! Every Active entity in an active world with its `bound` flag set is
//! tested against the injected bounds predicate. An entity outside is
//! marked Dead on the spot and the host's leave-bounds callback fires
//! synchronously; unlinking waits for the reap phase. Super-pause does not
//! apply here.

use log::trace;

use crate::bridge::host::ScriptHost;
use crate::components::handle::Handle;
use crate::components::status::RemovalKind;
use crate::resources::pool::EntityPool;

/// Marks entities outside the playfield Dead and fires their leave callback.
///
/// This system runs once per frame after Update and:
/// - Skips entities that are already pending removal, have `bound` cleared
///   or live only in inactive worlds
/// - Asks the pool's [`Bounds`](crate::resources::bounds::Bounds) predicate
///   about the rest
/// - Flips each entity found outside to Dead and calls
///   [`ScriptHost::on_leave_bounds`] with it as the current entity
///
/// The walk uses a snapshot of the update sequence, so callbacks may create,
/// regroup or reset entities freely. Super-pause does not stop it.
///
/// Returns the number of entities that left the playfield.
pub fn bounds_check(
    pool: &mut EntityPool,
    host: &mut dyn ScriptHost,
    order: &mut Vec<Handle>,
) -> usize {
    let worlds = pool.active_worlds();
    pool.snapshot_update(order);

    let mut left = 0;
    for &handle in order.iter() {
        let Some(record) = pool.get(handle) else {
            continue;
        };
        if !record.status().is_active() || !record.bound || !record.world_mask.overlaps(worlds) {
            continue;
        }
        if pool.in_bounds(record) {
            continue;
        }

        trace!(
            "{} left bounds at {:?}",
            handle, record.kinematics.position
        );
        if let Ok(true) = pool.mark_removed(handle, RemovalKind::Dead) {
            pool.set_current(Some(handle));
            host.on_leave_bounds(pool, handle);
            pool.set_current(None);
            left += 1;
        }
    }
    left
}
