//! Render traversal.
//!
//! Visits the render order from the lowest layer up, skipping hidden
//! entities and those outside the active worlds, and asks the host to draw
//! each one. Layer writes made while the traversal runs are queued on the
//! entity and applied once it ends, so the order seen by this traversal
//! never shifts under the cursor. Entities created mid-traversal are drawn
//! if their key sorts after the cursor.

use crate::bridge::host::ScriptHost;
use crate::resources::pool::EntityPool;

/// Walks the render order and calls [`ScriptHost::on_render`] for each
/// visible entity.
///
/// Entities are visited by ascending layer, ties broken by uid. An entity
/// is skipped when its `hide` flag is set or its world mask misses the
/// pool's active worlds.
///
/// While the walk runs the pool is in render mode: `set_layer` and `reset`
/// only queue the new key, and the pool applies the queue when the walk
/// ends. The cursor steps by key, so an entity is never drawn twice
/// in one traversal.
///
/// Returns the number of draw callbacks made.
pub fn render(pool: &mut EntityPool, host: &mut dyn ScriptHost) -> usize {
    let worlds = pool.active_worlds();
    pool.begin_render();

    let mut drawn = 0;
    let mut cursor = pool.render_index().first();
    while let Some((key, slot)) = cursor {
        let record = pool.record_at(slot);
        if !record.hide && record.world_mask.overlaps(worlds) {
            let handle = pool.handle_at(slot);
            pool.set_current(Some(handle));
            host.on_render(pool, handle);
            pool.set_current(None);
            drawn += 1;
        }
        cursor = pool.render_index().next_after(key);
    }

    pool.end_render();
    drawn
}
