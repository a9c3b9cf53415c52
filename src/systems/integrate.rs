//! Integrate phase: commit this frame's movement.
//!
//! Stores the distance travelled in `delta` and copies the current position
//! into `previous_position`, which the next frame's bounds and collision
//! tests use for edge interpolation. Frozen entities are skipped under the
//! same super-pause rule as the update phase.

use crate::resources::pool::EntityPool;

/// Commits every eligible entity's position for the next frame.
///
/// This system runs once per frame after the collision passes and:
/// - Records `position - previous_position` in `delta`
/// - Copies `position` into `previous_position`
///
/// Entities frozen by super-pause keep both fields untouched, so a position
/// written by script during the pause only shows up as displacement once
/// the pause ends. No host code runs here and status is not consulted.
pub fn integrate(pool: &mut EntityPool, paused: bool) {
    pool.for_each_in_update(|record| {
        if paused && !record.ignore_super_pause {
            return;
        }
        record.kinematics.commit();
    });
}
