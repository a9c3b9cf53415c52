//! Host-facing contract of the pool.
//!
//! [`ScriptBridge`] is the single entry point a scripting environment uses
//! to drive entities: creation, destruction, handle validation, property
//! access, iteration and on-demand collision queries. It pairs the pool with
//! the [`ScriptHost`] that receives the callbacks those operations trigger.
//!
//! Every operation taking a [`Handle`] validates it against the arena
//! generation first and reports a stale handle as
//! [`PoolError::InvalidHandle`], except [`ScriptBridge::is_valid`] which
//! exists to ask exactly that question.
//!
//! # Example
//!
//! ```
//! use danmakupool::bridge::{ScriptBridge, UPDATE_SEQUENCE};
//! use danmakupool::bridge::host::NullHost;
//! use danmakupool::components::class::ClassDescriptor;
//! use danmakupool::resources::pool::EntityPool;
//! use danmakupool::resources::poolconfig::PoolConfig;
//!
//! let mut pool = EntityPool::new(PoolConfig::new().with_capacity(16));
//! let mut host = NullHost;
//! let mut bridge = ScriptBridge::new(&mut pool, &mut host);
//!
//! let h = bridge.create(&ClassDescriptor::new().with_layer(5.0)).unwrap();
//! bridge.set_property(h, "layer", 1.0.into()).unwrap();
//! assert_eq!(bridge.first(UPDATE_SEQUENCE).unwrap(), Some(h));
//! ```

pub mod host;
pub(crate) mod properties;

use glam::DVec2;
use log::debug;

use crate::components::class::ClassDescriptor;
use crate::components::handle::{Handle, Uid};
use crate::components::property::{PropertyKey, PropertyValue};
use crate::components::status::RemovalKind;
use crate::error::{PoolError, PoolResult};
use crate::resources::pool::{EntityPool, Traversal};
use crate::systems::collision;

pub use host::ScriptHost;

/// Group id selecting the full update sequence in [`ScriptBridge::first`]
/// and [`ScriptBridge::next`].
pub const UPDATE_SEQUENCE: i64 = -1;

pub struct ScriptBridge<'a> {
    pool: &'a mut EntityPool,
    host: &'a mut dyn ScriptHost,
}

impl<'a> ScriptBridge<'a> {
    pub fn new(pool: &'a mut EntityPool, host: &'a mut dyn ScriptHost) -> Self {
        Self { pool, host }
    }

    pub fn pool(&self) -> &EntityPool {
        self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EntityPool {
        self.pool
    }

    /// Allocate an entity from `class`. Fails with
    /// [`PoolError::PoolExhausted`] when no slot is free.
    pub fn create(&mut self, class: &ClassDescriptor) -> PoolResult<Handle> {
        self.pool.allocate(class)
    }

    /// Soft removal. Returns `Ok(false)` when the entity already left
    /// `Active`.
    pub fn destroy(&mut self, handle: Handle) -> PoolResult<bool> {
        self.remove(handle, RemovalKind::Dead)
    }

    /// Hard removal, firing the kill callback instead of the delete one.
    pub fn force_destroy(&mut self, handle: Handle) -> PoolResult<bool> {
        self.remove(handle, RemovalKind::Killed)
    }

    fn remove(&mut self, handle: Handle, kind: RemovalKind) -> PoolResult<bool> {
        if !self.pool.mark_removed(handle, kind)? {
            return Ok(false);
        }
        let previous = self.pool.current();
        self.pool.set_current(Some(handle));
        self.host.on_removed(self.pool, handle, kind);
        self.pool.set_current(previous);
        Ok(true)
    }

    /// Force-destroy every Active entity. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let targets = self.pool.active_handles();
        let mut removed = 0;
        for handle in targets {
            // Earlier kill callbacks may already have removed this one.
            if let Ok(true) = self.force_destroy(handle) {
                removed += 1;
            }
        }
        debug!("clear_all removed {} entities", removed);
        removed
    }

    pub fn is_valid(&self, handle: Handle) -> bool {
        self.pool.is_valid(handle)
    }

    pub fn get(&self, handle: Handle, key: PropertyKey) -> PoolResult<PropertyValue> {
        Ok(properties::read(self.pool.record(handle)?, key))
    }

    /// Write a property. A stale handle is reported before any check on
    /// the key or value.
    pub fn set(&mut self, handle: Handle, key: PropertyKey, value: PropertyValue) -> PoolResult<()> {
        self.pool.record(handle)?;
        properties::write(self.pool, handle, key, value)
    }

    /// Read a property by name.
    pub fn get_property(&self, handle: Handle, key: &str) -> PoolResult<PropertyValue> {
        let record = self.pool.record(handle)?;
        Ok(properties::read(record, parse_key(key)?))
    }

    /// Write a property by name. `group` relinks immediately; `layer`
    /// re-keys immediately unless a render traversal is running, in which
    /// case it lands when that traversal ends.
    pub fn set_property(&mut self, handle: Handle, key: &str, value: PropertyValue) -> PoolResult<()> {
        self.set(handle, parse_key(key)?, value)
    }

    /// First entity of a collision group, or of the update sequence for
    /// [`UPDATE_SEQUENCE`].
    pub fn first(&self, group_id: i64) -> PoolResult<Option<Handle>> {
        self.pool.first(self.traversal(group_id)?)
    }

    pub fn next(&self, group_id: i64, handle: Handle) -> PoolResult<Option<Handle>> {
        self.pool.next(self.traversal(group_id)?, handle)
    }

    fn traversal(&self, group_id: i64) -> PoolResult<Traversal> {
        if group_id == UPDATE_SEQUENCE {
            return Ok(Traversal::Update);
        }
        match u16::try_from(group_id) {
            Ok(g) if g < self.pool.group_count() => Ok(Traversal::Group(g)),
            _ => Err(PoolError::InvalidGroup {
                group: group_id,
                groups: self.pool.group_count(),
            }),
        }
    }

    pub fn check_collision(&self, a: Handle, b: Handle, ignore_world_mask: bool) -> PoolResult<bool> {
        self.pool.check_collision(a, b, ignore_world_mask)
    }

    /// Run the collision phase for one group pair. Returns the number of
    /// callbacks fired.
    pub fn run_collision_pass(&mut self, group_a: i64, group_b: i64) -> PoolResult<usize> {
        let a = self.group(group_a)?;
        let b = self.group(group_b)?;
        Ok(collision::run_pass(self.pool, &mut *self.host, a, b))
    }

    fn group(&self, group: i64) -> PoolResult<u16> {
        match self.traversal(group)? {
            Traversal::Group(g) => Ok(g),
            Traversal::Update => Err(PoolError::InvalidGroup {
                group,
                groups: self.pool.group_count(),
            }),
        }
    }

    /// Move the entity to the end of the update sequence with a fresh uid.
    pub fn reset(&mut self, handle: Handle) -> PoolResult<Uid> {
        self.pool.reset(handle)
    }

    /// Teleport the entity. The move does not show up as displacement in
    /// the next Integrate.
    pub fn warp(&mut self, handle: Handle, x: f64, y: f64) -> PoolResult<()> {
        self.pool.record_mut(handle)?.kinematics.warp(DVec2::new(x, y));
        Ok(())
    }

    /// Rescale the velocity to `speed`, keeping the heading.
    pub fn set_speed(&mut self, handle: Handle, speed: f64) -> PoolResult<()> {
        self.pool.record_mut(handle)?.kinematics.set_speed(speed);
        Ok(())
    }

    /// Replace the velocity with `speed` along `angle` (radians).
    pub fn set_polar_velocity(&mut self, handle: Handle, speed: f64, angle: f64) -> PoolResult<()> {
        self.pool
            .record_mut(handle)?
            .kinematics
            .set_polar_velocity(speed, angle);
        Ok(())
    }

    pub fn current(&self) -> Option<Handle> {
        self.pool.current()
    }

    pub fn super_pause(&self) -> i32 {
        self.pool.super_pause()
    }

    pub fn set_super_pause(&mut self, frames: i32) {
        self.pool.set_super_pause(frames);
    }
}

fn parse_key(key: &str) -> PoolResult<PropertyKey> {
    key.parse::<PropertyKey>().map_err(PoolError::UnknownProperty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::host::NullHost;
    use crate::resources::poolconfig::PoolConfig;

    fn pool() -> EntityPool {
        EntityPool::new(PoolConfig::new().with_capacity(4).with_groups(2))
    }

    #[test]
    fn stale_handles_are_rejected_everywhere() {
        let mut pool = pool();
        let mut host = NullHost;
        let h = pool.allocate(&ClassDescriptor::new()).unwrap();
        pool.mark_removed(h, RemovalKind::Dead).unwrap();
        pool.free(h.slot());

        let mut bridge = ScriptBridge::new(&mut pool, &mut host);
        assert!(!bridge.is_valid(h));
        assert_eq!(bridge.destroy(h), Err(PoolError::InvalidHandle(h)));
        assert_eq!(bridge.get_property(h, "x"), Err(PoolError::InvalidHandle(h)));
        assert_eq!(
            bridge.set_property(h, "x", 1.0.into()),
            Err(PoolError::InvalidHandle(h))
        );
        assert_eq!(bridge.next(UPDATE_SEQUENCE, h), Err(PoolError::InvalidHandle(h)));
        assert_eq!(bridge.reset(h), Err(PoolError::InvalidHandle(h)));
        assert_eq!(
            bridge.set(h, PropertyKey::Uid, 1i64.into()),
            Err(PoolError::InvalidHandle(h))
        );
        assert_eq!(bridge.warp(h, 0.0, 0.0), Err(PoolError::InvalidHandle(h)));
    }

    #[test]
    fn motion_helpers_reshape_velocity_and_position() {
        let mut pool = pool();
        let mut host = NullHost;
        let mut bridge = ScriptBridge::new(&mut pool, &mut host);
        let h = bridge
            .create(&ClassDescriptor::new().with_velocity(3.0, 4.0))
            .unwrap();

        bridge.set_speed(h, 10.0).unwrap();
        assert_eq!(bridge.get(h, PropertyKey::Vx), Ok(PropertyValue::Number(6.0)));
        assert_eq!(bridge.get(h, PropertyKey::Vy), Ok(PropertyValue::Number(8.0)));

        bridge.set_polar_velocity(h, 2.0, 0.0).unwrap();
        assert_eq!(bridge.get(h, PropertyKey::Vx), Ok(PropertyValue::Number(2.0)));

        bridge.warp(h, 40.0, -5.0).unwrap();
        let k = bridge.pool().record(h).unwrap().kinematics;
        assert_eq!(k.position, DVec2::new(40.0, -5.0));
        assert_eq!(k.previous_position, k.position);
    }

    #[test]
    fn unknown_property_names_are_errors() {
        let mut pool = pool();
        let mut host = NullHost;
        let mut bridge = ScriptBridge::new(&mut pool, &mut host);
        let h = bridge.create(&ClassDescriptor::new()).unwrap();
        assert_eq!(
            bridge.get_property(h, "speed"),
            Err(PoolError::UnknownProperty("speed".into()))
        );
    }

    #[test]
    fn invalid_group_ids_are_rejected() {
        let mut pool = pool();
        let mut host = NullHost;
        let mut bridge = ScriptBridge::new(&mut pool, &mut host);
        assert!(bridge.first(-2).is_err());
        assert!(bridge.first(2).is_err());
        assert_eq!(bridge.first(1), Ok(None));
        assert!(bridge.run_collision_pass(0, UPDATE_SEQUENCE).is_err());
        assert!(bridge.run_collision_pass(0, 5).is_err());
        assert_eq!(bridge.run_collision_pass(0, 1), Ok(0));
    }
}
