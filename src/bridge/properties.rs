//! Property dispatch for the script bridge.
//!
//! One `read` and one `write` match over [`PropertyKey`]. Plain fields are
//! stored straight into the record; `group` and `layer` go through the pool
//! so the entity is relinked.

use crate::components::collider::ColliderShape;
use crate::components::entity::EntityRecord;
use crate::components::handle::Handle;
use crate::components::property::{PropertyKey, PropertyValue};
use crate::components::worldmask::WorldMask;
use crate::error::{PoolError, PoolResult};
use crate::resources::pool::EntityPool;

pub(crate) fn read(record: &EntityRecord, key: PropertyKey) -> PropertyValue {
    let k = &record.kinematics;
    match key {
        PropertyKey::X => k.position.x.into(),
        PropertyKey::Y => k.position.y.into(),
        PropertyKey::Vx => k.velocity.x.into(),
        PropertyKey::Vy => k.velocity.y.into(),
        PropertyKey::Ax => k.acceleration.x.into(),
        PropertyKey::Ay => k.acceleration.y.into(),
        PropertyKey::Dx => k.delta.x.into(),
        PropertyKey::Dy => k.delta.y.into(),
        PropertyKey::Group => i64::from(record.group()).into(),
        PropertyKey::Layer => record.effective_layer().into(),
        PropertyKey::Uid => saturating_i64(record.uid()).into(),
        PropertyKey::Status => record.status().code().into(),
        PropertyKey::Timer => saturating_i64(record.timer).into(),
        PropertyKey::FramesAlive => saturating_i64(record.frames_alive).into(),
        PropertyKey::Shape => record.collider.shape.code().into(),
        PropertyKey::A => record.collider.half_extents.x.into(),
        PropertyKey::B => record.collider.half_extents.y.into(),
        PropertyKey::Rot => record.collider.rotation.into(),
        PropertyKey::World => i64::from(record.world_mask.0).into(),
        PropertyKey::IgnoreSuperPause => record.ignore_super_pause.into(),
        PropertyKey::Colli => record.colli.into(),
        PropertyKey::Bound => record.bound.into(),
        PropertyKey::Hide => record.hide.into(),
    }
}

pub(crate) fn write(
    pool: &mut EntityPool,
    handle: Handle,
    key: PropertyKey,
    value: PropertyValue,
) -> PoolResult<()> {
    if key.is_read_only() {
        return Err(PoolError::ReadOnlyProperty(key));
    }
    match key {
        PropertyKey::Group => {
            let group = value.as_i64().ok_or(type_error(key, "an integer"))?;
            return pool.set_group(handle, group);
        }
        PropertyKey::Layer => {
            let layer = number(key, value)?;
            return pool.set_layer(handle, layer);
        }
        _ => {}
    }

    let record = pool.record_mut(handle)?;
    match key {
        PropertyKey::X => record.kinematics.position.x = number(key, value)?,
        PropertyKey::Y => record.kinematics.position.y = number(key, value)?,
        PropertyKey::Vx => record.kinematics.velocity.x = number(key, value)?,
        PropertyKey::Vy => record.kinematics.velocity.y = number(key, value)?,
        PropertyKey::Ax => record.kinematics.acceleration.x = number(key, value)?,
        PropertyKey::Ay => record.kinematics.acceleration.y = number(key, value)?,
        PropertyKey::Timer => {
            record.timer = value
                .as_i64()
                .and_then(|v| u64::try_from(v).ok())
                .ok_or(type_error(key, "a non-negative integer"))?;
        }
        PropertyKey::Shape => {
            record.collider.shape = value
                .as_i64()
                .and_then(ColliderShape::from_code)
                .ok_or(type_error(key, "a shape code (0 point, 1 rect, 2 ellipse)"))?;
        }
        PropertyKey::A => record.collider.half_extents.x = number(key, value)?,
        PropertyKey::B => record.collider.half_extents.y = number(key, value)?,
        PropertyKey::Rot => record.collider.rotation = number(key, value)?,
        PropertyKey::World => {
            let mask = value
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or(type_error(key, "a 32-bit unsigned mask"))?;
            record.world_mask = WorldMask(mask);
        }
        PropertyKey::IgnoreSuperPause => record.ignore_super_pause = boolean(key, value)?,
        PropertyKey::Colli => record.colli = boolean(key, value)?,
        PropertyKey::Bound => record.bound = boolean(key, value)?,
        PropertyKey::Hide => record.hide = boolean(key, value)?,
        PropertyKey::Group
        | PropertyKey::Layer
        | PropertyKey::Dx
        | PropertyKey::Dy
        | PropertyKey::Uid
        | PropertyKey::Status
        | PropertyKey::FramesAlive => unreachable!("handled above"),
    }
    Ok(())
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn type_error(key: PropertyKey, expected: &'static str) -> PoolError {
    PoolError::PropertyType { key, expected }
}

fn number(key: PropertyKey, value: PropertyValue) -> PoolResult<f64> {
    value.as_f64().ok_or(type_error(key, "a number"))
}

fn boolean(key: PropertyKey, value: PropertyValue) -> PoolResult<bool> {
    value.as_bool().ok_or(type_error(key, "a boolean"))
}
