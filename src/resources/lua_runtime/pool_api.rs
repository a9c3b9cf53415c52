//! The `pool` userdata seen by Lua callbacks.
//!
//! # Methods
//!
//! - `pool:create(class, ...)` - allocate an entity from a class table and
//!   return its instance table; `class.init(self, pool, ...)` runs first
//! - `pool:destroy(e)` / `pool:kill(e)` - soft / hard removal, returns
//!   whether the entity was still active
//! - `pool:valid(e)` - false for removed entities and malformed handles
//! - `pool:get(e, key)` / `pool:set(e, key, value)` - property access
//! - `pool:first(group)` / `pool:next(group, e)` - iteration; pass
//!   `engine.UPDATE_SEQUENCE` to walk every entity
//! - `pool:collide(group_a, group_b)` - run a collision pass
//! - `pool:check(a, b [, ignore_world])` - single-pair collision query
//! - `pool:reset(e)` - requeue at the end of the update order, returns the
//!   new uid
//! - `pool:warp(e, x, y)` - teleport without producing a `delta`
//! - `pool:set_speed(e, speed)` / `pool:aim(e, speed, angle)` - reshape
//!   the velocity, keeping the heading or from polar form
//! - `pool:current()` - entity whose callback is running
//! - `pool:super_pause()` / `pool:set_super_pause(frames)`
//! - `pool:clear()` - kill every active entity
//! - `pool:count()` - number of active entities
//!
//! Entities are passed either as instance tables or as the integer handle
//! stored in their `handle` field.

use glam::DVec2;
use mlua::prelude::*;

use super::host::LuaHost;
use super::runtime::app_data;
use crate::bridge::ScriptBridge;
use crate::components::class::ClassDescriptor;
use crate::components::collider::{Collider, ColliderShape};
use crate::components::handle::Handle;
use crate::components::property::PropertyValue;
use crate::components::worldmask::WorldMask;
use crate::resources::pool::EntityPool;

fn entity_handle(value: &LuaValue) -> LuaResult<Handle> {
    let bits = match value {
        LuaValue::Integer(i) => Some(*i as i64),
        LuaValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
        LuaValue::Table(t) => t.raw_get::<Option<i64>>("handle")?,
        _ => None,
    };
    bits.and_then(|b| u64::try_from(b).ok())
        .and_then(Handle::from_bits)
        .ok_or_else(|| {
            LuaError::runtime(format!("expected an entity, got {}", value.type_name()))
        })
}

/// Instance table for Lua-created entities, the raw handle otherwise.
fn entity_value(lua: &Lua, pool: &EntityPool, handle: Option<Handle>) -> LuaResult<LuaValue> {
    let Some(handle) = handle else {
        return Ok(LuaValue::Nil);
    };
    match LuaHost::instance(lua, pool, handle)? {
        Some(instance) => Ok(LuaValue::Table(instance)),
        None => Ok(LuaValue::Integer(handle.to_bits() as _)),
    }
}

fn to_lua(value: PropertyValue) -> LuaValue {
    match value {
        PropertyValue::Number(n) => LuaValue::Number(n),
        PropertyValue::Integer(i) => LuaValue::Integer(i as _),
        PropertyValue::Bool(b) => LuaValue::Boolean(b),
    }
}

fn from_lua(key: &str, value: &LuaValue) -> LuaResult<PropertyValue> {
    match value {
        LuaValue::Number(n) => Ok(PropertyValue::Number(*n)),
        LuaValue::Integer(i) => Ok(PropertyValue::Integer(*i as i64)),
        LuaValue::Boolean(b) => Ok(PropertyValue::Bool(*b)),
        other => Err(LuaError::runtime(format!(
            "property '{}' cannot be set to a {}",
            key,
            other.type_name()
        ))),
    }
}

/// Read the spawn fields of a class table. Missing fields keep the
/// descriptor defaults.
fn class_descriptor(class: &LuaTable) -> LuaResult<ClassDescriptor> {
    let mut desc = ClassDescriptor::new();
    if let Some(group) = class.get::<Option<i64>>("group")? {
        desc.group = u16::try_from(group)
            .map_err(|_| LuaError::runtime(format!("collision group {} out of range", group)))?;
    }
    if let Some(layer) = class.get::<Option<f64>>("layer")? {
        desc.layer = layer;
    }
    let x = class.get::<Option<f64>>("x")?.unwrap_or(0.0);
    let y = class.get::<Option<f64>>("y")?.unwrap_or(0.0);
    desc.position = DVec2::new(x, y);
    let vx = class.get::<Option<f64>>("vx")?.unwrap_or(0.0);
    let vy = class.get::<Option<f64>>("vy")?.unwrap_or(0.0);
    desc.velocity = DVec2::new(vx, vy);
    let ax = class.get::<Option<f64>>("ax")?.unwrap_or(0.0);
    let ay = class.get::<Option<f64>>("ay")?.unwrap_or(0.0);
    desc.acceleration = DVec2::new(ax, ay);

    let shape = match class.get::<Option<i64>>("shape")? {
        Some(code) => ColliderShape::from_code(code)
            .ok_or_else(|| LuaError::runtime(format!("unknown shape code {}", code)))?,
        None => ColliderShape::default(),
    };
    let a = class.get::<Option<f64>>("a")?.unwrap_or(0.0);
    let b = class.get::<Option<f64>>("b")?.unwrap_or(a);
    let rotation = class.get::<Option<f64>>("rot")?.unwrap_or(0.0);
    desc.collider = Collider {
        shape,
        half_extents: DVec2::new(a, b),
        rotation,
    };

    if let Some(world) = class.get::<Option<i64>>("world")? {
        let mask = u32::try_from(world)
            .map_err(|_| LuaError::runtime(format!("world mask {} out of range", world)))?;
        desc.world_mask = WorldMask(mask);
    }
    if let Some(v) = class.get::<Option<bool>>("ignore_super_pause")? {
        desc.ignore_super_pause = v;
    }
    if let Some(v) = class.get::<Option<bool>>("colli")? {
        desc.colli = v;
    }
    if let Some(v) = class.get::<Option<bool>>("bound")? {
        desc.bound = v;
    }
    if let Some(v) = class.get::<Option<bool>>("hide")? {
        desc.hide = v;
    }
    Ok(desc)
}

fn create(lua: &Lua, pool: &mut EntityPool, class: LuaTable, args: LuaMultiValue) -> LuaResult<LuaTable> {
    let mut desc = class_descriptor(&class)?;
    let binding = app_data(lua)?.reserve_binding();
    desc.binding = Some(binding);

    let handle = pool.allocate(&desc).map_err(LuaError::external)?;

    let instance = lua.create_table()?;
    instance.raw_set("handle", handle.to_bits() as i64)?;
    let meta = lua.create_table()?;
    meta.raw_set("__index", class.clone())?;
    let setmetatable: LuaFunction = lua.globals().get("setmetatable")?;
    setmetatable.call::<()>((instance.clone(), meta))?;
    app_data(lua)?.bind(binding, instance.clone());

    if let Some(init) = class.get::<Option<LuaFunction>>("init")? {
        let previous = pool.current();
        pool.set_current(Some(handle));
        let result = LuaHost::with_pool(lua, pool, |ud| {
            let mut call_args = args;
            call_args.push_front(LuaValue::UserData(ud));
            call_args.push_front(LuaValue::Table(instance.clone()));
            init.call::<()>(call_args)
        });
        pool.set_current(previous);
        result?;
    }
    Ok(instance)
}

impl LuaUserData for EntityPool {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("create", |lua, this, (class, args): (LuaTable, LuaMultiValue)| {
            create(lua, this, class, args)
        });

        methods.add_method_mut("destroy", |lua, this, entity: LuaValue| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            ScriptBridge::new(this, &mut host)
                .destroy(handle)
                .map_err(LuaError::external)
        });

        methods.add_method_mut("kill", |lua, this, entity: LuaValue| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            ScriptBridge::new(this, &mut host)
                .force_destroy(handle)
                .map_err(LuaError::external)
        });

        methods.add_method("valid", |_, this, entity: LuaValue| {
            Ok(entity_handle(&entity).is_ok_and(|h| this.is_valid(h)))
        });

        methods.add_method_mut("get", |lua, this, (entity, key): (LuaValue, String)| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            let value = ScriptBridge::new(this, &mut host)
                .get_property(handle, &key)
                .map_err(LuaError::external)?;
            Ok(to_lua(value))
        });

        methods.add_method_mut(
            "set",
            |lua, this, (entity, key, value): (LuaValue, String, LuaValue)| {
                let handle = entity_handle(&entity)?;
                let value = from_lua(&key, &value)?;
                let mut host = LuaHost::new(lua);
                ScriptBridge::new(this, &mut host)
                    .set_property(handle, &key, value)
                    .map_err(LuaError::external)
            },
        );

        methods.add_method_mut("first", |lua, this, group: Option<i64>| {
            let group = group.unwrap_or(crate::bridge::UPDATE_SEQUENCE);
            let mut host = LuaHost::new(lua);
            let first = ScriptBridge::new(this, &mut host)
                .first(group)
                .map_err(LuaError::external)?;
            entity_value(lua, this, first)
        });

        methods.add_method_mut("next", |lua, this, (group, entity): (i64, LuaValue)| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            let next = ScriptBridge::new(this, &mut host)
                .next(group, handle)
                .map_err(LuaError::external)?;
            entity_value(lua, this, next)
        });

        methods.add_method_mut("collide", |lua, this, (group_a, group_b): (i64, i64)| {
            let mut host = LuaHost::new(lua);
            ScriptBridge::new(this, &mut host)
                .run_collision_pass(group_a, group_b)
                .map_err(LuaError::external)
        });

        methods.add_method(
            "check",
            |_, this, (a, b, ignore_world): (LuaValue, LuaValue, Option<bool>)| {
                let a = entity_handle(&a)?;
                let b = entity_handle(&b)?;
                this.check_collision(a, b, ignore_world.unwrap_or(false))
                    .map_err(LuaError::external)
            },
        );

        methods.add_method_mut("reset", |_, this, entity: LuaValue| {
            let handle = entity_handle(&entity)?;
            this.reset(handle).map_err(LuaError::external)
        });

        methods.add_method_mut("warp", |lua, this, (entity, x, y): (LuaValue, f64, f64)| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            ScriptBridge::new(this, &mut host)
                .warp(handle, x, y)
                .map_err(LuaError::external)
        });

        methods.add_method_mut("set_speed", |lua, this, (entity, speed): (LuaValue, f64)| {
            let handle = entity_handle(&entity)?;
            let mut host = LuaHost::new(lua);
            ScriptBridge::new(this, &mut host)
                .set_speed(handle, speed)
                .map_err(LuaError::external)
        });

        methods.add_method_mut(
            "aim",
            |lua, this, (entity, speed, angle): (LuaValue, f64, f64)| {
                let handle = entity_handle(&entity)?;
                let mut host = LuaHost::new(lua);
                ScriptBridge::new(this, &mut host)
                    .set_polar_velocity(handle, speed, angle)
                    .map_err(LuaError::external)
            },
        );

        methods.add_method("current", |lua, this, ()| entity_value(lua, this, this.current()));

        methods.add_method("super_pause", |_, this, ()| Ok(this.super_pause()));

        methods.add_method_mut("set_super_pause", |_, this, frames: i32| {
            this.set_super_pause(frames);
            Ok(())
        });

        methods.add_method_mut("clear", |lua, this, ()| {
            let mut host = LuaHost::new(lua);
            Ok(ScriptBridge::new(this, &mut host).clear_all())
        });

        methods.add_method("count", |_, this, ()| Ok(this.active_count()));
    }
}
