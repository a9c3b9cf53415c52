//! API metadata published to Lua as `engine.__meta`.
//!
//! The stub generator reads this table back to emit editor annotations, so
//! every function registered on `engine` or on the `pool` userdata has an
//! entry here.

use mlua::prelude::*;

use crate::components::property::PropertyKey;

pub struct ApiFn {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [(&'static str, &'static str)],
    pub returns: Option<&'static str>,
}

const fn api(
    name: &'static str,
    description: &'static str,
    params: &'static [(&'static str, &'static str)],
    returns: Option<&'static str>,
) -> ApiFn {
    ApiFn {
        name,
        description,
        params,
        returns,
    }
}

pub const ENGINE_FUNCTIONS: &[ApiFn] = &[
    api("log", "Log a message at info level", &[("message", "string")], None),
    api("log_info", "Log a message at info level", &[("message", "string")], None),
    api("log_warn", "Log a message at warn level", &[("message", "string")], None),
    api("log_error", "Log a message at error level", &[("message", "string")], None),
];

pub const POOL_METHODS: &[ApiFn] = &[
    api(
        "create",
        "Allocate an entity from a class table; runs class.init(self, pool, ...)",
        &[("class", "EntityClass"), ("...", "any")],
        Some("EntityInstance"),
    ),
    api(
        "destroy",
        "Mark the entity dead; fires class.del. False if it was already removed",
        &[("entity", "Entity")],
        Some("boolean"),
    ),
    api(
        "kill",
        "Force-remove the entity; fires class.kill. False if it was already removed",
        &[("entity", "Entity")],
        Some("boolean"),
    ),
    api("valid", "Whether the entity still exists", &[("entity", "Entity")], Some("boolean")),
    api(
        "get",
        "Read an entity property",
        &[("entity", "Entity"), ("key", "PropertyKey")],
        Some("number|integer|boolean"),
    ),
    api(
        "set",
        "Write an entity property",
        &[("entity", "Entity"), ("key", "PropertyKey"), ("value", "number|integer|boolean")],
        None,
    ),
    api(
        "first",
        "First entity of a collision group, or of the update order for engine.UPDATE_SEQUENCE",
        &[("group", "integer?")],
        Some("Entity?"),
    ),
    api(
        "next",
        "Entity following `entity` in the same traversal",
        &[("group", "integer"), ("entity", "Entity")],
        Some("Entity?"),
    ),
    api(
        "collide",
        "Run a collision pass between two groups; returns the number of hits",
        &[("group_a", "integer"), ("group_b", "integer")],
        Some("integer"),
    ),
    api(
        "check",
        "Test a single pair for collision",
        &[("a", "Entity"), ("b", "Entity"), ("ignore_world", "boolean?")],
        Some("boolean"),
    ),
    api(
        "reset",
        "Move the entity to the end of the update order with a fresh uid",
        &[("entity", "Entity")],
        Some("integer"),
    ),
    api(
        "warp",
        "Teleport the entity without producing a displacement",
        &[("entity", "Entity"), ("x", "number"), ("y", "number")],
        None,
    ),
    api(
        "set_speed",
        "Rescale the velocity to `speed`, keeping the heading",
        &[("entity", "Entity"), ("speed", "number")],
        None,
    ),
    api(
        "aim",
        "Set the velocity to `speed` along `angle` (radians)",
        &[("entity", "Entity"), ("speed", "number"), ("angle", "number")],
        None,
    ),
    api("current", "Entity whose callback is running", &[], Some("Entity?")),
    api("super_pause", "Remaining super-pause frames", &[], Some("integer")),
    api(
        "set_super_pause",
        "Freeze every entity without ignore_super_pause for `frames` frames",
        &[("frames", "integer")],
        None,
    ),
    api("clear", "Kill every active entity; returns how many", &[], Some("integer")),
    api("count", "Number of active entities", &[], Some("integer")),
];

pub const CLASS_CALLBACKS: &[ApiFn] = &[
    api("init", "Called by pool:create with its extra arguments", &[("pool", "Pool"), ("...", "any")], None),
    api("frame", "Called once per frame during the update phase", &[("pool", "Pool")], None),
    api(
        "colli",
        "Called when this entity overlaps `other` in a collision pass",
        &[("other", "Entity"), ("pool", "Pool")],
        None,
    ),
    api("del", "Called when the entity is destroyed", &[("pool", "Pool")], None),
    api("kill", "Called when the entity is force-removed", &[("pool", "Pool")], None),
    api("leave", "Called when the entity leaves the playfield", &[("pool", "Pool")], None),
    api("render", "Called during the render traversal", &[("pool", "Pool")], None),
];

fn fn_table(lua: &Lua, f: &ApiFn) -> LuaResult<LuaTable> {
    let t = lua.create_table()?;
    t.set("name", f.name)?;
    t.set("description", f.description)?;
    let params = lua.create_table()?;
    for (name, ty) in f.params {
        let p = lua.create_table()?;
        p.set("name", *name)?;
        p.set("type", *ty)?;
        params.push(p)?;
    }
    t.set("params", params)?;
    if let Some(ret) = f.returns {
        t.set("returns", ret)?;
    }
    Ok(t)
}

fn fn_list(lua: &Lua, fns: &[ApiFn]) -> LuaResult<LuaTable> {
    let list = lua.create_table()?;
    for f in fns {
        list.push(fn_table(lua, f)?)?;
    }
    Ok(list)
}

/// Build the `engine.__meta` table.
pub fn build(lua: &Lua) -> LuaResult<LuaTable> {
    let meta = lua.create_table()?;
    meta.set("functions", fn_list(lua, ENGINE_FUNCTIONS)?)?;
    meta.set("pool_methods", fn_list(lua, POOL_METHODS)?)?;
    meta.set("callbacks", fn_list(lua, CLASS_CALLBACKS)?)?;

    let properties = lua.create_table()?;
    for key in PropertyKey::ALL {
        let p = lua.create_table()?;
        p.set("name", key.name())?;
        p.set("type", key.lua_type())?;
        p.set("read_only", key.is_read_only())?;
        properties.push(p)?;
    }
    meta.set("properties", properties)?;
    Ok(meta)
}
