#![cfg(feature = "lua")]

use danmakupool::resources::lua_runtime::LuaRuntime;
use danmakupool::stub_generator;

#[test]
fn generate_stubs_produces_valid_output() {
    let rt = LuaRuntime::new().unwrap();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    // Must start with @meta annotation
    assert!(content.starts_with("---@meta"), "Should start with ---@meta");

    // Must contain the engine table declaration
    assert!(content.contains("engine = {}"), "Should declare engine table");
}

#[test]
fn generated_stubs_contain_representative_signatures() {
    let rt = LuaRuntime::new().unwrap();
    let content = stub_generator::generate_stubs(&rt).unwrap();

    // Logging
    assert!(content.contains("function engine.log(message)"), "Missing engine.log()");
    assert!(content.contains("function engine.log_warn(message)"), "Missing engine.log_warn()");

    // Constants
    assert!(content.contains("engine.UPDATE_SEQUENCE = -1"), "Missing UPDATE_SEQUENCE");
    assert!(content.contains("engine.SHAPE_ELLIPSE = 2"), "Missing SHAPE_ELLIPSE");
    assert!(content.contains("engine.STATUS_ACTIVE = 1"), "Missing STATUS_ACTIVE");

    // Pool methods
    assert!(content.contains("---@class Pool"), "Missing Pool class");
    assert!(content.contains("---@return EntityInstance\nfunction Pool:create(class, ...)"), "Missing Pool:create");
    assert!(content.contains("function Pool:get(entity, key)"), "Missing Pool:get");
    assert!(content.contains("function Pool:set(entity, key, value)"), "Missing Pool:set");
    assert!(content.contains("---@param group integer|nil\n---@return Entity|nil\nfunction Pool:first(group)"), "Missing Pool:first");
    assert!(content.contains("function Pool:collide(group_a, group_b)"), "Missing Pool:collide");
    assert!(content.contains("function Pool:aim(entity, speed, angle)"), "Missing Pool:aim");
    assert!(content.contains("function Pool:warp(entity, x, y)"), "Missing Pool:warp");

    // Entity types
    assert!(content.contains("---@class EntityClass"), "Missing EntityClass");
    assert!(content.contains("---@class EntityInstance : EntityClass"), "Missing EntityInstance");
    assert!(content.contains("---@field layer number|nil"), "Missing layer field");
    assert!(!content.contains("---@field uid "), "Read-only uid must not be a class field");
    assert!(content.contains("---@alias PropertyKey \"x\" | \"y\""), "Missing PropertyKey alias");

    // Callbacks
    assert!(content.contains("---@field frame fun(self: EntityInstance, pool: Pool)|nil"), "Missing frame callback");
    assert!(content.contains("---@field colli fun(self: EntityInstance, other: Entity, pool: Pool)|nil"), "Missing colli callback");

    // Stage entry point
    assert!(content.contains("function stage(pool, frame) end"), "Missing stage");
}

#[test]
fn generated_stubs_are_deterministic() {
    let a = stub_generator::generate_stubs(&LuaRuntime::new().unwrap()).unwrap();
    let b = stub_generator::generate_stubs(&LuaRuntime::new().unwrap()).unwrap();
    assert_eq!(a, b);
}
