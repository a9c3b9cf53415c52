//! Lua stub generator for EmmyLua / lua-language-server.
//!
//! Reads `engine.__meta` from the Lua runtime and emits a deterministic
//! `danmakupool.lua` stub file with `---@class`, `---@field`, `---@param`,
//! and `---@return` annotations for the `engine` table, the `pool` userdata
//! and entity class tables.

use crate::resources::lua_runtime::LuaRuntime;
use mlua::prelude::*;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// Maps a meta type string to the EmmyLua annotation type.
fn lua_type_annotation(meta_type: &str) -> String {
    match meta_type {
        s if s.ends_with('?') => format!("{}|nil", &s[..s.len() - 1]),
        other => other.into(),
    }
}

/// Extracted function metadata.
struct FnMeta {
    name: String,
    description: String,
    params: Vec<(String, String)>,
    returns: Option<String>,
}

struct PropertyMeta {
    name: String,
    type_name: String,
    read_only: bool,
}

/// Extract all metadata from `engine.__meta` and generate the stub file content.
pub fn generate_stubs(runtime: &LuaRuntime) -> Result<String, String> {
    let lua = runtime.lua();

    let engine: LuaTable = lua
        .globals()
        .get("engine")
        .map_err(|e| format!("Failed to get engine table: {e}"))?;
    let meta: LuaTable = engine
        .get("__meta")
        .map_err(|e| format!("Failed to get engine.__meta: {e}"))?;

    let functions = extract_functions(&meta, "functions").map_err(|e| format!("Functions: {e}"))?;
    let methods = extract_functions(&meta, "pool_methods").map_err(|e| format!("Pool methods: {e}"))?;
    let callbacks = extract_functions(&meta, "callbacks").map_err(|e| format!("Callbacks: {e}"))?;
    let properties = extract_properties(&meta).map_err(|e| format!("Properties: {e}"))?;
    let constants = extract_constants(&engine).map_err(|e| format!("Constants: {e}"))?;

    Ok(render_stubs(&functions, &constants, &methods, &callbacks, &properties))
}

/// Write the generated stubs to a file.
pub fn write_stubs(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

// --------------- Extraction ---------------

fn extract_functions(meta: &LuaTable, key: &str) -> Result<Vec<FnMeta>, LuaError> {
    let fns_tbl: LuaTable = meta.get(key)?;
    let mut result = Vec::new();
    for entry in fns_tbl.sequence_values::<LuaTable>() {
        let entry = entry?;
        let mut params = Vec::new();
        let params_tbl: LuaTable = entry.get("params")?;
        for p in params_tbl.sequence_values::<LuaTable>() {
            let p = p?;
            params.push((p.get::<String>("name")?, p.get::<String>("type")?));
        }
        result.push(FnMeta {
            name: entry.get("name")?,
            description: entry.get("description")?,
            params,
            returns: entry.get("returns")?,
        });
    }
    Ok(result)
}

fn extract_properties(meta: &LuaTable) -> Result<Vec<PropertyMeta>, LuaError> {
    let tbl: LuaTable = meta.get("properties")?;
    let mut result = Vec::new();
    for entry in tbl.sequence_values::<LuaTable>() {
        let entry = entry?;
        result.push(PropertyMeta {
            name: entry.get("name")?,
            type_name: entry.get("type")?,
            read_only: entry.get("read_only")?,
        });
    }
    Ok(result)
}

/// Upper-case integer fields of `engine`, sorted by name.
fn extract_constants(engine: &LuaTable) -> Result<Vec<(String, i64)>, LuaError> {
    let mut result = Vec::new();
    for pair in engine.pairs::<String, LuaValue>() {
        let (name, value) = pair?;
        if !name.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            continue;
        }
        match value {
            LuaValue::Integer(i) => result.push((name, i as i64)),
            LuaValue::Number(n) if n.fract() == 0.0 => result.push((name, n as i64)),
            _ => {}
        }
    }
    result.sort();
    Ok(result)
}

// --------------- Rendering ---------------

fn render_stubs(
    functions: &[FnMeta],
    constants: &[(String, i64)],
    methods: &[FnMeta],
    callbacks: &[FnMeta],
    properties: &[PropertyMeta],
) -> String {
    let mut out = String::with_capacity(16 * 1024);

    // Header
    writeln!(out, "---@meta").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "-- THIS FILE IS AUTO-GENERATED by `danmakupool --create-lua-stubs`."
    )
    .unwrap();
    writeln!(
        out,
        "-- DO NOT EDIT MANUALLY. Regenerate from engine.__meta instead."
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---@class engine").unwrap();
    writeln!(out, "---Logging and constants provided by the entity pool (Rust)").unwrap();
    writeln!(out, "engine = {{}}").unwrap();
    writeln!(out).unwrap();

    for (name, value) in constants {
        writeln!(out, "---@type integer").unwrap();
        writeln!(out, "engine.{} = {}", name, value).unwrap();
    }
    writeln!(out).unwrap();

    for f in functions {
        render_function(&mut out, "engine.", f);
    }

    render_properties(&mut out, properties);
    render_entity_types(&mut out, properties, callbacks);

    writeln!(out, "-- ==================== Pool ====================").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---Entity pool, valid only inside the callback it was passed to").unwrap();
    writeln!(out, "---@class Pool").unwrap();
    writeln!(out, "local Pool = {{}}").unwrap();
    writeln!(out).unwrap();
    for m in methods {
        render_function(&mut out, "Pool:", m);
    }

    writeln!(out, "-- ==================== Stage ====================").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---Called at the start of every frame when defined").unwrap();
    writeln!(out, "---@param pool Pool").unwrap();
    writeln!(out, "---@param frame integer").unwrap();
    writeln!(out, "function stage(pool, frame) end").unwrap();

    out
}

fn render_properties(out: &mut String, properties: &[PropertyMeta]) {
    writeln!(out, "-- ==================== Properties ====================").unwrap();
    writeln!(out).unwrap();
    let names: Vec<String> = properties.iter().map(|p| format!("\"{}\"", p.name)).collect();
    writeln!(out, "---Keys accepted by Pool:get and Pool:set").unwrap();
    writeln!(out, "---@alias PropertyKey {}", names.join(" | ")).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---An instance table or its integer handle").unwrap();
    writeln!(out, "---@alias Entity EntityInstance|integer").unwrap();
    writeln!(out).unwrap();
}

fn render_entity_types(out: &mut String, properties: &[PropertyMeta], callbacks: &[FnMeta]) {
    writeln!(out, "-- ==================== Classes ====================").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "---Class table passed to Pool:create").unwrap();
    writeln!(out, "---@class EntityClass").unwrap();
    for p in properties.iter().filter(|p| !p.read_only) {
        writeln!(out, "---@field {} {}|nil", p.name, p.type_name).unwrap();
    }
    for cb in callbacks {
        let mut sig = vec!["self: EntityInstance".to_string()];
        sig.extend(
            cb.params
                .iter()
                .map(|(n, t)| format!("{}: {}", n, lua_type_annotation(t))),
        );
        writeln!(out, "---@field {} fun({})|nil {}", cb.name, sig.join(", "), cb.description).unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out, "---Per-entity table returned by Pool:create").unwrap();
    writeln!(out, "---@class EntityInstance : EntityClass").unwrap();
    writeln!(out, "---@field handle integer|nil Encoded handle, nil once the entity is reaped").unwrap();
    writeln!(out).unwrap();
}

fn render_function(out: &mut String, prefix: &str, f: &FnMeta) {
    for line in f.description.lines() {
        writeln!(out, "---{}", line).unwrap();
    }
    for (pname, ptype) in &f.params {
        writeln!(out, "---@param {} {}", pname, lua_type_annotation(ptype)).unwrap();
    }
    if let Some(ret) = &f.returns {
        writeln!(out, "---@return {}", lua_type_annotation(ret)).unwrap();
    }
    let names: Vec<&str> = f.params.iter().map(|(n, _)| n.as_str()).collect();
    writeln!(out, "function {}{}({}) end", prefix, f.name, names.join(", ")).unwrap();
    writeln!(out).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_types_become_nil_unions() {
        assert_eq!(lua_type_annotation("Entity?"), "Entity|nil");
        assert_eq!(lua_type_annotation("integer"), "integer");
    }
}
