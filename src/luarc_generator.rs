//! Generator for `.luarc.json`, the Lua Language Server configuration.
//!
//! Produces a `.luarc.json` file that configures the Lua Language Server for
//! editor autocompletion in stage scripts. The generated config declares the
//! `engine` and `stage` globals and points to the generated stubs file.

use crate::resources::lua_runtime::{LuaRuntime, STAGE_FUNCTION};
use mlua::prelude::*;
use std::path::Path;

/// Generate `.luarc.json` content from the Lua runtime metadata.
///
/// Validates that the `engine` global and `engine.__meta` table exist, then
/// builds the JSON configuration string.
pub fn generate_luarc(runtime: &LuaRuntime, stubs_filename: &str) -> Result<String, String> {
    let lua = runtime.lua();

    // Validate engine global and __meta exist
    let engine: LuaTable = lua
        .globals()
        .get("engine")
        .map_err(|e| format!("Failed to get engine table: {e}"))?;
    let _meta: LuaTable = engine
        .get("__meta")
        .map_err(|e| format!("Failed to get engine.__meta: {e}"))?;

    let content = serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/LuaLS/vscode-lua/master/setting/schema.json",
        "runtime.version": "LuaJIT",
        "diagnostics.globals": ["engine", STAGE_FUNCTION],
        "workspace.library": [stubs_filename],
        "completion.autoRequire": false
    });

    serde_json::to_string_pretty(&content)
        .map_err(|e| format!("Failed to serialize .luarc.json: {e}"))
}

/// Write the generated `.luarc.json` content to a file.
pub fn write_luarc(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luarc_lists_stub_file_and_globals() {
        let runtime = LuaRuntime::new().unwrap();
        let json = generate_luarc(&runtime, "danmakupool.lua").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["workspace.library"][0], "danmakupool.lua");
        assert_eq!(value["diagnostics.globals"][1], "stage");
        assert_eq!(value["runtime.version"], "LuaJIT");
    }
}
