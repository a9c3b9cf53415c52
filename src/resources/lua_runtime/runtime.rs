//! Lua runtime core implementation.
//!
//! This module contains the `LuaRuntime` struct which owns the Lua interpreter,
//! registers the `engine` table and keeps the table of live script bindings
//! (one Lua instance table per entity created from Lua).

use mlua::prelude::*;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};

use log::{error, info, warn};

use super::host::LuaHost;
use super::meta;
use crate::bridge::UPDATE_SEQUENCE;
use crate::components::collider::ColliderShape;
use crate::components::entity::ScriptRef;
use crate::components::status::EntityStatus;
use crate::components::status::RemovalKind;

/// Shared state accessible from Lua function closures and userdata methods.
/// Stored in Lua's app_data.
pub(super) struct LuaAppData {
    /// Instance table of every entity created from Lua, by binding id.
    bindings: RefCell<FxHashMap<u64, LuaTable>>,
    next_binding: Cell<u64>,
}

impl LuaAppData {
    fn new() -> Self {
        Self {
            bindings: RefCell::new(FxHashMap::default()),
            next_binding: Cell::new(1),
        }
    }

    pub(super) fn reserve_binding(&self) -> ScriptRef {
        let id = self.next_binding.get();
        self.next_binding.set(id + 1);
        ScriptRef(id)
    }

    pub(super) fn bind(&self, binding: ScriptRef, instance: LuaTable) {
        self.bindings.borrow_mut().insert(binding.0, instance);
    }

    pub(super) fn instance(&self, binding: ScriptRef) -> Option<LuaTable> {
        self.bindings.borrow().get(&binding.0).cloned()
    }

    pub(super) fn unbind(&self, binding: ScriptRef) -> Option<LuaTable> {
        self.bindings.borrow_mut().remove(&binding.0)
    }

    fn len(&self) -> usize {
        self.bindings.borrow().len()
    }
}

/// Fetch the shared app data from inside a Lua callback.
pub(super) fn app_data(lua: &Lua) -> LuaResult<mlua::AppDataRef<'_, LuaAppData>> {
    lua.app_data_ref::<LuaAppData>()
        .ok_or_else(|| LuaError::runtime("LuaAppData not found"))
}

/// Owner of the Lua interpreter.
///
/// Scripts talk to the pool through the `pool` userdata handed to every
/// callback; the `engine` global only carries logging and constants. The
/// Lua state is not thread-safe and must stay on the frame thread.
pub struct LuaRuntime {
    lua: Lua,
}

impl LuaRuntime {
    /// Creates a new Lua runtime and registers the base engine API.
    ///
    /// # Errors
    ///
    /// Returns an error if Lua initialization or API registration fails.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();

        // Set up the package path so `require` can find stage scripts in scripts/
        lua.load(r#"package.path = "./scripts/?.lua;./scripts/?/init.lua;" .. package.path"#)
            .exec()?;

        lua.set_app_data(LuaAppData::new());

        let runtime = Self { lua };
        runtime.register_base_api()?;
        runtime.register_constants()?;

        Ok(runtime)
    }

    fn register_base_api(&self) -> LuaResult<()> {
        let engine = self.lua.create_table()?;

        // engine.log(message) - General purpose logging
        engine.set(
            "log",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        // engine.log_info(message) - Info level logging
        engine.set(
            "log_info",
            self.lua.create_function(|_, msg: String| {
                info!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        // engine.log_warn(message) - Warning level logging
        engine.set(
            "log_warn",
            self.lua.create_function(|_, msg: String| {
                warn!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        // engine.log_error(message) - Error level logging
        engine.set(
            "log_error",
            self.lua.create_function(|_, msg: String| {
                error!(target: "lua", "{}", msg);
                Ok(())
            })?,
        )?;

        self.lua.globals().set("engine", engine)?;

        Ok(())
    }

    /// Numeric constants scripts compare against: status codes, shape codes
    /// and the group id selecting the update sequence.
    fn register_constants(&self) -> LuaResult<()> {
        let engine: LuaTable = self.lua.globals().get("engine")?;

        engine.set("UPDATE_SEQUENCE", UPDATE_SEQUENCE)?;

        engine.set("STATUS_FREE", EntityStatus::Free.code())?;
        engine.set("STATUS_ACTIVE", EntityStatus::Active.code())?;
        engine.set("STATUS_DEAD", EntityStatus::PendingRemoval(RemovalKind::Dead).code())?;
        engine.set("STATUS_KILLED", EntityStatus::PendingRemoval(RemovalKind::Killed).code())?;

        engine.set("SHAPE_POINT", ColliderShape::Point.code())?;
        engine.set("SHAPE_RECT", ColliderShape::Rect.code())?;
        engine.set("SHAPE_ELLIPSE", ColliderShape::Ellipse.code())?;

        engine.set("__meta", meta::build(&self.lua)?)?;

        Ok(())
    }

    /// Host adapter that routes pool callbacks into this runtime's scripts.
    pub fn host(&self) -> LuaHost<'_> {
        LuaHost::new(&self.lua)
    }

    /// Number of entities whose Lua instance table is still held.
    pub fn binding_count(&self) -> usize {
        app_data(&self.lua).map(|data| data.len()).unwrap_or(0)
    }

    /// Loads and executes a Lua script file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Lua script file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the script has syntax/runtime errors.
    pub fn run_script(&self, path: &str) -> LuaResult<()> {
        let script = std::fs::read_to_string(path)
            .map_err(|e| LuaError::ExternalError(std::sync::Arc::new(e)))?;
        self.lua.load(&script).set_name(path).exec()
    }

    /// Executes Lua source held in memory.
    pub fn run_source(&self, name: &str, source: &str) -> LuaResult<()> {
        self.lua.load(source).set_name(name).exec()
    }

    /// Calls a global Lua function by name with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the function doesn't exist or execution fails.
    pub fn call_function<A, R>(&self, name: &str, args: A) -> LuaResult<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        func.call(args)
    }

    /// Checks if a global function exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.lua.globals().get::<LuaFunction>(name).is_ok()
    }

    /// Returns a reference to the underlying Lua state.
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}
