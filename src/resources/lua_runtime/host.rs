//! [`ScriptHost`] implementation backed by Lua class tables.
//!
//! Each entity created from Lua owns an instance table whose metatable
//! indexes its class. Pool events are forwarded to the class functions:
//!
//! | event            | Lua call                       |
//! |------------------|--------------------------------|
//! | frame begin      | `stage(pool, frame)` (global)  |
//! | update           | `class.frame(self, pool)`      |
//! | leave bounds     | `class.leave(self, pool)`      |
//! | collision        | `class.colli(self, other, pool)` |
//! | destroy          | `class.del(self, pool)`        |
//! | force destroy    | `class.kill(self, pool)`       |
//! | render           | `class.render(self, pool)`     |
//!
//! The pool reaches Lua as a scoped userdata that is only valid for the
//! duration of the call. Errors raised by a callback are logged with the
//! `lua` target and do not abort the frame.

use log::error;
use mlua::prelude::*;

use super::runtime::app_data;
use crate::bridge::host::ScriptHost;
use crate::components::entity::{AttachmentId, ScriptRef};
use crate::components::handle::Handle;
use crate::components::status::RemovalKind;
use crate::resources::pool::EntityPool;

/// Name of the optional global called at the start of every frame.
pub const STAGE_FUNCTION: &str = "stage";

pub struct LuaHost<'lua> {
    lua: &'lua Lua,
}

impl<'lua> LuaHost<'lua> {
    pub fn new(lua: &'lua Lua) -> Self {
        Self { lua }
    }

    /// Run `f` with the pool exposed to Lua as a scoped userdata.
    pub(super) fn with_pool<R>(
        lua: &Lua,
        pool: &mut EntityPool,
        f: impl FnOnce(LuaAnyUserData) -> LuaResult<R>,
    ) -> LuaResult<R> {
        lua.scope(|scope| {
            let userdata = scope.create_userdata_ref_mut(pool)?;
            f(userdata)
        })
    }

    /// Instance table bound to an entity, if it was created from Lua.
    pub(super) fn instance(lua: &Lua, pool: &EntityPool, entity: Handle) -> LuaResult<Option<LuaTable>> {
        let Some(binding) = pool.get(entity).and_then(|r| r.binding()) else {
            return Ok(None);
        };
        Ok(app_data(lua)?.instance(binding))
    }

    /// Call `instance[name](instance, pool)` when the class defines it.
    fn call_method(&self, pool: &mut EntityPool, entity: Handle, name: &str) {
        let result = (|| -> LuaResult<()> {
            let Some(instance) = Self::instance(self.lua, pool, entity)? else {
                return Ok(());
            };
            let LuaValue::Function(func) = instance.get::<LuaValue>(name)? else {
                return Ok(());
            };
            Self::with_pool(self.lua, pool, |ud| func.call::<()>((instance, ud)))
        })();
        if let Err(e) = result {
            error!(target: "lua", "Error in {}() of {}: {}", name, entity, e);
        }
    }
}

impl ScriptHost for LuaHost<'_> {
    fn on_frame_begin(&mut self, pool: &mut EntityPool) {
        let Ok(stage) = self.lua.globals().get::<LuaFunction>(STAGE_FUNCTION) else {
            return;
        };
        let frame = pool.frame();
        if let Err(e) = Self::with_pool(self.lua, pool, |ud| stage.call::<()>((ud, frame))) {
            error!(target: "lua", "Error in {}(): {}", STAGE_FUNCTION, e);
        }
    }

    fn on_update(&mut self, pool: &mut EntityPool, entity: Handle) {
        self.call_method(pool, entity, "frame");
    }

    fn on_leave_bounds(&mut self, pool: &mut EntityPool, entity: Handle) {
        self.call_method(pool, entity, "leave");
    }

    fn on_collision(&mut self, pool: &mut EntityPool, a: Handle, b: Handle) {
        let result = (|| -> LuaResult<()> {
            let Some(this) = Self::instance(self.lua, pool, a)? else {
                return Ok(());
            };
            // `colli` may also be a plain flag on the class.
            let LuaValue::Function(func) = this.get::<LuaValue>("colli")? else {
                return Ok(());
            };
            let other = match Self::instance(self.lua, pool, b)? {
                Some(t) => LuaValue::Table(t),
                None => LuaValue::Integer(b.to_bits() as _),
            };
            Self::with_pool(self.lua, pool, |ud| func.call::<()>((this, other, ud)))
        })();
        if let Err(e) = result {
            error!(target: "lua", "Error in colli() of {}: {}", a, e);
        }
    }

    fn on_removed(&mut self, pool: &mut EntityPool, entity: Handle, kind: RemovalKind) {
        let name = match kind {
            RemovalKind::Dead => "del",
            RemovalKind::Killed => "kill",
        };
        self.call_method(pool, entity, name);
    }

    fn on_render(&mut self, pool: &mut EntityPool, entity: Handle) {
        self.call_method(pool, entity, "render");
    }

    fn on_reap(&mut self, entity: Handle, binding: Option<ScriptRef>, _attachment: Option<AttachmentId>) {
        let Some(binding) = binding else {
            return;
        };
        match app_data(self.lua) {
            Ok(data) => {
                if let Some(instance) = data.unbind(binding) {
                    // Scripts holding on to the table see it go stale.
                    if let Err(e) = instance.raw_set("handle", LuaValue::Nil) {
                        error!(target: "lua", "Failed to clear handle of {}: {}", entity, e);
                    }
                }
            }
            Err(e) => error!(target: "lua", "{}", e),
        }
    }
}
