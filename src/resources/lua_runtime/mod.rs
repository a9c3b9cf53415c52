//! Lua scripting runtime for the entity pool.
//!
//! This module provides the Lua integration layer: the global `engine`
//! table, the `pool` userdata passed into every callback, and a
//! [`ScriptHost`](crate::bridge::host::ScriptHost) implementation that
//! dispatches pool events to Lua class tables.
//!
//! # Architecture
//!
//! The module is split into focused submodules:
//!
//! - [`runtime`] - Lua state ownership, binding table and `engine` table API
//! - [`host`] - [`LuaHost`], forwarding pool callbacks to class functions
//! - [`pool_api`] - `pool` userdata methods
//! - [`meta`] - API metadata published as `engine.__meta`
//!
//! # Example
//!
//! ```lua
//! local Bullet = { group = 1, layer = 50, shape = engine.SHAPE_ELLIPSE, a = 4 }
//!
//! function Bullet:init(pool, angle)
//!     pool:set(self, "vx", math.cos(angle) * 3)
//!     pool:set(self, "vy", math.sin(angle) * 3)
//! end
//!
//! function Bullet:leave(pool)
//!     engine.log("bullet left the stage")
//! end
//!
//! function stage(pool, frame)
//!     if frame % 30 == 0 then
//!         for i = 0, 15 do
//!             pool:create(Bullet, i * math.pi / 8)
//!         end
//!     end
//!     pool:collide(0, 1)
//! end
//! ```

mod host;
pub mod meta;
mod pool_api;
mod runtime;

pub use host::{LuaHost, STAGE_FUNCTION};
pub use runtime::LuaRuntime;
