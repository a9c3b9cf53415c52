//! Pool-wide state.
//!
//! This module groups the long-lived data behind the entity pool: slot
//! storage, the three ordered views over it, the configuration, the bounds
//! predicate and the Lua runtime. [`pool::EntityPool`] ties them together and
//! is the context object every phase and bridge call receives.
//!
//! Overview
//! - `arena` – fixed-capacity slot storage with generations and a free list
//! - `bounds` – playfield bounds predicate
//! - `collisiongroups` – one ordered list per collision group
//! - `linklist` – index-based doubly linked lists shared by the list views
//! - `lua_runtime` – Lua state, `engine` table and `pool` userdata
//! - `pool` – the entity pool context object
//! - `poolconfig` – INI/JSON backed pool configuration
//! - `renderorder` – layer-then-uid sorted render traversal
//! - `updatesequence` – allocation-ordered update traversal
pub mod arena;
pub mod bounds;
pub mod collisiongroups;
pub mod linklist;
#[cfg(feature = "lua")]
pub mod lua_runtime;
pub mod pool;
pub mod poolconfig;
pub mod renderorder;
pub mod updatesequence;
