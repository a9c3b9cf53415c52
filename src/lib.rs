//! Danmaku entity pool library.
//!
//! A fixed-capacity pool of bullet-hell entities with three ordered views
//! (update order, per-group collision order, layer render order), a
//! frame-phased scheduler with super-pause, and a handle-validated bridge for
//! scripting environments. This module exposes everything for use by the
//! demo binary, integration tests and embedding hosts.

pub mod bridge;
pub mod components;
pub mod error;
#[cfg(feature = "lua")]
pub mod luarc_generator;
pub mod resources;
#[cfg(feature = "lua")]
pub mod stub_generator;
pub mod systems;
