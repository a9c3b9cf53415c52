//! Per-frame phases.
//!
//! This module groups the phases [`scheduler::FrameScheduler`] runs each
//! frame. Each phase is a free function over the pool and the script host.
//!
//! Submodules overview
//! - [`scheduler`] – phase ordering, super-pause sampling and frame stats
//! - [`update`] – per-entity update callback and built-in motion
//! - [`boundscheck`] – playfield exit detection
//! - [`collision`] – group-pair collision pass
//! - [`integrate`] – commit of previous-frame positions
//! - [`reap`] – deferred removal, the only phase that frees slots
//! - [`render`] – layer-ordered draw traversal

pub mod boundscheck;
pub mod collision;
pub mod integrate;
pub mod reap;
pub mod render;
pub mod scheduler;
pub mod update;
