//! Frame scheduler.
//!
//! Owns the answer to "what runs when". One call to [`FrameScheduler::step`]
//! runs a whole frame:
//!
//! ```text
//! frame begin -> Update -> BoundsCheck -> Collision(pair)* -> Integrate -> Reap
//! ```
//!
//! Collision runs once per configured group pair, in configuration order.
//! Rendering is not part of the step; the host calls
//! [`FrameScheduler::render`] whenever it wants to draw, usually once after
//! each step.
//!
//! # Super-pause
//!
//! The pool's super-pause counter is sampled and decremented once at the
//! start of Update. A positive sample freezes Update and Integrate for every
//! entity without `ignore_super_pause`; BoundsCheck, Collision and Reap run
//! regardless.

use log::{trace, warn};

use crate::bridge::host::ScriptHost;
use crate::components::handle::{Handle, Uid};
use crate::resources::pool::EntityPool;
use crate::resources::poolconfig::{CollisionPairs, PoolConfig};
use crate::systems::{boundscheck, collision, integrate, reap, render, update};

/// Phase the scheduler is currently executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePhase {
    FrameBegin,
    Update,
    BoundsCheck,
    Collision,
    Integrate,
    Reap,
    Render,
}

/// Counters gathered while stepping one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame that was stepped.
    pub frame: u64,
    /// Whether super-pause was engaged for this frame.
    pub paused: bool,
    pub updated: usize,
    pub left_bounds: usize,
    pub collisions: usize,
    pub reaped: usize,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    pairs: CollisionPairs,
    /// Reused snapshot buffer for phases that call into the host.
    order: Vec<Handle>,
    /// Update-phase snapshot with the uid each entity carried at its start.
    started: Vec<(Handle, Uid)>,
}

impl FrameScheduler {
    pub fn new(pairs: CollisionPairs) -> Self {
        Self {
            pairs,
            order: Vec::new(),
            started: Vec::new(),
        }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.collision_pairs.clone())
    }

    pub fn collision_pairs(&self) -> &[(u16, u16)] {
        &self.pairs
    }

    /// Add a group pair to the per-frame collision pass.
    ///
    /// Groups are checked against the pool on the next [`step`]; a pair
    /// naming a group the pool does not have is dropped with a warning.
    ///
    /// [`step`]: FrameScheduler::step
    pub fn add_collision_pair(&mut self, a: u16, b: u16) {
        self.pairs.push((a, b));
    }

    /// Run one full frame.
    ///
    /// Phases run in the fixed order documented on this module, each with
    /// [`EntityPool::phase`] set so callbacks can tell where they are. The
    /// current entity is cleared between phases. The frame counter advances
    /// once everything, Reap included, has finished.
    ///
    /// Returns the counters gathered along the way.
    pub fn step(&mut self, pool: &mut EntityPool, host: &mut dyn ScriptHost) -> FrameStats {
        let mut stats = FrameStats {
            frame: pool.frame(),
            ..FrameStats::default()
        };

        pool.set_phase(Some(FramePhase::FrameBegin));
        host.on_frame_begin(pool);

        pool.set_phase(Some(FramePhase::Update));
        stats.paused = pool.tick_super_pause();
        stats.updated = update::update(pool, host, stats.paused, &mut self.started);

        pool.set_phase(Some(FramePhase::BoundsCheck));
        stats.left_bounds = boundscheck::bounds_check(pool, host, &mut self.order);

        let groups = pool.group_count();
        self.pairs.retain(|pair| {
            let (a, b) = *pair;
            let valid = a < groups && b < groups;
            if !valid {
                warn!(
                    "Dropping collision pair ({}, {}): pool has {} groups",
                    a, b, groups
                );
            }
            valid
        });
        for &(a, b) in &self.pairs {
            pool.set_phase(Some(FramePhase::Collision));
            stats.collisions += collision::run_pass(pool, host, a, b);
        }

        pool.set_phase(Some(FramePhase::Integrate));
        integrate::integrate(pool, stats.paused);

        pool.set_phase(Some(FramePhase::Reap));
        stats.reaped = reap::reap(pool, host);

        pool.set_phase(None);
        pool.advance_frame();
        trace!("{:?}", stats);
        stats
    }

    /// Walk the render order once. Returns the number of draw callbacks.
    pub fn render(&mut self, pool: &mut EntityPool, host: &mut dyn ScriptHost) -> usize {
        pool.set_phase(Some(FramePhase::Render));
        let drawn = render::render(pool, host);
        pool.set_phase(None);
        drawn
    }
}
