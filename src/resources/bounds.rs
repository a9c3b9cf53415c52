//! Playfield bounds predicate.
//!
//! The bounds check asks an injected [`Bounds`] whether an entity's position
//! is still inside the playfield. [`RectBounds`] is the usual rectangle built
//! from the pool configuration; edges are inclusive.

use glam::DVec2;

use crate::resources::poolconfig::PoolConfig;

pub trait Bounds {
    fn contains(&self, position: DVec2) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectBounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl RectBounds {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(
            config.bound_left,
            config.bound_right,
            config.bound_bottom,
            config.bound_top,
        )
    }
}

impl Bounds for RectBounds {
    fn contains(&self, position: DVec2) -> bool {
        position.x >= self.left
            && position.x <= self.right
            && position.y >= self.bottom
            && position.y <= self.top
    }
}

/// Bounds that never reject anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Bounds for Unbounded {
    fn contains(&self, _position: DVec2) -> bool {
        true
    }
}
