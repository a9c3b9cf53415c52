//! Spawn-time description of an entity.
//!
//! A [`ClassDescriptor`] carries everything `create` needs to initialise a
//! freshly allocated slot. It is a plain value built with `with_*` calls:
//!
//! ```
//! use danmakupool::components::class::ClassDescriptor;
//! use danmakupool::components::collider::Collider;
//!
//! let bullet = ClassDescriptor::new()
//!     .with_group(2)
//!     .with_layer(50.0)
//!     .with_position(0.0, 120.0)
//!     .with_velocity(0.0, -3.0)
//!     .with_collider(Collider::circle(4.0));
//! assert_eq!(bullet.group, 2);
//! ```

use glam::DVec2;

use crate::components::collider::Collider;
use crate::components::entity::{AttachmentId, ScriptRef};
use crate::components::worldmask::WorldMask;

#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    pub group: u16,
    pub layer: f64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    pub collider: Collider,
    pub world_mask: WorldMask,
    pub ignore_super_pause: bool,
    pub colli: bool,
    pub bound: bool,
    pub hide: bool,
    pub binding: Option<ScriptRef>,
    pub attachment: Option<AttachmentId>,
}

impl Default for ClassDescriptor {
    fn default() -> Self {
        Self {
            group: 0,
            layer: 0.0,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            collider: Collider::default(),
            world_mask: WorldMask::default(),
            ignore_super_pause: false,
            colli: true,
            bound: true,
            hide: false,
            binding: None,
            attachment: None,
        }
    }
}

impl ClassDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: u16) -> Self {
        self.group = group;
        self
    }

    pub fn with_layer(mut self, layer: f64) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = DVec2::new(x, y);
        self
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.velocity = DVec2::new(vx, vy);
        self
    }

    pub fn with_acceleration(mut self, ax: f64, ay: f64) -> Self {
        self.acceleration = DVec2::new(ax, ay);
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = collider;
        self
    }

    pub fn with_world_mask(mut self, mask: WorldMask) -> Self {
        self.world_mask = mask;
        self
    }

    pub fn ignoring_super_pause(mut self) -> Self {
        self.ignore_super_pause = true;
        self
    }

    pub fn with_colli(mut self, colli: bool) -> Self {
        self.colli = colli;
        self
    }

    pub fn with_bound(mut self, bound: bool) -> Self {
        self.bound = bound;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    pub fn with_binding(mut self, binding: ScriptRef) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentId) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
