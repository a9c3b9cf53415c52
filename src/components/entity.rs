//! The per-slot entity record.
//!
//! `uid`, `status`, `group` and `layer` are owned by the pool: changing any
//! of them has to relink the entity in one of the ordered views, so they are
//! only readable here and written through
//! [`EntityPool`](crate::resources::pool::EntityPool). Everything else is
//! plain data that callbacks may edit in place.

use serde::{Deserialize, Serialize};

use crate::components::collider::{Collider, ShapeView};
use crate::components::handle::Uid;
use crate::components::kinematics::Kinematics;
use crate::components::status::EntityStatus;
use crate::components::worldmask::WorldMask;

/// Opaque back-reference the scripting environment uses to find its own
/// object for an entity. Cleared when the entity is reaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptRef(pub u64);

/// Opaque id of a host-owned resource attached to an entity (for example a
/// particle emitter). The host releases it when the entity is reaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub u64);

#[derive(Clone, Debug, Default)]
pub struct EntityRecord {
    pub(crate) uid: Uid,
    pub(crate) status: EntityStatus,
    pub(crate) group: u16,
    pub(crate) layer: f64,
    /// Layer written while the render traversal was running.
    pub(crate) pending_layer: Option<f64>,
    pub(crate) binding: Option<ScriptRef>,

    pub kinematics: Kinematics,
    pub collider: Collider,
    pub world_mask: WorldMask,
    pub ignore_super_pause: bool,
    /// Participates in collision passes.
    pub colli: bool,
    /// Subject to the bounds check.
    pub bound: bool,
    /// Skipped by the render traversal.
    pub hide: bool,
    /// Script-visible frame counter, frozen by super-pause.
    pub timer: u64,
    /// Frames survived, advanced by every reap regardless of super-pause.
    pub frames_alive: u64,
    pub attachment: Option<AttachmentId>,
}

impl EntityRecord {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn group(&self) -> u16 {
        self.group
    }

    pub fn layer(&self) -> f64 {
        self.layer
    }

    /// Layer the entity will render at once a queued write lands.
    pub fn effective_layer(&self) -> f64 {
        self.pending_layer.unwrap_or(self.layer)
    }

    pub fn binding(&self) -> Option<ScriptRef> {
        self.binding
    }

    pub fn shape_view(&self) -> ShapeView {
        ShapeView {
            position: self.kinematics.position,
            previous_position: self.kinematics.previous_position,
            collider: self.collider,
        }
    }
}
