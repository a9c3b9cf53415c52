//! Callbacks the pool makes into the scripting environment.
//!
//! Every method has an empty default so a host only implements the events it
//! cares about. Callbacks that run while a phase is in flight receive the
//! pool mutably and may create, destroy, re-group or re-layer entities;
//! destruction is always deferred to the reap phase so the caller's
//! traversal stays valid.

use crate::components::entity::{AttachmentId, ScriptRef};
use crate::components::handle::Handle;
use crate::components::status::RemovalKind;
use crate::resources::pool::EntityPool;

pub trait ScriptHost {
    /// Start of a frame, before the update phase.
    fn on_frame_begin(&mut self, _pool: &mut EntityPool) {}

    /// Per-entity update, once per frame for each eligible entity.
    fn on_update(&mut self, _pool: &mut EntityPool, _entity: Handle) {}

    /// The entity failed the bounds predicate and is now pending removal.
    fn on_leave_bounds(&mut self, _pool: &mut EntityPool, _entity: Handle) {}

    /// `a` (from the first group of the pass) overlaps `b`.
    fn on_collision(&mut self, _pool: &mut EntityPool, _a: Handle, _b: Handle) {}

    /// The entity left `Active` through a destroy or force-destroy request.
    fn on_removed(&mut self, _pool: &mut EntityPool, _entity: Handle, _kind: RemovalKind) {}

    /// Draw request during the render traversal.
    fn on_render(&mut self, _pool: &mut EntityPool, _entity: Handle) {}

    /// The slot has been returned to the arena. `entity` no longer resolves;
    /// the host drops its binding and releases the attachment.
    fn on_reap(
        &mut self,
        _entity: Handle,
        _binding: Option<ScriptRef>,
        _attachment: Option<AttachmentId>,
    ) {
    }
}

/// Host that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl ScriptHost for NullHost {}
