//! The entity pool: arena plus its three ordered views.
//!
//! [`EntityPool`] is the explicit context object every entry point receives.
//! It owns
//!
//! - the [`EntityArena`] holding all entity records,
//! - the [`UpdateSequence`] (allocation order, used by Update, BoundsCheck,
//!   Integrate and Reap),
//! - the [`CollisionGroupIndex`] (one list per collision group),
//! - the [`RenderOrder`] (sorted by layer, then uid),
//!
//! plus the injected geometry and bounds predicates and the pool-wide frame
//! state (super-pause counter, active worlds, currently executing entity).
//!
//! Structural invariant: a slot is either free (in the arena free list and
//! nowhere else) or linked into all three views. The only way out of the
//! views is [`EntityPool::free`], which only the reap phase calls.

use log::{debug, info, warn};

use crate::components::class::ClassDescriptor;
use crate::components::collider::{AabbGeometry, Geometry};
use crate::components::entity::EntityRecord;
use crate::components::handle::{Handle, Uid};
use crate::components::kinematics::Kinematics;
use crate::components::status::{EntityStatus, RemovalKind};
use crate::components::worldmask::WorldMask;
use crate::error::{PoolError, PoolResult};
use crate::resources::arena::EntityArena;
use crate::resources::bounds::{Bounds, RectBounds};
use crate::resources::collisiongroups::CollisionGroupIndex;
use crate::resources::poolconfig::{PoolConfig, clamp_capacity};
use crate::resources::renderorder::RenderOrder;
use crate::resources::updatesequence::UpdateSequence;
use crate::systems::scheduler::FramePhase;

/// Which ordered view an iteration walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// The full update sequence.
    Update,
    /// A single collision group.
    Group(u16),
}

pub struct EntityPool {
    config: PoolConfig,
    arena: EntityArena,
    update: UpdateSequence,
    groups: CollisionGroupIndex,
    render: RenderOrder,
    geometry: Box<dyn Geometry>,
    bounds: Box<dyn Bounds>,
    super_pause: i32,
    active_worlds: WorldMask,
    current: Option<Handle>,
    phase: Option<FramePhase>,
    rendering: bool,
    /// Entities whose render key changed while the render traversal ran.
    pending_rekeys: Vec<Handle>,
    frame: u64,
}

impl EntityPool {
    /// Pool with the reference bounding-box geometry and rectangular bounds
    /// taken from the configuration.
    pub fn new(config: PoolConfig) -> Self {
        let bounds = RectBounds::from_config(&config);
        Self::with_collaborators(config, Box::new(AabbGeometry), Box::new(bounds))
    }

    /// Pool with injected collision geometry and bounds predicate.
    ///
    /// The configured capacity is clamped to `1..=MAX_CAPACITY` (with a
    /// warning) so every slot stays addressable by a handle.
    pub fn with_collaborators(
        mut config: PoolConfig,
        geometry: Box<dyn Geometry>,
        bounds: Box<dyn Bounds>,
    ) -> Self {
        config.capacity = clamp_capacity(config.capacity);
        let capacity = config.capacity;
        let groups = config.groups.max(1);
        info!(
            "Creating entity pool: capacity={}, groups={}",
            capacity, groups
        );
        Self {
            arena: EntityArena::new(capacity),
            update: UpdateSequence::new(capacity),
            groups: CollisionGroupIndex::new(capacity, groups),
            render: RenderOrder::new(capacity),
            geometry,
            bounds,
            super_pause: 0,
            active_worlds: config.active_worlds,
            current: None,
            phase: None,
            rendering: false,
            pending_rekeys: Vec::new(),
            frame: 0,
            config,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn free_count(&self) -> usize {
        self.arena.free_count()
    }

    /// Occupied slots, including entities waiting to be reaped.
    pub fn live_count(&self) -> usize {
        self.arena.live_count()
    }

    pub fn group_count(&self) -> u16 {
        self.groups.group_count()
    }

    pub fn group_len(&self, group: u16) -> usize {
        if self.groups.is_valid_group(group) {
            self.groups.len(group)
        } else {
            0
        }
    }

    /// Uid the next allocation will receive.
    pub fn next_uid(&self) -> Uid {
        self.arena.peek_uid()
    }

    /// Frames completed since the pool was created.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame += 1;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Take a free slot, initialise it from `class` and link it into the
    /// update sequence (tail), its collision group (tail) and the render
    /// order.
    pub fn allocate(&mut self, class: &ClassDescriptor) -> PoolResult<Handle> {
        self.check_group(i64::from(class.group))?;
        let handle = self.arena.allocate().inspect_err(|e| {
            if let PoolError::PoolExhausted { capacity } = e {
                warn!("Entity pool exhausted ({} slots), creation rejected", capacity);
            }
        })?;
        let slot = handle.slot();
        let record = self.arena.record_mut(slot);
        record.group = class.group;
        record.layer = class.layer;
        record.kinematics = Kinematics::at(class.position);
        record.kinematics.velocity = class.velocity;
        record.kinematics.acceleration = class.acceleration;
        record.collider = class.collider;
        record.world_mask = class.world_mask;
        record.ignore_super_pause = class.ignore_super_pause;
        record.colli = class.colli;
        record.bound = class.bound;
        record.hide = class.hide;
        record.binding = class.binding;
        record.attachment = class.attachment;
        let uid = record.uid;

        self.update.insert_at_tail(slot);
        self.groups.insert(class.group, slot);
        self.render.insert(slot, class.layer, uid);
        Ok(handle)
    }

    /// Unlink a slot from every view and hand it back to the arena.
    /// Only the reap phase calls this.
    pub(crate) fn free(&mut self, slot: u32) {
        debug_assert!(
            !self.arena.record(slot).status.is_active(),
            "freeing active slot {slot}"
        );
        let in_update = self.update.remove(slot);
        let in_group = self.groups.remove(slot).is_some();
        let in_render = self.render.remove(slot);
        debug_assert!(
            in_update && in_group && in_render,
            "slot {slot} was not linked into every view"
        );
        self.pending_rekeys.retain(|h| h.slot() != slot);
        if self.current.is_some_and(|h| h.slot() == slot) {
            self.current = None;
        }
        self.arena.free(slot);
    }

    /// Move an Active entity into the pending-removal state. Returns
    /// `Ok(false)` for an entity that already left `Active`.
    pub fn mark_removed(&mut self, handle: Handle, kind: RemovalKind) -> PoolResult<bool> {
        let record = self.record_mut(handle)?;
        if !record.status.is_active() {
            return Ok(false);
        }
        record.status = EntityStatus::PendingRemoval(kind);
        Ok(true)
    }

    /// Give an entity a fresh uid and move it to the tail of the update
    /// sequence. Slot, handle and every other field are kept.
    pub fn reset(&mut self, handle: Handle) -> PoolResult<Uid> {
        self.validate(handle)?;
        let uid = self.arena.take_uid()?;
        let slot = handle.slot();
        let record = self.arena.record_mut(slot);
        record.uid = uid;
        let layer = record.layer;
        self.update.requeue(slot);
        if self.rendering {
            self.pending_rekeys.push(handle);
        } else {
            self.render.rekey(slot, layer, uid);
        }
        Ok(uid)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn is_valid(&self, handle: Handle) -> bool {
        self.arena.contains(handle)
    }

    fn validate(&self, handle: Handle) -> PoolResult<()> {
        if self.arena.contains(handle) {
            Ok(())
        } else {
            debug!("Rejected stale handle {}", handle);
            Err(PoolError::InvalidHandle(handle))
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&EntityRecord> {
        self.arena.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut EntityRecord> {
        self.arena.get_mut(handle)
    }

    pub fn record(&self, handle: Handle) -> PoolResult<&EntityRecord> {
        self.validate(handle)?;
        Ok(self.arena.record(handle.slot()))
    }

    pub fn record_mut(&mut self, handle: Handle) -> PoolResult<&mut EntityRecord> {
        self.validate(handle)?;
        Ok(self.arena.record_mut(handle.slot()))
    }

    pub(crate) fn record_at(&self, slot: u32) -> &EntityRecord {
        self.arena.record(slot)
    }

    pub(crate) fn record_at_mut(&mut self, slot: u32) -> &mut EntityRecord {
        self.arena.record_mut(slot)
    }

    /// Handle of a linked slot. Every linked slot is occupied.
    pub(crate) fn handle_at(&self, slot: u32) -> Handle {
        match self.arena.handle_of(slot) {
            Some(h) => h,
            None => unreachable!("slot {slot} is linked but free"),
        }
    }

    // ------------------------------------------------------------------
    // Relocation
    // ------------------------------------------------------------------

    fn check_group(&self, group: i64) -> PoolResult<u16> {
        match u16::try_from(group) {
            Ok(g) if self.groups.is_valid_group(g) => Ok(g),
            _ => Err(PoolError::InvalidGroup {
                group,
                groups: self.groups.group_count(),
            }),
        }
    }

    /// Move an entity into another collision group, immediately.
    pub fn set_group(&mut self, handle: Handle, group: i64) -> PoolResult<()> {
        self.validate(handle)?;
        let group = self.check_group(group)?;
        let slot = handle.slot();
        let record = self.arena.record_mut(slot);
        if record.group == group {
            return Ok(());
        }
        record.group = group;
        self.groups.relocate(slot, group);
        debug_assert_eq!(self.groups.group_of(slot), Some(group));
        Ok(())
    }

    /// Change an entity's render layer. Outside a render traversal the
    /// entity is re-keyed at once; during one the write is queued and lands
    /// when the traversal ends.
    pub fn set_layer(&mut self, handle: Handle, layer: f64) -> PoolResult<()> {
        self.validate(handle)?;
        let slot = handle.slot();
        if self.rendering {
            self.arena.record_mut(slot).pending_layer = Some(layer);
            self.pending_rekeys.push(handle);
            return Ok(());
        }
        let record = self.arena.record_mut(slot);
        if record.layer.total_cmp(&layer).is_eq() {
            return Ok(());
        }
        record.layer = layer;
        let uid = record.uid;
        self.render.rekey(slot, layer, uid);
        Ok(())
    }

    pub(crate) fn begin_render(&mut self) {
        self.rendering = true;
    }

    /// Close a render traversal and apply the re-keys it queued.
    pub(crate) fn end_render(&mut self) {
        self.rendering = false;
        for handle in std::mem::take(&mut self.pending_rekeys) {
            let Some(record) = self.arena.get_mut(handle) else {
                continue;
            };
            if let Some(layer) = record.pending_layer.take() {
                record.layer = layer;
            }
            let (layer, uid) = (record.layer, record.uid);
            self.render.rekey(handle.slot(), layer, uid);
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    pub fn first(&self, traversal: Traversal) -> PoolResult<Option<Handle>> {
        let slot = match traversal {
            Traversal::Update => self.update.first(),
            Traversal::Group(g) => {
                let g = self.check_group(i64::from(g))?;
                self.groups.first(g)
            }
        };
        Ok(slot.map(|s| self.handle_at(s)))
    }

    /// Successor of `handle` in the chosen view. For a group traversal the
    /// entity must currently belong to that group.
    pub fn next(&self, traversal: Traversal, handle: Handle) -> PoolResult<Option<Handle>> {
        self.validate(handle)?;
        let slot = handle.slot();
        let next = match traversal {
            Traversal::Update => self.update.next(slot),
            Traversal::Group(g) => {
                let g = self.check_group(i64::from(g))?;
                if self.groups.group_of(slot) != Some(g) {
                    return Ok(None);
                }
                self.groups.next(slot)
            }
        };
        Ok(next.map(|s| self.handle_at(s)))
    }

    pub(crate) fn update_sequence(&self) -> &UpdateSequence {
        &self.update
    }

    pub(crate) fn collision_groups(&self) -> &CollisionGroupIndex {
        &self.groups
    }

    pub(crate) fn render_index(&self) -> &RenderOrder {
        &self.render
    }

    /// Fill `out` with the update sequence as it stands. Phases that hand
    /// control to the host walk this copy so reordering from a callback
    /// cannot derail them.
    pub(crate) fn snapshot_update(&self, out: &mut Vec<Handle>) {
        out.clear();
        out.extend(self.update.iter().map(|s| self.handle_at(s)));
    }

    /// Like [`EntityPool::snapshot_update`], pairing each handle with the uid
    /// it carries right now so a later `reset` can be told apart.
    pub(crate) fn snapshot_update_uids(&self, out: &mut Vec<(Handle, Uid)>) {
        out.clear();
        out.extend(self.update.iter().map(|s| {
            let handle = self.handle_at(s);
            (handle, self.arena.record(s).uid())
        }));
    }

    /// Visit every linked record in update order. No host code runs here.
    pub(crate) fn for_each_in_update(&mut self, mut f: impl FnMut(&mut EntityRecord)) {
        for slot in self.update.iter() {
            f(self.arena.record_mut(slot));
        }
    }

    /// Snapshot of the update sequence.
    pub fn update_order(&self) -> Vec<Handle> {
        self.update.iter().map(|s| self.handle_at(s)).collect()
    }

    /// Snapshot of one collision group, empty for an unknown group.
    pub fn group_members(&self, group: u16) -> Vec<Handle> {
        if !self.groups.is_valid_group(group) {
            return Vec::new();
        }
        self.groups.iter(group).map(|s| self.handle_at(s)).collect()
    }

    /// Snapshot of the render order.
    pub fn render_order(&self) -> Vec<Handle> {
        self.render.iter().map(|s| self.handle_at(s)).collect()
    }

    /// Handles of every entity still `Active`, in update order.
    pub fn active_handles(&self) -> Vec<Handle> {
        self.update
            .iter()
            .filter(|&s| self.arena.record(s).status.is_active())
            .map(|s| self.handle_at(s))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.update
            .iter()
            .filter(|&s| self.arena.record(s).status.is_active())
            .count()
    }

    // ------------------------------------------------------------------
    // Collision queries
    // ------------------------------------------------------------------

    /// On-demand single-pair test, independent of the batch collision pass.
    pub fn check_collision(&self, a: Handle, b: Handle, ignore_world_mask: bool) -> PoolResult<bool> {
        let ra = self.record(a)?;
        let rb = self.record(b)?;
        Ok(self.collides(ra, rb, ignore_world_mask))
    }

    pub(crate) fn collides(&self, a: &EntityRecord, b: &EntityRecord, ignore_world_mask: bool) -> bool {
        if !ignore_world_mask && !a.world_mask.overlaps(b.world_mask) {
            return false;
        }
        self.geometry.intersects(&a.shape_view(), &b.shape_view())
    }

    pub(crate) fn in_bounds(&self, record: &EntityRecord) -> bool {
        self.bounds.contains(record.kinematics.position)
    }

    // ------------------------------------------------------------------
    // Frame state
    // ------------------------------------------------------------------

    pub fn super_pause(&self) -> i32 {
        self.super_pause
    }

    pub fn set_super_pause(&mut self, frames: i32) {
        if frames > 0 && self.super_pause <= 0 {
            debug!("Super-pause engaged for {} frames", frames);
        } else if frames <= 0 && self.super_pause > 0 {
            debug!("Super-pause cleared");
        }
        self.super_pause = frames;
    }

    /// Decrement the counter once. Returns whether the frame is paused.
    pub(crate) fn tick_super_pause(&mut self) -> bool {
        let paused = self.super_pause > 0;
        if paused {
            self.super_pause -= 1;
            if self.super_pause == 0 {
                debug!("Super-pause ended");
            }
        }
        paused
    }

    pub fn active_worlds(&self) -> WorldMask {
        self.active_worlds
    }

    pub fn set_active_worlds(&mut self, worlds: WorldMask) {
        self.active_worlds = worlds;
    }

    /// The entity whose callback is running, if any.
    pub fn current(&self) -> Option<Handle> {
        self.current
    }

    pub(crate) fn set_current(&mut self, handle: Option<Handle>) {
        self.current = handle;
    }

    /// Phase currently being executed by the scheduler.
    pub fn phase(&self) -> Option<FramePhase> {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Option<FramePhase>) {
        self.phase = phase;
        self.current = None;
    }
}
