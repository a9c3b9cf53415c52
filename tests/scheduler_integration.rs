//! Frame scheduler integration tests: slot reuse, uid ordering, deferred
//! removal, super-pause, collision passes and render ordering.

use danmakupool::bridge::ScriptBridge;
use danmakupool::bridge::host::{NullHost, ScriptHost};
use danmakupool::components::class::ClassDescriptor;
use danmakupool::components::collider::Collider;
use danmakupool::components::entity::{AttachmentId, ScriptRef};
use danmakupool::components::handle::Handle;
use danmakupool::components::property::PropertyKey;
use danmakupool::components::status::RemovalKind;
use danmakupool::error::PoolError;
use danmakupool::resources::pool::EntityPool;
use danmakupool::resources::poolconfig::PoolConfig;
use danmakupool::systems::scheduler::FrameScheduler;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn make_pool(capacity: usize) -> EntityPool {
    EntityPool::new(PoolConfig::new().with_capacity(capacity).with_groups(4))
}

fn ball(group: u16, x: f64) -> ClassDescriptor {
    ClassDescriptor::new()
        .with_group(group)
        .with_position(x, 0.0)
        .with_collider(Collider::circle(2.0))
}

/// Host that records every callback it receives.
#[derive(Default)]
struct RecordingHost {
    updated: Vec<Handle>,
    collisions: Vec<(Handle, Handle)>,
    left: Vec<Handle>,
    rendered: Vec<Handle>,
    reaped: Vec<Handle>,
    /// Entities destroyed from inside their own update callback.
    destroy_on_update: Vec<Handle>,
}

impl ScriptHost for RecordingHost {
    fn on_update(&mut self, pool: &mut EntityPool, entity: Handle) {
        self.updated.push(entity);
        if self.destroy_on_update.contains(&entity) {
            pool.mark_removed(entity, RemovalKind::Dead).unwrap();
        }
    }

    fn on_leave_bounds(&mut self, _pool: &mut EntityPool, entity: Handle) {
        self.left.push(entity);
    }

    fn on_collision(&mut self, _pool: &mut EntityPool, a: Handle, b: Handle) {
        self.collisions.push((a, b));
    }

    fn on_render(&mut self, _pool: &mut EntityPool, entity: Handle) {
        self.rendered.push(entity);
    }

    fn on_reap(&mut self, entity: Handle, _binding: Option<ScriptRef>, _attachment: Option<AttachmentId>) {
        self.reaped.push(entity);
    }
}

#[test]
fn freed_slots_are_reused_only_after_reap() {
    let mut pool = make_pool(3);
    let mut scheduler = FrameScheduler::default();
    let mut host = NullHost;

    let handles: Vec<Handle> = (0..3).map(|i| pool.allocate(&ball(0, i as f64)).unwrap()).collect();
    assert!(matches!(
        pool.allocate(&ball(0, 0.0)),
        Err(PoolError::PoolExhausted { capacity: 3 })
    ));

    ScriptBridge::new(&mut pool, &mut host).destroy(handles[1]).unwrap();
    // Still linked until the reap phase.
    assert!(pool.allocate(&ball(0, 0.0)).is_err());
    assert!(pool.is_valid(handles[1]));

    scheduler.step(&mut pool, &mut host);
    assert!(!pool.is_valid(handles[1]));
    assert_eq!(pool.free_count(), 1);

    let reused = pool.allocate(&ball(0, 0.0)).unwrap();
    assert_eq!(reused.slot(), handles[1].slot());
    assert_ne!(reused, handles[1]);
    assert!(pool.get(handles[1]).is_none());
}

#[test]
fn uids_keep_increasing_across_slot_churn() {
    let mut pool = make_pool(4);
    let mut scheduler = FrameScheduler::default();
    let mut host = NullHost;

    let mut last_uid = 0;
    for _ in 0..50 {
        let h = pool.allocate(&ball(0, 0.0)).unwrap();
        let uid = pool.record(h).unwrap().uid();
        assert!(uid > last_uid, "uid {} not above {}", uid, last_uid);
        last_uid = uid;
        ScriptBridge::new(&mut pool, &mut host).destroy(h).unwrap();
        scheduler.step(&mut pool, &mut host);
    }
    assert_eq!(pool.live_count(), 0);
    assert!(pool.next_uid() > last_uid);
}

#[test]
fn reaping_a_middle_entity_keeps_relative_order() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let mut host = RecordingHost::default();

    let a = pool.allocate(&ball(0, 0.0)).unwrap();
    let b = pool.allocate(&ball(0, 1.0)).unwrap();
    let c = pool.allocate(&ball(0, 2.0)).unwrap();
    let uid_c = pool.record(c).unwrap().uid();
    let free_before = pool.free_count();

    ScriptBridge::new(&mut pool, &mut host).destroy(b).unwrap();
    scheduler.step(&mut pool, &mut host);

    assert_eq!(pool.update_order(), vec![a, c]);
    assert_eq!(pool.group_members(0), vec![a, c]);
    assert_eq!(pool.free_count(), free_before + 1);
    assert_eq!(host.reaped, vec![b]);
    assert!(!pool.is_valid(b));

    let d = pool.allocate(&ball(0, 3.0)).unwrap();
    assert!(pool.record(d).unwrap().uid() > uid_c);
    assert_eq!(pool.update_order(), vec![a, c, d]);
}

#[test]
fn regrouping_moves_entity_to_tail_of_new_group() {
    let mut pool = make_pool(8);
    let mut host = NullHost;
    let a = pool.allocate(&ball(0, 0.0)).unwrap();
    let b = pool.allocate(&ball(2, 0.0)).unwrap();

    let mut bridge = ScriptBridge::new(&mut pool, &mut host);
    bridge.set_property(a, "group", 2i64.into()).unwrap();
    assert_eq!(bridge.get(a, PropertyKey::Group).unwrap().as_i64(), Some(2));
    assert!(matches!(
        bridge.set_property(a, "group", 9i64.into()),
        Err(PoolError::InvalidGroup { group: 9, .. })
    ));

    assert!(pool.group_members(0).is_empty());
    assert_eq!(pool.group_members(2), vec![b, a]);
}

#[test]
fn super_pause_freezes_all_but_ignoring_entities() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let mut host = NullHost;

    let frozen = pool
        .allocate(&ball(0, 0.0).with_velocity(1.0, 0.0))
        .unwrap();
    let free = pool
        .allocate(&ball(0, 0.0).with_velocity(1.0, 0.0).ignoring_super_pause())
        .unwrap();

    pool.set_super_pause(2);
    let first = scheduler.step(&mut pool, &mut host);
    let second = scheduler.step(&mut pool, &mut host);
    assert!(first.paused && second.paused);
    assert_eq!(first.updated, 1);
    assert_eq!(pool.super_pause(), 0);

    let x = |pool: &EntityPool, h| pool.record(h).unwrap().kinematics.position.x;
    assert!(approx_eq(x(&pool, frozen), 0.0));
    assert!(approx_eq(x(&pool, free), 2.0));
    assert_eq!(pool.record(frozen).unwrap().timer, 0);
    // Reap runs regardless of super-pause.
    assert_eq!(pool.record(frozen).unwrap().frames_alive, 2);

    let third = scheduler.step(&mut pool, &mut host);
    assert!(!third.paused);
    assert_eq!(third.updated, 2);
    assert!(approx_eq(x(&pool, frozen), 1.0));
    assert!(approx_eq(x(&pool, free), 3.0));
}

#[test]
fn entity_destroyed_during_update_still_collides_that_frame() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::new(Default::default());
    scheduler.add_collision_pair(0, 1);

    let player = pool.allocate(&ball(0, 0.0)).unwrap();
    let bullet = pool.allocate(&ball(1, 1.0)).unwrap();

    let mut host = RecordingHost {
        destroy_on_update: vec![bullet],
        ..RecordingHost::default()
    };
    let stats = scheduler.step(&mut pool, &mut host);
    assert_eq!(stats.collisions, 1);
    assert_eq!(host.collisions, vec![(player, bullet)]);
    assert_eq!(stats.reaped, 1);
    assert!(!pool.is_valid(bullet));

    host.collisions.clear();
    let stats = scheduler.step(&mut pool, &mut host);
    assert_eq!(stats.collisions, 0);
    assert!(host.collisions.is_empty());
}

#[test]
fn self_pair_reports_each_overlap_in_both_orders() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::new(Default::default());
    scheduler.add_collision_pair(3, 3);

    let a = pool.allocate(&ball(3, 0.0)).unwrap();
    let b = pool.allocate(&ball(3, 1.0)).unwrap();
    let _far = pool.allocate(&ball(3, 100.0)).unwrap();

    let mut host = RecordingHost::default();
    let stats = scheduler.step(&mut pool, &mut host);
    assert_eq!(stats.collisions, 2);
    assert_eq!(host.collisions, vec![(a, b), (b, a)]);
}

#[test]
fn leaving_the_playfield_marks_dead_and_reaps() {
    let mut pool = EntityPool::new(
        PoolConfig::new()
            .with_capacity(8)
            .with_bounds(-10.0, 10.0, -10.0, 10.0),
    );
    let mut scheduler = FrameScheduler::default();
    let mut host = RecordingHost::default();

    let runner = pool
        .allocate(&ball(0, 9.5).with_velocity(1.0, 0.0))
        .unwrap();
    let pinned = pool
        .allocate(&ball(0, 50.0).with_bound(false))
        .unwrap();

    let stats = scheduler.step(&mut pool, &mut host);
    assert_eq!(stats.left_bounds, 1);
    assert_eq!(host.left, vec![runner]);
    assert_eq!(host.reaped, vec![runner]);
    assert!(pool.is_valid(pinned));
}

#[test]
fn entities_created_during_update_wait_for_next_frame() {
    struct Spawner {
        spawned: Option<Handle>,
        seen: Vec<Handle>,
    }

    impl ScriptHost for Spawner {
        fn on_update(&mut self, pool: &mut EntityPool, entity: Handle) {
            self.seen.push(entity);
            if self.spawned.is_none() {
                self.spawned = Some(pool.allocate(&ball(0, 0.0)).unwrap());
            }
        }
    }

    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let parent = pool.allocate(&ball(0, 0.0)).unwrap();
    let mut host = Spawner {
        spawned: None,
        seen: Vec::new(),
    };

    scheduler.step(&mut pool, &mut host);
    assert_eq!(host.seen, vec![parent]);

    host.seen.clear();
    scheduler.step(&mut pool, &mut host);
    assert_eq!(host.seen, vec![parent, host.spawned.unwrap()]);
}

/// Host whose update callback resets or removes another entity.
#[derive(Default)]
struct Meddler {
    seen: Vec<Handle>,
    reset_on_update: Vec<(Handle, Handle)>,
    kill_on_update: Vec<(Handle, Handle)>,
}

impl ScriptHost for Meddler {
    fn on_update(&mut self, pool: &mut EntityPool, entity: Handle) {
        self.seen.push(entity);
        for &(trigger, target) in &self.reset_on_update {
            if trigger == entity {
                pool.reset(target).unwrap();
            }
        }
        for &(trigger, target) in &self.kill_on_update {
            if trigger == entity {
                pool.mark_removed(target, RemovalKind::Dead).unwrap();
            }
        }
    }
}

#[test]
fn entity_reset_before_its_turn_is_updated_once_at_the_tail() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let a = pool.allocate(&ball(0, 0.0)).unwrap();
    let b = pool.allocate(&ball(0, 0.0).with_velocity(1.0, 0.0)).unwrap();
    let c = pool.allocate(&ball(0, 0.0)).unwrap();

    // `a` resets `b` before its turn; `c` resets `a` after it ran.
    let mut host = Meddler {
        reset_on_update: vec![(a, b), (c, a)],
        ..Meddler::default()
    };
    let stats = scheduler.step(&mut pool, &mut host);

    assert_eq!(host.seen, vec![a, c, b]);
    assert_eq!(stats.updated, 3);
    let record = pool.record(b).unwrap();
    assert_eq!(record.timer, 1);
    assert!(approx_eq(record.kinematics.position.x, 1.0));
    assert_eq!(pool.record(a).unwrap().timer, 1);
    assert_eq!(pool.update_order(), vec![c, b, a]);
}

#[test]
fn entity_marked_dead_mid_update_still_moves_that_frame() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::new(Default::default());
    scheduler.add_collision_pair(0, 1);
    let shooter = pool.allocate(&ball(0, 0.0)).unwrap();
    let bullet = pool
        .allocate(&ball(1, 10.0).with_velocity(-7.0, 0.0))
        .unwrap();

    let mut host = Meddler {
        kill_on_update: vec![(shooter, bullet)],
        ..Meddler::default()
    };
    let stats = scheduler.step(&mut pool, &mut host);

    assert_eq!(host.seen, vec![shooter, bullet]);
    assert_eq!(stats.updated, 2);
    // Moved from 10 to 3, into reach of the shooter, before being reaped.
    assert_eq!(stats.collisions, 1);
    assert_eq!(stats.reaped, 1);
}

#[test]
fn lowered_layer_renders_before_remaining_entities() {
    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let mut host = RecordingHost::default();

    let a = pool.allocate(&ball(0, 0.0).with_layer(5.0)).unwrap();
    let b = pool.allocate(&ball(0, 0.0).with_layer(5.0)).unwrap();
    let e = pool.allocate(&ball(0, 0.0).with_layer(5.0)).unwrap();
    let _hidden = pool.allocate(&ball(0, 0.0).with_layer(0.0).hidden()).unwrap();

    ScriptBridge::new(&mut pool, &mut host)
        .set_property(e, "layer", 1.0.into())
        .unwrap();

    let drawn = scheduler.render(&mut pool, &mut host);
    assert_eq!(drawn, 3);
    assert_eq!(host.rendered, vec![e, a, b]);
}

#[test]
fn layer_written_during_render_applies_afterwards() {
    struct Sinker {
        visited: Vec<Handle>,
    }

    impl ScriptHost for Sinker {
        fn on_render(&mut self, pool: &mut EntityPool, entity: Handle) {
            self.visited.push(entity);
            // Moving to the back would revisit it if applied immediately.
            pool.set_layer(entity, 100.0).unwrap();
        }
    }

    let mut pool = make_pool(8);
    let mut scheduler = FrameScheduler::default();
    let a = pool.allocate(&ball(0, 0.0).with_layer(1.0)).unwrap();
    let b = pool.allocate(&ball(0, 0.0).with_layer(2.0)).unwrap();

    let mut host = Sinker { visited: Vec::new() };
    assert_eq!(scheduler.render(&mut pool, &mut host), 2);
    assert_eq!(host.visited, vec![a, b]);
    assert!(approx_eq(pool.record(a).unwrap().layer(), 100.0));
    assert_eq!(pool.render_order(), vec![a, b]);
}
