//! Lua runtime integration tests: class tables, the `pool` userdata and the
//! callbacks the Lua host forwards from the scheduler.

#![cfg(feature = "lua")]

use danmakupool::resources::lua_runtime::LuaRuntime;
use danmakupool::resources::pool::EntityPool;
use danmakupool::resources::poolconfig::PoolConfig;
use danmakupool::systems::scheduler::FrameScheduler;

const STAGE: &str = r#"
events = {}
hits = 0

Bullet = { group = 1, layer = 20, shape = engine.SHAPE_ELLIPSE, a = 2 }

function Bullet:init(pool, vx)
    pool:set(self, "vx", vx)
    table.insert(events, "init")
end

function Bullet:frame(pool)
    self.frames = (self.frames or 0) + 1
end

function Bullet:del(pool)
    table.insert(events, "del")
end

Player = { group = 0, layer = 10, a = 2, bound = false, ignore_super_pause = true }

function Player:colli(other, pool)
    hits = hits + 1
    pool:destroy(other)
end

function stage(pool, frame)
    if frame == 0 then
        player = pool:create(Player)
        bullet = pool:create(Bullet, 0.5)
    end
end
"#;

fn setup() -> (LuaRuntime, EntityPool, FrameScheduler) {
    let runtime = LuaRuntime::new().unwrap();
    let config = PoolConfig::new()
        .with_capacity(32)
        .with_groups(2)
        .with_collision_pair(0, 1);
    let scheduler = FrameScheduler::from_config(&config);
    (runtime, EntityPool::new(config), scheduler)
}

fn eval<T: mlua::FromLua>(runtime: &LuaRuntime, expr: &str) -> T {
    runtime
        .lua()
        .load(format!("return {}", expr))
        .eval::<T>()
        .unwrap()
}

#[test]
fn stage_creates_entities_and_collision_destroys_bullet() {
    let (runtime, mut pool, mut scheduler) = setup();
    runtime.run_source("stage", STAGE).unwrap();

    let stats = {
        let mut host = runtime.host();
        scheduler.step(&mut pool, &mut host)
    };

    assert_eq!(stats.collisions, 1);
    assert_eq!(stats.reaped, 1);
    assert_eq!(eval::<i64>(&runtime, "hits"), 1);
    assert_eq!(eval::<String>(&runtime, "table.concat(events, ',')"), "init,del");
    assert_eq!(eval::<i64>(&runtime, "bullet.frames"), 1);
    assert!(eval::<bool>(&runtime, "bullet.handle == nil"));
    assert!(eval::<bool>(&runtime, "player.handle ~= nil"));
    assert_eq!(runtime.binding_count(), 1);
    assert_eq!(pool.live_count(), 1);
}

#[test]
fn pool_userdata_exposes_properties_and_iteration() {
    let (runtime, mut pool, mut scheduler) = setup();
    runtime
        .run_source(
            "probe",
            r#"
            Dot = { group = 1, x = 3, y = 4, colli = false }
            result = {}
            function stage(pool, frame)
                if frame ~= 0 then return end
                local a = pool:create(Dot)
                local b = pool:create(Dot)
                result.x = pool:get(a, "x")
                result.first_is_a = pool:first(1) == a
                result.next_is_b = pool:next(1, a) == b
                result.count = pool:count()
                result.valid = pool:valid(a)
                result.bad_key = not pcall(function() pool:get(a, "nope") end)
                result.read_only = not pcall(function() pool:set(a, "uid", 1) end)
                pool:set(b, "group", 0)
                result.moved = pool:first(0) == b
                result.killed = pool:kill(a)
                result.killed_again = pool:kill(a)
                result.hit = pool:check(a, b)
                result.pause_before = pool:super_pause()
                pool:set_super_pause(3)
                result.pause_after = pool:super_pause()
            end
            "#,
        )
        .unwrap();

    let mut host = runtime.host();
    scheduler.step(&mut pool, &mut host);

    assert_eq!(eval::<f64>(&runtime, "result.x"), 3.0);
    for flag in [
        "first_is_a",
        "next_is_b",
        "valid",
        "bad_key",
        "read_only",
        "moved",
        "killed",
        "hit",
    ] {
        assert!(eval::<bool>(&runtime, &format!("result.{}", flag)), "{}", flag);
    }
    assert!(!eval::<bool>(&runtime, "result.killed_again"));
    assert_eq!(eval::<i64>(&runtime, "result.count"), 2);
    assert_eq!(eval::<i64>(&runtime, "result.pause_before"), 0);
    assert_eq!(eval::<i64>(&runtime, "result.pause_after"), 3);
    assert_eq!(pool.live_count(), 1);
}

#[test]
fn callback_errors_are_logged_and_do_not_abort_the_frame() {
    let (runtime, mut pool, mut scheduler) = setup();
    runtime
        .run_source(
            "faulty",
            r#"
            ticks = 0
            Broken = { group = 1, colli = false }
            function Broken:frame(pool) error("boom") end
            Fine = { group = 1, colli = false }
            function Fine:frame(pool) ticks = ticks + 1 end
            function stage(pool, frame)
                if frame == 0 then
                    pool:create(Broken)
                    pool:create(Fine)
                end
            end
            "#,
        )
        .unwrap();

    let mut host = runtime.host();
    let first = scheduler.step(&mut pool, &mut host);
    let second = scheduler.step(&mut pool, &mut host);
    assert_eq!(first.updated, 2);
    assert_eq!(second.updated, 2);
    assert_eq!(eval::<i64>(&runtime, "ticks"), 2);
}

#[test]
fn current_points_at_the_entity_being_initialised() {
    let (runtime, mut pool, mut scheduler) = setup();
    runtime
        .run_source(
            "current",
            r#"
            Probe = { colli = false }
            function Probe:init(pool)
                same = pool:current() == self
            end
            function stage(pool, frame)
                if frame == 0 then
                    outside = pool:current()
                    pool:create(Probe)
                end
            end
            "#,
        )
        .unwrap();

    let mut host = runtime.host();
    scheduler.step(&mut pool, &mut host);
    assert!(eval::<bool>(&runtime, "same"));
    assert!(eval::<bool>(&runtime, "outside == nil"));
}

#[test]
fn create_on_a_full_pool_raises_a_catchable_error() {
    let runtime = LuaRuntime::new().unwrap();
    let config = PoolConfig::new().with_capacity(1).with_groups(1);
    let mut scheduler = FrameScheduler::from_config(&config);
    let mut pool = EntityPool::new(config);
    runtime
        .run_source(
            "full",
            r#"
            Dot = { colli = false }
            function stage(pool, frame)
                if frame ~= 0 then return end
                first_ok = pcall(function() pool:create(Dot) end)
                local ok, err = pcall(function() pool:create(Dot) end)
                second_ok = ok
                message = tostring(err)
            end
            "#,
        )
        .unwrap();

    let mut host = runtime.host();
    scheduler.step(&mut pool, &mut host);

    assert!(eval::<bool>(&runtime, "first_ok"));
    assert!(!eval::<bool>(&runtime, "second_ok"));
    assert!(eval::<String>(&runtime, "message").contains("exhausted"));
    assert_eq!(runtime.binding_count(), 1);
    assert_eq!(pool.live_count(), 1);
}

#[test]
fn motion_helpers_are_reachable_from_lua() {
    let (runtime, mut pool, mut scheduler) = setup();
    runtime
        .run_source(
            "motion",
            r#"
            Shot = { group = 1, vx = 3, vy = 4, colli = false }
            function stage(pool, frame)
                if frame ~= 0 then return end
                shot = pool:create(Shot)
                pool:set_speed(shot, 10)
                fast_vx = pool:get(shot, "vx")
                pool:aim(shot, 2, 0)
                aimed_vx = pool:get(shot, "vx")
                pool:warp(shot, 7, 8)
            end
            "#,
        )
        .unwrap();

    let mut host = runtime.host();
    scheduler.step(&mut pool, &mut host);

    assert_eq!(eval::<f64>(&runtime, "fast_vx"), 6.0);
    assert_eq!(eval::<f64>(&runtime, "aimed_vx"), 2.0);
    // Warped to (7, 8) before Update, then moved by (2, 0).
    let shot = pool.update_order()[0];
    let k = pool.record(shot).unwrap().kinematics;
    assert_eq!((k.position.x, k.position.y), (9.0, 8.0));
    assert_eq!(k.delta.x, 2.0);
}
