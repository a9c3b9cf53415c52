//! Danmaku pool demo entry point.
//!
//! A headless driver for the entity pool using:
//! - **clap** for the command line
//! - **configparser** for the `pool.ini` configuration
//! - **mlua + LuaJIT** for optional stage scripts
//!
//! Without `--script` a built-in stage fires seeded rings of bullets at a
//! drifting player. With `--script` the stage comes from a Lua file that
//! defines a global `stage(pool, frame)` function and entity class tables.
//!
//! # Main Loop
//!
//! 1. Load the pool configuration (defaults when the file is missing)
//! 2. Build the pool and the frame scheduler
//! 3. For each frame: `step` (update, bounds, collision, integrate, reap)
//!    then `render`
//! 4. Log per-second statistics
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 600 --seed 7
//! cargo run --release -- --script scripts/stage1.lua
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{debug, error, info, warn};

use danmakupool::bridge::ScriptBridge;
use danmakupool::bridge::host::ScriptHost;
use danmakupool::components::class::ClassDescriptor;
use danmakupool::components::collider::Collider;
use danmakupool::components::entity::{AttachmentId, ScriptRef};
use danmakupool::components::handle::Handle;
use danmakupool::components::property::PropertyKey;
use danmakupool::components::status::RemovalKind;
use danmakupool::resources::pool::EntityPool;
use danmakupool::resources::poolconfig::PoolConfig;
use danmakupool::systems::scheduler::{FrameScheduler, FrameStats};

#[cfg(feature = "lua")]
use danmakupool::luarc_generator;
#[cfg(feature = "lua")]
use danmakupool::resources::lua_runtime::LuaRuntime;
#[cfg(feature = "lua")]
use danmakupool::stub_generator;

const PLAYER_GROUP: u16 = 0;
const BULLET_GROUP: u16 = 1;
const FRAMES_PER_SECOND: u64 = 60;

/// Danmaku entity pool demo
#[derive(Parser)]
#[command(version, about = "Headless bullet-hell entity pool driver")]
struct Cli {
    /// Pool configuration file.
    #[arg(long, value_name = "PATH", default_value = "pool.ini")]
    config: PathBuf,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed for the built-in stage.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Lua stage script to run instead of the built-in stage.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Write the effective configuration back to `--config` and exit.
    #[arg(long)]
    write_config: bool,

    /// Generate Lua LSP stubs from pool metadata and exit.
    /// Optionally provide a path (default: scripts/danmakupool.lua).
    #[arg(long, value_name = "PATH")]
    create_lua_stubs: Option<Option<PathBuf>>,

    /// Generate .luarc.json for Lua Language Server and exit.
    /// Optionally provide a path (default: scripts/.luarc.json).
    #[arg(long, value_name = "PATH")]
    create_luarc: Option<Option<PathBuf>>,
}

/// Built-in stage: one player drifting along the bottom, rings of bullets
/// from the top. A hit freezes everything but the player for half a second.
struct DemoHost {
    rng: fastrand::Rng,
    player: Option<Handle>,
    hits: u64,
    drawn: u64,
}

impl DemoHost {
    fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            player: None,
            hits: 0,
            drawn: 0,
        }
    }

    fn spawn_player(&mut self, pool: &mut EntityPool) {
        let class = ClassDescriptor::new()
            .with_group(PLAYER_GROUP)
            .with_layer(10.0)
            .with_position(0.0, -200.0)
            .with_velocity(1.5, 0.0)
            .with_collider(Collider::circle(2.0))
            .with_bound(false)
            .ignoring_super_pause();
        let created = ScriptBridge::new(pool, self).create(&class);
        match created {
            Ok(handle) => self.player = Some(handle),
            Err(e) => error!("failed to spawn player: {}", e),
        }
    }

    fn spawn_ring(&mut self, pool: &mut EntityPool, frame: u64) {
        let count = 12 + self.rng.usize(0..12);
        let phase = self.rng.f64() * std::f64::consts::TAU;
        let speed = 1.0 + self.rng.f64() * 2.0;
        let x = self.rng.f64() * 200.0 - 100.0;
        let mut bridge = ScriptBridge::new(pool, self);
        for i in 0..count {
            let angle = phase + i as f64 * std::f64::consts::TAU / count as f64;
            let class = ClassDescriptor::new()
                .with_group(BULLET_GROUP)
                .with_layer(50.0 + (i % 3) as f64)
                .with_position(x, 180.0)
                .with_velocity(angle.cos() * speed, angle.sin() * speed)
                .with_collider(Collider::circle(4.0));
            if let Err(e) = bridge.create(&class) {
                warn!("frame {}: ring cut short: {}", frame, e);
                break;
            }
        }
    }
}

impl ScriptHost for DemoHost {
    fn on_frame_begin(&mut self, pool: &mut EntityPool) {
        let frame = pool.frame();
        if self.player.is_none() {
            self.spawn_player(pool);
        }
        if frame % 20 == 0 {
            self.spawn_ring(pool, frame);
        }
    }

    fn on_update(&mut self, pool: &mut EntityPool, entity: Handle) {
        if Some(entity) != self.player {
            return;
        }
        // Bounce between the side walls.
        let mut bridge = ScriptBridge::new(pool, self);
        let read = |bridge: &ScriptBridge, key| {
            bridge.get(entity, key).ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        let x = read(&bridge, PropertyKey::X);
        let vx = read(&bridge, PropertyKey::Vx);
        if x.abs() > 180.0 && x * vx > 0.0 {
            let _ = bridge.set(entity, PropertyKey::Vx, (-vx).into());
        }
    }

    fn on_collision(&mut self, pool: &mut EntityPool, _a: Handle, b: Handle) {
        self.hits += 1;
        let mut bridge = ScriptBridge::new(pool, self);
        let _ = bridge.destroy(b);
        bridge.set_super_pause(30);
    }

    fn on_render(&mut self, _pool: &mut EntityPool, _entity: Handle) {
        self.drawn += 1;
    }

    fn on_reap(&mut self, entity: Handle, _binding: Option<ScriptRef>, _attachment: Option<AttachmentId>) {
        if Some(entity) == self.player {
            self.player = None;
        }
    }

    fn on_removed(&mut self, _pool: &mut EntityPool, entity: Handle, kind: RemovalKind) {
        debug!("{} removed ({:?})", entity, kind);
    }
}

fn report(stats: &FrameStats, pool: &EntityPool) {
    if stats.frame % FRAMES_PER_SECOND == 0 {
        info!(
            "frame {:>5}: live={} free={} updated={} left={} hits={} reaped={}{}",
            stats.frame,
            pool.live_count(),
            pool.free_count(),
            stats.updated,
            stats.left_bounds,
            stats.collisions,
            stats.reaped,
            if stats.paused { " [super-pause]" } else { "" }
        );
    }
}

fn run(pool: &mut EntityPool, scheduler: &mut FrameScheduler, host: &mut dyn ScriptHost, frames: u64) {
    for _ in 0..frames {
        let stats = scheduler.step(pool, host);
        scheduler.render(pool, host);
        report(&stats, pool);
    }
}

#[cfg(feature = "lua")]
fn run_script(
    path: &std::path::Path,
    pool: &mut EntityPool,
    scheduler: &mut FrameScheduler,
    frames: u64,
) -> Result<(), String> {
    let runtime = LuaRuntime::new().map_err(|e| format!("Failed to create Lua runtime: {e}"))?;
    runtime
        .run_script(&path.to_string_lossy())
        .map_err(|e| format!("Failed to load {}: {e}", path.display()))?;
    let mut host = runtime.host();
    run(pool, scheduler, &mut host, frames);
    info!("Lua bindings still held: {}", runtime.binding_count());
    Ok(())
}

#[cfg(not(feature = "lua"))]
fn run_script(
    path: &std::path::Path,
    _pool: &mut EntityPool,
    _scheduler: &mut FrameScheduler,
    _frames: u64,
) -> Result<(), String> {
    Err(format!(
        "cannot run {}: built without the `lua` feature",
        path.display()
    ))
}

/// Handle `--create-lua-stubs` / `--create-luarc` and exit on failure.
#[cfg(feature = "lua")]
fn write_tooling(cli: &Cli) {
    if let Some(maybe_path) = &cli.create_lua_stubs {
        let path = maybe_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("scripts/danmakupool.lua"));
        let runtime =
            LuaRuntime::new().expect("Failed to create Lua runtime for stub generation");
        match stub_generator::generate_stubs(&runtime) {
            Ok(content) => {
                if let Err(e) = stub_generator::write_stubs(&path, &content) {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
                println!("Lua stubs written to {}", path.display());
            }
            Err(e) => {
                eprintln!("Error generating stubs: {e}");
                std::process::exit(1);
            }
        }
    }

    if let Some(maybe_path) = &cli.create_luarc {
        let path = maybe_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("scripts/.luarc.json"));
        let runtime =
            LuaRuntime::new().expect("Failed to create Lua runtime for .luarc.json generation");
        match luarc_generator::generate_luarc(&runtime, "danmakupool.lua") {
            Ok(content) => {
                if let Err(e) = luarc_generator::write_luarc(&path, &content) {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
                println!(".luarc.json written to {}", path.display());
            }
            Err(e) => {
                eprintln!("Error generating .luarc.json: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(not(feature = "lua"))]
fn write_tooling(_cli: &Cli) {
    eprintln!("Error: built without the `lua` feature");
    std::process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: editor tooling needs no pool
    if cli.create_lua_stubs.is_some() || cli.create_luarc.is_some() {
        write_tooling(&cli);
        return;
    }

    let mut config = PoolConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    if config.collision_pairs.is_empty() {
        config.collision_pairs.push((PLAYER_GROUP, BULLET_GROUP));
    }

    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let mut scheduler = FrameScheduler::from_config(&config);
    let mut pool = EntityPool::new(config);
    info!(
        "pool ready: capacity={} groups={} pairs={:?}",
        pool.capacity(),
        pool.group_count(),
        scheduler.collision_pairs()
    );

    match &cli.script {
        Some(path) => {
            if let Err(e) = run_script(path, &mut pool, &mut scheduler, cli.frames) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            let mut host = DemoHost::new(cli.seed);
            run(&mut pool, &mut scheduler, &mut host, cli.frames);
            info!("player hits: {}, draw calls: {}", host.hits, host.drawn);
        }
    }

    info!(
        "done after {} frames: {} live, next uid {}",
        pool.frame(),
        pool.live_count(),
        pool.next_uid()
    );
}
