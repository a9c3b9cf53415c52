//! Pool configuration.
//!
//! Sizes the pool and describes the playfield. Values start at safe
//! defaults and are overridden by an INI file when one is loaded.
//!
//! # Configuration File Format
//!
//! ```ini
//! [pool]
//! capacity = 8192
//! groups = 16
//!
//! [bounds]
//! left = -224
//! right = 224
//! bottom = -256
//! top = 256
//!
//! [worlds]
//! active = 0xFFFFFFFF
//!
//! [collision]
//! pairs = 0:1, 0:2
//! ```

use configparser::ini::Ini;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::PathBuf;

use crate::components::handle::MAX_CAPACITY;
use crate::components::worldmask::WorldMask;

/// Default safe values for startup
const DEFAULT_CAPACITY: usize = 8192;
const DEFAULT_GROUPS: u16 = 16;
const DEFAULT_BOUND_LEFT: f64 = -224.0;
const DEFAULT_BOUND_RIGHT: f64 = 224.0;
const DEFAULT_BOUND_BOTTOM: f64 = -256.0;
const DEFAULT_BOUND_TOP: f64 = 256.0;
const DEFAULT_CONFIG_PATH: &str = "./pool.ini";

/// Group pairs tested by the scheduler's per-frame collision pass.
pub type CollisionPairs = SmallVec<[(u16, u16); 8]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of entity slots.
    pub capacity: usize,
    /// Number of collision groups.
    pub groups: u16,
    pub bound_left: f64,
    pub bound_right: f64,
    pub bound_bottom: f64,
    pub bound_top: f64,
    /// Worlds visited by the bounds check and the render traversal.
    pub active_worlds: WorldMask,
    pub collision_pairs: CollisionPairs,
    /// Path to the configuration file.
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            groups: DEFAULT_GROUPS,
            bound_left: DEFAULT_BOUND_LEFT,
            bound_right: DEFAULT_BOUND_RIGHT,
            bound_bottom: DEFAULT_BOUND_BOTTOM,
            bound_top: DEFAULT_BOUND_TOP,
            active_worlds: WorldMask::ALL,
            collision_pairs: CollisionPairs::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Slot count, clamped to `1..=MAX_CAPACITY` so every slot index fits
    /// in a handle.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = clamp_capacity(capacity);
        self
    }

    pub fn with_groups(mut self, groups: u16) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_bounds(mut self, left: f64, right: f64, bottom: f64, top: f64) -> Self {
        self.bound_left = left;
        self.bound_right = right;
        self.bound_bottom = bottom;
        self.bound_top = top;
        self
    }

    pub fn with_collision_pair(mut self, a: u16, b: u16) -> Self {
        self.collision_pairs.push((a, b));
        self
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config)?;
        info!(
            "Loaded pool config from {:?}: capacity={}, groups={}, pairs={:?}",
            self.config_path, self.capacity, self.groups, self.collision_pairs
        );
        Ok(())
    }

    /// Same as [`load_from_file`](Self::load_from_file) for in-memory text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), String> {
        // [pool] section
        if let Some(capacity) = config.getuint("pool", "capacity")? {
            check_capacity(usize::try_from(capacity).unwrap_or(usize::MAX))?;
            self.capacity = capacity as usize;
        }
        if let Some(groups) = config.getuint("pool", "groups")? {
            if groups == 0 || groups > u64::from(u16::MAX) {
                return Err(format!("pool.groups must be in 1..=65535, got {}", groups));
            }
            self.groups = groups as u16;
        }

        // [bounds] section
        if let Some(v) = config.getfloat("bounds", "left")? {
            self.bound_left = v;
        }
        if let Some(v) = config.getfloat("bounds", "right")? {
            self.bound_right = v;
        }
        if let Some(v) = config.getfloat("bounds", "bottom")? {
            self.bound_bottom = v;
        }
        if let Some(v) = config.getfloat("bounds", "top")? {
            self.bound_top = v;
        }

        // [worlds] section
        if let Some(raw) = config.get("worlds", "active") {
            self.active_worlds = WorldMask(parse_mask(&raw)?);
        }

        // [collision] section
        if let Some(raw) = config.get("collision", "pairs") {
            self.collision_pairs = parse_pairs(&raw)?;
        }

        for &(a, b) in &self.collision_pairs {
            if a >= self.groups || b >= self.groups {
                warn!(
                    "collision pair {}:{} refers to a group outside 0..{}",
                    a, b, self.groups
                );
            }
        }

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("pool", "capacity", Some(self.capacity.to_string()));
        config.set("pool", "groups", Some(self.groups.to_string()));

        config.set("bounds", "left", Some(self.bound_left.to_string()));
        config.set("bounds", "right", Some(self.bound_right.to_string()));
        config.set("bounds", "bottom", Some(self.bound_bottom.to_string()));
        config.set("bounds", "top", Some(self.bound_top.to_string()));

        config.set("worlds", "active", Some(format!("0x{:08X}", self.active_worlds.0)));

        let pairs = self
            .collision_pairs
            .iter()
            .map(|(a, b)| format!("{}:{}", a, b))
            .collect::<Vec<_>>()
            .join(", ");
        config.set("collision", "pairs", Some(pairs));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved pool config to {:?}", self.config_path);

        Ok(())
    }

    /// JSON form, for hosts that embed the pool settings in scene files.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| format!("Failed to parse config JSON: {e}"))?;
        check_capacity(config.capacity)?;
        if config.groups == 0 {
            return Err("groups must be at least 1".to_string());
        }
        Ok(config)
    }
}

fn check_capacity(capacity: usize) -> Result<(), String> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(format!(
            "pool.capacity must be in 1..={}, got {}",
            MAX_CAPACITY, capacity
        ));
    }
    Ok(())
}

/// Clamp a slot count into `1..=MAX_CAPACITY`, warning when it changes.
/// Slot indices past the limit would spill into a handle's generation bits.
pub fn clamp_capacity(capacity: usize) -> usize {
    let clamped = capacity.clamp(1, MAX_CAPACITY);
    if clamped != capacity {
        warn!(
            "Pool capacity {} out of range, using {}",
            capacity, clamped
        );
    }
    clamped
}

fn parse_mask(raw: &str) -> Result<u32, String> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    parsed.map_err(|e| format!("worlds.active: invalid mask '{}': {}", raw, e))
}

fn parse_pairs(raw: &str) -> Result<CollisionPairs, String> {
    let mut pairs = CollisionPairs::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (a, b) = item
            .split_once(':')
            .ok_or_else(|| format!("collision.pairs: expected 'a:b', got '{}'", item))?;
        let a = a
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("collision.pairs: bad group '{}': {}", a, e))?;
        let b = b
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("collision.pairs: bad group '{}': {}", b, e))?;
        pairs.push((a, b));
    }
    Ok(pairs)
}
