//! Engine configuration.
//!
//! Simulation, timing and entity tunables for a headless session. Loaded
//! from TOML; any missing key falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use arcane_common::{ArcaneError, ArcaneResult, Viewport};
use arcane_gameplay::{CombatConfig, EnemyConfig, PlayerConfig, WeaponConfig};
use arcane_kernel::animation::AnimationConfig;
use arcane_kernel::spatial_grid::DEFAULT_CELL_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "arcane.toml";

/// Environment variable overriding the config path.
const CONFIG_ENV: &str = "ARCANE_CONFIG";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Simulation ===
    /// Logical viewport width in pixels
    pub viewport_width: f32,
    /// Logical viewport height in pixels
    pub viewport_height: f32,
    /// Fixed simulation ticks per second
    pub tick_rate: u32,
    /// Ticks to run in a headless session
    pub ticks: u64,
    /// Projectile grid cell size in pixels
    pub cell_size: f32,
    /// Seed for every random stream
    pub seed: u64,
    /// Enemies spawned at session start
    pub enemy_count: u32,
    /// Seconds between stats log lines
    pub stats_interval: f32,

    // === Animation ===
    /// Milliseconds between animation steps
    pub cadence_ms: f32,
    /// Horizontal wins when `|x| > direction_ratio * |y|`
    pub direction_ratio: f32,

    // === Entities ===
    /// Player tunables
    pub player: PlayerConfig,
    /// Equipped weapon
    pub weapon: WeaponConfig,
    /// Enemy tunables
    pub enemy: EnemyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let animation = AnimationConfig::default();
        Self {
            viewport_width: 1280.0,
            viewport_height: 960.0,
            tick_rate: 120,
            ticks: 120 * 30,
            cell_size: DEFAULT_CELL_SIZE,
            seed: 0x00C0_FFEE,
            enemy_count: 6,
            stats_interval: 1.0,
            cadence_ms: animation.cadence * 1000.0,
            direction_ratio: animation.direction_ratio,
            player: PlayerConfig::default(),
            weapon: WeaponConfig::default(),
            enemy: EnemyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file is missing or invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Reads and parses a config file, failing on any error.
    pub fn read<P: AsRef<Path>>(path: P) -> ArcaneResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses TOML text.
    pub fn parse(contents: &str) -> ArcaneResult<Self> {
        toml::from_str(contents).map_err(|e| ArcaneError::Config(e.to_string()))
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ArcaneResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ArcaneError::Config(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Config file path: `ARCANE_CONFIG` if set, else `arcane.toml`.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.viewport_width = self.viewport_width.clamp(320.0, 7680.0);
        self.viewport_height = self.viewport_height.clamp(240.0, 4320.0);
        self.tick_rate = self.tick_rate.clamp(30, 480);
        self.ticks = self.ticks.max(1);
        self.cell_size = self.cell_size.clamp(8.0, 1024.0);
        self.enemy_count = self.enemy_count.min(256);
        self.stats_interval = self.stats_interval.max(0.1);

        self.cadence_ms = self.cadence_ms.clamp(10.0, 2000.0);
        self.direction_ratio = self.direction_ratio.clamp(0.1, 4.0);

        self.weapon.cooldown = self.weapon.cooldown.max(0.01);
        self.weapon.projectile.speed = self.weapon.projectile.speed.max(0.0);
        self.player.mana_regen_rate = self.player.mana_regen_rate.max(0.0);
    }

    /// Playfield bounds.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Combat tunables assembled from the flat settings.
    #[must_use]
    pub fn combat(&self) -> CombatConfig {
        CombatConfig {
            animation: AnimationConfig {
                cadence: self.cadence_ms / 1000.0,
                direction_ratio: self.direction_ratio,
            },
            player: self.player,
            weapons: vec![self.weapon],
            enemy: self.enemy,
            ..CombatConfig::default()
        }
    }
}
