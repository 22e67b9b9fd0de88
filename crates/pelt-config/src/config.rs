//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shell generation settings.
    pub fur: FurConfig,
    /// Procedural wind settings.
    pub wind: WindConfig,
    /// Distance-based shell count tiers.
    pub lod: LodConfig,
    /// Instancing and shared-material batching.
    pub batching: BatchingConfig,
    /// Frame-time profiler overlay.
    pub profiler: ProfilerConfig,
    /// UI selection speed control.
    pub ui: UiConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How shell materials are allocated when a shell set is built.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShellAllocation {
    /// One fresh material copy per shell per rebuild.
    #[default]
    PerShell,
    /// Every shell references the base material; per-shell values live in
    /// each renderer's override block.
    SharedWithOverrides,
}

/// Shell generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FurConfig {
    /// Number of shells, clamped to `[4, 64]` on validation.
    pub shell_count: u32,
    /// Fur length in `[0.0, 1.0]`.
    pub fur_length: f32,
    /// Gravity droop in `[0.0, 1.0]`.
    pub gravity: f32,
    /// Material allocation strategy.
    pub allocation: ShellAllocation,
}

/// Procedural wind configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindConfig {
    /// Push a wind vector every tick.
    pub enabled: bool,
    /// Wind direction; normalized before use.
    pub direction: [f32; 3],
    /// Peak wind magnitude.
    pub strength: f32,
    /// Oscillation frequency in radians per second.
    pub frequency: f32,
}

/// Level-of-detail configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Run the LOD controller at all.
    pub enabled: bool,
    /// Upper bound (inclusive) of the Near tier, in world units.
    pub near_dist: f32,
    /// Upper bound (inclusive) of the Mid tier.
    pub mid_dist: f32,
    /// Upper bound (inclusive) of the Far tier.
    pub far_dist: f32,
    /// Shell count for the Near tier, `[1, 64]`.
    pub near_shells: u32,
    /// Shell count for the Mid tier.
    pub mid_shells: u32,
    /// Shell count for the Far tier.
    pub far_shells: u32,
    /// Shell count beyond `far_dist`.
    pub very_far_shells: u32,
    /// Write `_UsePhysics = 0` when the viewer is beyond `mid_dist`.
    pub disable_physics_beyond_mid: bool,
    /// Fractional deadband around tier thresholds. 0 disables it.
    pub hysteresis: f32,
}

/// Batching configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchingConfig {
    /// Set the hardware-instancing flag on every discovered material.
    pub enable_instancing: bool,
    /// Collapse shells onto the shared base material. Requires
    /// [`ShellAllocation::SharedWithOverrides`].
    pub convert_to_shared_material: bool,
}

/// Profiler overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Number of frame-time samples kept.
    pub window: usize,
    /// Log the overlay text periodically.
    pub show_overlay: bool,
}

/// UI speed control configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Shader float property written by the control.
    pub speed_property_name: String,
    /// Speed written on selection.
    pub speed_on_select: f32,
    /// Speed written on deselection (0 stops the effect).
    pub speed_on_deselect: f32,
    /// Speed when a toggle is on.
    pub toggle_on_speed: f32,
    /// Speed when a toggle is off.
    pub toggle_off_speed: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Frames the demo loop runs before exiting.
    pub demo_frames: u32,
}

// --- Default implementations ---

impl Default for FurConfig {
    fn default() -> Self {
        Self {
            shell_count: 32,
            fur_length: 0.30,
            gravity: 0.20,
            allocation: ShellAllocation::PerShell,
        }
    }
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: [0.5, 0.0, 1.0],
            strength: 0.7,
            frequency: 2.0,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            near_dist: 8.0,
            mid_dist: 16.0,
            far_dist: 30.0,
            near_shells: 40,
            mid_shells: 16,
            far_shells: 8,
            very_far_shells: 4,
            disable_physics_beyond_mid: true,
            hysteresis: 0.0,
        }
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            enable_instancing: true,
            convert_to_shared_material: false,
        }
    }
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            window: 120,
            show_overlay: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            speed_property_name: "_Speed".to_string(),
            speed_on_select: 2.0,
            speed_on_deselect: 0.0,
            toggle_on_speed: 2.0,
            toggle_off_speed: 0.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_frames: 600,
        }
    }
}

/// Default per-user config directory (`<config>/pelt`).
///
/// Falls back to the current directory when the platform has no config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pelt")
}

// --- Load / Save / Reload ---

/// File name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

fn read_config(config_path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(config_path).map_err(|source| ConfigError::ReadError {
            path: config_path.to_path_buf(),
            source,
        })?;
    let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// # Errors
    ///
    /// Read, parse and range errors for an existing file; write errors when
    /// creating the default one.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::WriteError {
            path: config_path.clone(),
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE_NAME))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Range checks serde cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });

        for (field, value) in [
            ("fur.fur_length", self.fur.fur_length),
            ("fur.gravity", self.fur.gravity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(field, format!("{value} is outside [0, 1]"));
            }
        }
        let lod = &self.lod;
        if !(lod.near_dist > 0.0 && lod.near_dist < lod.mid_dist && lod.mid_dist < lod.far_dist) {
            return invalid(
                "lod",
                format!(
                    "thresholds must be positive and ascending, got {}/{}/{}",
                    lod.near_dist, lod.mid_dist, lod.far_dist
                ),
            );
        }
        if !(0.0..1.0).contains(&lod.hysteresis) {
            return invalid("lod.hysteresis", format!("{} is outside [0, 1)", lod.hysteresis));
        }
        if self.profiler.window == 0 {
            return invalid("profiler.window", "must hold at least one sample".to_string());
        }
        Ok(())
    }
}
