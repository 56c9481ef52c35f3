//! Game tuning and configuration
//!
//! Every gameplay constant lives in [`GameConfig`]. The two presets in
//! [`Variant`] reproduce the balloon shooter and the invaders clone; a JSON
//! file can override any field.

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entities::TargetShape;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "BALLOON_SHOOTER_CONFIG";

/// Smallest play area the simulation accepts, in logical units
pub const MIN_PLAY_WIDTH: f32 = 160.0;
pub const MIN_PLAY_HEIGHT: f32 = 120.0;

/// Which game the engine plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Carnival balloons, circular hit test
    #[default]
    Balloons,
    /// Space invaders, box hit test
    Invaders,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Balloons => "balloons",
            Variant::Invaders => "invaders",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "balloons" | "balloon" => Some(Variant::Balloons),
            "invaders" | "invader" | "space" => Some(Variant::Invaders),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Balloons => "Balloon Shooter",
            Variant::Invaders => "Space Invaders",
        }
    }

    pub fn target_shape(&self) -> TargetShape {
        match self {
            Variant::Balloons => TargetShape::Balloon,
            Variant::Invaders => TargetShape::Invader,
        }
    }
}

/// All tunables of a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    pub starting_lives: u32,

    // === Targets ===
    /// Base fall speed at the start of a session (units per frame)
    pub initial_target_speed: f32,
    /// Random extra speed added per target, uniform in [0, jitter)
    pub target_speed_jitter: f32,
    /// Smallest target size drawn by the spawner
    pub target_min_size: f32,
    /// Width of the size range above `target_min_size`
    pub target_size_range: f32,
    /// Hard bounds applied after drawing a size
    pub target_size_clamp: (f32, f32),
    /// Distance above the top edge at which targets appear
    pub spawn_margin: f32,

    // === Timers (milliseconds) ===
    pub initial_spawn_interval_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub fire_interval_ms: u64,
    pub difficulty_ramp_secs: u64,
    /// Added to the base fall speed on each ramp
    pub ramp_speed_increment: f32,
    /// Spawn interval multiplier applied on each ramp
    pub ramp_interval_factor: f32,

    // === Player ===
    /// Fixed player speed; `None` derives it from the play width
    pub player_speed: Option<f32>,
    /// Gap kept between the player and the side walls
    pub player_margin: f32,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_width: f32,
    pub bullet_height: f32,

    // === Particles ===
    pub particles_per_pop: usize,
    pub particle_gravity: f32,

    // === Audio ===
    pub master_volume: f32,
    pub muted: bool,

    /// Seed for the session RNG; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Balloons)
    }
}

impl GameConfig {
    /// Preset constants for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Balloons => Self {
                variant,
                starting_lives: 3,
                initial_target_speed: 1.6,
                target_speed_jitter: 0.9,
                target_min_size: 30.0,
                target_size_range: 28.0,
                target_size_clamp: (28.0, 64.0),
                spawn_margin: 4.0,
                initial_spawn_interval_ms: 1400,
                min_spawn_interval_ms: 550,
                fire_interval_ms: 170,
                difficulty_ramp_secs: 20,
                ramp_speed_increment: 0.18,
                ramp_interval_factor: 0.92,
                player_speed: None,
                player_margin: 6.0,
                bullet_speed: 12.0,
                bullet_width: 10.0,
                bullet_height: 18.0,
                particles_per_pop: 16,
                particle_gravity: 0.12,
                master_volume: 1.0,
                muted: false,
                seed: None,
            },
            Variant::Invaders => Self {
                variant,
                starting_lives: 3,
                initial_target_speed: 1.0,
                target_speed_jitter: 0.5,
                target_min_size: 32.0,
                target_size_range: 8.0,
                target_size_clamp: (32.0, 40.0),
                spawn_margin: 4.0,
                initial_spawn_interval_ms: 1100,
                min_spawn_interval_ms: 450,
                fire_interval_ms: 200,
                difficulty_ramp_secs: 15,
                ramp_speed_increment: 0.15,
                ramp_interval_factor: 0.9,
                player_speed: Some(6.0),
                player_margin: 4.0,
                bullet_speed: 10.0,
                bullet_width: 6.0,
                bullet_height: 14.0,
                particles_per_pop: 12,
                particle_gravity: 0.0,
                master_volume: 1.0,
                muted: false,
                seed: None,
            },
        }
    }

    pub fn initial_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.initial_spawn_interval_ms)
    }

    pub fn min_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.min_spawn_interval_ms)
    }

    pub fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }

    pub fn difficulty_ramp_period(&self) -> Duration {
        Duration::from_secs(self.difficulty_ramp_secs)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.starting_lives == 0 {
            bail!("starting_lives must be at least 1");
        }
        if self.initial_spawn_interval_ms == 0 {
            bail!("initial_spawn_interval_ms must be positive");
        }
        if self.min_spawn_interval_ms == 0 {
            bail!("min_spawn_interval_ms must be positive");
        }
        if self.fire_interval_ms == 0 {
            bail!("fire_interval_ms must be positive");
        }
        if self.difficulty_ramp_secs == 0 {
            bail!("difficulty_ramp_secs must be positive");
        }
        if !(self.ramp_interval_factor > 0.0 && self.ramp_interval_factor <= 1.0) {
            bail!(
                "ramp_interval_factor must be in (0, 1], got {}",
                self.ramp_interval_factor
            );
        }
        if self.bullet_speed <= 0.0 {
            bail!("bullet_speed must be positive");
        }
        if self.bullet_width <= 0.0 || self.bullet_height <= 0.0 {
            bail!("bullet dimensions must be positive");
        }
        let (lo, hi) = self.target_size_clamp;
        if lo <= 0.0 || lo > hi {
            bail!("target_size_clamp ({lo}, {hi}) is not a valid range");
        }
        if self.target_min_size <= 0.0 || self.target_size_range < 0.0 {
            bail!("target size range must be positive");
        }
        if self.initial_target_speed < 0.0 || self.target_speed_jitter < 0.0 {
            bail!("target speeds must not be negative");
        }
        if let Some(speed) = self.player_speed
            && speed <= 0.0
        {
            bail!("player_speed must be positive");
        }
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// Missing fields fall back to the preset of the `variant` named in the
    /// file (balloons when absent).
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    /// Parse a JSON config, layering it over the named variant's preset
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).wrap_err("config is not valid JSON")?;

        let variant = match value.get("variant").and_then(|v| v.as_str()) {
            Some(name) => match Variant::from_str(name) {
                Some(variant) => variant,
                None => bail!("unknown variant {name:?}"),
            },
            None => Variant::Balloons,
        };

        let mut merged = serde_json::to_value(Self::for_variant(variant))
            .wrap_err("failed to serialize preset")?;
        if let (Some(base), Some(overrides)) = (merged.as_object_mut(), value.as_object()) {
            for (key, v) in overrides {
                base.insert(key.clone(), v.clone());
            }
            // store the canonical name so aliases and any casing deserialize
            base.insert("variant".into(), variant.as_str().into());
        }

        let config: Self =
            serde_json::from_value(merged).wrap_err("config fields have the wrong shape")?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config for the binary
    ///
    /// An explicit argument is either a variant name or a path to a JSON
    /// file; otherwise [`CONFIG_ENV_VAR`] is consulted, then the defaults.
    pub fn load(arg: Option<&str>) -> Result<(Self, ConfigSource)> {
        if let Some(arg) = arg {
            if let Some(variant) = Variant::from_str(arg) {
                return Ok((Self::for_variant(variant), ConfigSource::Preset(variant)));
            }
            let path = PathBuf::from(arg);
            return Ok((Self::from_file(&path)?, ConfigSource::File(path)));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            return Ok((Self::from_file(&path)?, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Preset(Variant::Balloons)))
    }
}

/// Where the active config came from (for the log)
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Preset(Variant),
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Preset(variant) => write!(f, "{} preset", variant.as_str()),
            ConfigSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balloon_preset_matches_carnival_constants() {
        let config = GameConfig::default();
        assert_eq!(config.variant, Variant::Balloons);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.initial_spawn_interval(), Duration::from_millis(1400));
        assert_eq!(config.fire_interval(), Duration::from_millis(170));
        assert_eq!(config.difficulty_ramp_period(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invaders_preset_is_valid() {
        let config = GameConfig::for_variant(Variant::Invaders);
        assert_eq!(config.variant, Variant::Invaders);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("Balloons"), Some(Variant::Balloons));
        assert_eq!(Variant::from_str("invaders"), Some(Variant::Invaders));
        assert_eq!(Variant::from_str("pong"), None);
    }

    #[test]
    fn test_from_json_overrides_preset() {
        let config = GameConfig::from_json(r#"{"starting_lives": 5, "seed": 7}"#).unwrap();
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.fire_interval_ms, 170);
    }

    #[test]
    fn test_from_json_layers_over_named_variant() {
        let config = GameConfig::from_json(r#"{"variant": "invaders", "muted": true}"#).unwrap();
        let preset = GameConfig::for_variant(Variant::Invaders);
        assert_eq!(config.variant, Variant::Invaders);
        assert!(config.muted);
        assert_eq!(config.fire_interval_ms, preset.fire_interval_ms);
    }

    #[test]
    fn test_from_json_accepts_variant_aliases_and_casing() {
        let config = GameConfig::from_json(r#"{"variant": "space"}"#).unwrap();
        assert_eq!(config.variant, Variant::Invaders);

        let config = GameConfig::from_json(r#"{"variant": "Invaders", "seed": 3}"#).unwrap();
        assert_eq!(config.variant, Variant::Invaders);
        assert_eq!(config.seed, Some(3));

        let config = GameConfig::from_json(r#"{"variant": "BALLOON"}"#).unwrap();
        assert_eq!(config.variant, Variant::Balloons);
    }

    #[test]
    fn test_load_with_aliased_variant_argument() {
        let (config, source) = GameConfig::load(Some("Space")).unwrap();
        assert_eq!(config.variant, Variant::Invaders);
        assert_eq!(source, ConfigSource::Preset(Variant::Invaders));
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(GameConfig::from_json(r#"{"starting_lives": 0}"#).is_err());
        assert!(GameConfig::from_json(r#"{"fire_interval_ms": 0}"#).is_err());
        assert!(GameConfig::from_json(r#"{"ramp_interval_factor": 1.5}"#).is_err());
        assert!(GameConfig::from_json(r#"{"variant": "pong"}"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_load_with_variant_argument() {
        let (config, source) = GameConfig::load(Some("invaders")).unwrap();
        assert_eq!(config.variant, Variant::Invaders);
        assert_eq!(source, ConfigSource::Preset(Variant::Invaders));
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(GameConfig::load(Some("/nonexistent/balloons.json")).is_err());
    }
}
