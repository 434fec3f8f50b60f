//! # Configuration
//!
//! Runtime settings for the world, the player and the camera. Every field has
//! a default, so a config file only needs the values it changes.
//!
//! ```json
//! { "seed": 7, "render_distance": 4, "player": { "fly_speed": 60.0 } }
//! ```

use std::{env, fs, path::Path};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::perlin::Perlin2D;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "VOXEL_WORLD_CONFIG";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The file that was requested
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for [`WorldConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// The offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Movement tuning for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Acceleration target while walking, in blocks per second
    pub walk_speed: f32,
    /// Acceleration target while flying, in blocks per second
    pub fly_speed: f32,
    /// Downward acceleration while walking
    pub gravity: f32,
    /// Upward velocity applied by a jump
    pub jump_velocity: f32,
    /// Per-frame horizontal velocity factor while walking
    pub walk_damping: f32,
    /// Per-frame velocity factor while flying
    pub fly_damping: f32,
    /// Two jump presses closer together than this toggle flight
    pub double_tap_window_ms: u64,
    /// Longest frame step the simulation accepts, in seconds
    pub max_frame_delta: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            walk_speed: 12.0,
            fly_speed: 40.0,
            gravity: 32.0,
            jump_velocity: 10.0,
            walk_damping: 0.85,
            fly_damping: 0.92,
            double_tap_window_ms: 300,
            max_frame_delta: 0.05,
        }
    }
}

/// Camera projection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub znear: f32,
    /// Far clip distance
    pub zfar: f32,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 500.0,
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Terrain seed
    pub seed: u32,
    /// Streaming radius in chunks
    pub render_distance: i32,
    /// Where the player starts, in world space
    pub spawn_position: [f32; 3],
    /// Radians of rotation per unit of mouse movement
    pub mouse_sensitivity: f32,
    /// Movement tuning
    pub player: PlayerConfig,
    /// Camera projection
    pub projection: ProjectionConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: Perlin2D::DEFAULT_SEED,
            render_distance: 6,
            spawn_position: [8.0, 48.0, 8.0],
            mouse_sensitivity: 0.002,
            player: PlayerConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses a config from JSON text and validates it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults when it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => {
                info!("Loading config from {}", path);
                Self::from_path(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance < 0 {
            return Err(ConfigError::Invalid {
                field: "render_distance",
                reason: format!("must not be negative, got {}", self.render_distance),
            });
        }
        if !self.spawn_position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "spawn_position",
                reason: "must be finite".to_string(),
            });
        }
        let positive = [
            ("player.walk_speed", self.player.walk_speed),
            ("player.fly_speed", self.player.fly_speed),
            ("player.gravity", self.player.gravity),
            ("player.max_frame_delta", self.player.max_frame_delta),
            ("projection.fov_degrees", self.projection.fov_degrees),
            ("projection.znear", self.projection.znear),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        for (field, value) in [
            ("player.walk_damping", self.player.walk_damping),
            ("player.fly_damping", self.player.fly_damping),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within [0, 1], got {value}"),
                });
            }
        }
        if self.projection.zfar <= self.projection.znear {
            return Err(ConfigError::Invalid {
                field: "projection.zfar",
                reason: "must be beyond znear".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_world() {
        let config = WorldConfig::default();
        assert_eq!(config.seed, 2025);
        assert_eq!(config.render_distance, 6);
        assert_eq!(config.spawn_position, [8.0, 48.0, 8.0]);
        assert_eq!(config.player.walk_speed, 12.0);
        assert_eq!(config.projection.zfar, 500.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            WorldConfig::from_json(r#"{ "seed": 7, "player": { "fly_speed": 60.0 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.player.fly_speed, 60.0);
        assert_eq!(config.player.walk_speed, 12.0);
        assert_eq!(config.render_distance, 6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            WorldConfig::from_json(r#"{ "render_distance": -1 }"#),
            Err(ConfigError::Invalid { field: "render_distance", .. })
        ));
        assert!(matches!(
            WorldConfig::from_json(r#"{ "player": { "walk_speed": 0.0 } }"#),
            Err(ConfigError::Invalid { field: "player.walk_speed", .. })
        ));
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = WorldConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
