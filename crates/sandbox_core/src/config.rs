//! Sandbox configuration files.
//!
//! A config is a JSON document; every field is optional and falls back to
//! its default.
//!
//! ```json
//! {
//!   "physics": { "gravity": [0.0, -9.82, 0.0], "timestep": 0.016666668 },
//!   "movement": { "ground_max_speed": 20.0, "jump_strength": 10.0 },
//!   "props": ["platform-1", "sphere-1"]
//! }
//! ```

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use sandbox_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};

use crate::character_controller::MovementParams;

/// Errors that can occur while loading or saving a config.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// Malformed JSON
    Json(serde_json::Error),
    /// Parsed fine but a value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub physics: PhysicsConfig,
    pub movement: MovementParams,
    /// Named bodies spawned alongside the player.
    pub props: Vec<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            movement: MovementParams::default(),
            props: vec![
                "platform-1".to_owned(),
                "dynamic-box-1".to_owned(),
                "sphere-1".to_owned(),
            ],
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.physics.timestep > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "physics.timestep must be positive, got {}",
                self.physics.timestep
            )));
        }
        if !self.physics.gravity.iter().all(|g| g.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "physics.gravity must be finite, got {:?}",
                self.physics.gravity
            )));
        }
        for (name, value) in [
            ("friction", self.physics.friction),
            ("restitution", self.physics.restitution),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "physics.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in self.movement.named_values() {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "movement.{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<SandboxConfig> {
    let text = fs::read_to_string(path.as_ref())?;
    let config: SandboxConfig = serde_json::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &SandboxConfig, path: P) -> ConfigResult<()> {
    let text = serde_json::to_string_pretty(config)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_save_load_config() {
        let mut config = SandboxConfig::default();
        config.movement.jump_strength = 11.0;
        config.props = vec!["platform-1".to_owned()];

        let file = NamedTempFile::with_suffix(".json").unwrap();
        save_config(&config, file.path()).unwrap();
        let loaded = load_config(file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_temp(r#"{ "movement": { "ground_max_speed": 20.0 } }"#);
        let loaded = load_config(file.path()).unwrap();

        assert_eq!(loaded.movement.ground_max_speed, 20.0);
        assert_eq!(loaded.movement.jump_strength, 8.0);
        assert_eq!(loaded.physics, PhysicsConfig::default());
        assert_eq!(loaded.props.len(), 3);
    }

    #[test]
    fn test_invalid_json() {
        let file = write_temp("{ not json");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let file = write_temp(r#"{ "movement": { "air_max_speed": 0.0 } }"#);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("air_max_speed"), "{}", err);

        let file = write_temp(r#"{ "physics": { "timestep": -1.0 } }"#);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_surface_and_gravity() {
        let file = write_temp(r#"{ "physics": { "friction": -0.5 } }"#);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("friction"), "{}", err);

        let file = write_temp(r#"{ "physics": { "restitution": -1.0 } }"#);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("restitution"), "{}", err);

        // JSON has no NaN literal; check values built in code.
        let mut config = SandboxConfig::default();
        config.physics.gravity = [0.0, f32::NAN, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SandboxConfig::default();
        config.physics.friction = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SandboxConfig::default();
        config.physics.friction = 0.0;
        config.physics.restitution = 0.0;
        assert!(config.validate().is_ok());
    }
}
