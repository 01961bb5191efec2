//! Game Configuration
//!
//! Tunables for a session, loadable from JSON. Every field has a default, so a
//! partial file (or `{}`) is valid.

use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::geometry::FitOptions;

/// Which evaluator decides a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Match the player's skeleton against a reference pose
    #[default]
    Pose,
    /// Fit the player's keypoints inside an outline
    Shape,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Pose => f.write_str("pose"),
            GameMode::Shape => f.write_str("shape"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },

    /// The config file could not be read.
    #[error("cannot read config file `{path}`: {source}")]
    FileRead {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema.
    #[error("cannot parse config file `{path}`: {source}")]
    Parse {
        /// Path being parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Evaluator used for rounds
    pub mode: GameMode,
    /// Lives at game start
    pub initial_lives: u8,
    /// Upper bound for bonus lives
    pub max_lives: u8,
    /// Countdown numbers shown before each round
    pub countdown_steps: u32,
    /// Duration of one countdown number (ms)
    pub countdown_step_ms: u64,
    /// Delay before success/fail advances on its own (ms)
    pub feedback_delay_ms: u64,
    /// Keypoint gate and containment tolerance for shape mode
    pub fit: FitOptions,
    /// Horizontal margin kept clear when placing shapes
    pub placement_padding: f64,
    /// Shift shapes horizontally each round
    pub randomize_placement: bool,
    /// Fixed RNG seed (otherwise derived from the session id)
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Pose,
            initial_lives: 3,
            max_lives: 5,
            countdown_steps: 3,
            countdown_step_ms: 800,
            feedback_delay_ms: 2000,
            fit: FitOptions::default(),
            placement_padding: 0.05,
            randomize_placement: true,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be read,
    /// [`ConfigError::Parse`] if the JSON is malformed, and
    /// [`ConfigError::InvalidValue`] if a value is out of range.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_lives == 0 {
            return Err(ConfigError::invalid("initial_lives", "must be > 0"));
        }
        if self.initial_lives > self.max_lives {
            return Err(ConfigError::invalid(
                "initial_lives",
                format!("must be <= max_lives ({})", self.max_lives),
            ));
        }
        if self.countdown_steps == 0 {
            return Err(ConfigError::invalid("countdown_steps", "must be > 0"));
        }
        if !(0.0..0.5).contains(&self.placement_padding) {
            return Err(ConfigError::invalid(
                "placement_padding",
                format!("must be in [0, 0.5), got {}", self.placement_padding),
            ));
        }
        if !(0.0..=1.0).contains(&self.fit.min_score) {
            return Err(ConfigError::invalid(
                "fit.min_score",
                format!("must be in [0, 1], got {}", self.fit.min_score),
            ));
        }
        if !self.fit.tolerance.is_finite() || self.fit.tolerance < 0.0 {
            return Err(ConfigError::invalid("fit.tolerance", "must be a finite value >= 0"));
        }
        Ok(())
    }

    /// Total countdown length in milliseconds.
    pub fn countdown_total_ms(&self) -> u64 {
        u64::from(self.countdown_steps) * self.countdown_step_ms
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.countdown_total_ms(), 2400);
        assert_eq!(config.fit.min_score, 0.25);
        assert_eq!(config.fit.tolerance, 0.04);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "mode": "shape", "initial_lives": 1 }"#).unwrap();
        assert_eq!(config.mode, GameMode::Shape);
        assert_eq!(config.initial_lives, 1);
        assert_eq!(config.max_lives, 5);
        assert_eq!(config.feedback_delay_ms, 2000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = GameConfig { initial_lives: 0, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "initial_lives", .. })
        ));

        config.initial_lives = 6;
        assert!(config.validate().is_err());

        let config = GameConfig { placement_padding: 0.5, ..GameConfig::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "placement_padding", .. })
        ));

        let config = GameConfig { countdown_steps: 0, ..GameConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let path = temp_path("config.json");
        std::fs::write(&path, r#"{ "seed": 42, "countdown_steps": 5 }"#).unwrap();

        let config = GameConfig::from_json_file(&path).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.countdown_steps, 5);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_json_file_errors() {
        let missing = temp_path("missing.json");
        assert!(matches!(
            GameConfig::from_json_file(&missing),
            Err(ConfigError::FileRead { .. })
        ));

        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GameConfig::from_json_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        std::fs::remove_file(&path).ok();
    }
}
