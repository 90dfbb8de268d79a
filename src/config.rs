//! Simulation Configuration
//!
//! Session rules and logging for a simulation run. Physics constants are
//! fixed and live with the ball; only the game-layer rules are tunable.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rules for the reference game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lives at the start of a run
    pub starting_lives: i32,
    /// Extra lives never raise the count past this
    pub max_lives: i32,
    /// Pops are suppressed
    pub invincible: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            max_lives: 5,
            invincible: false,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Session rules
    pub session: SessionConfig,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// Contents are not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values parsed but are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl SimConfig {
    /// Parse and validate JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Apply `BOUNCE_INVINCIBLE` and `BOUNCE_LOG` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("BOUNCE_INVINCIBLE") {
            self.session.invincible = value == "true" || value == "1";
        }
        if let Ok(value) = std::env::var("BOUNCE_LOG") {
            self.log_level = value;
        }
        self
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.max_lives < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_lives must be at least 1, got {}",
                session.max_lives
            )));
        }
        if session.starting_lives < 0 || session.starting_lives > session.max_lives {
            return Err(ConfigError::Invalid(format!(
                "starting_lives {} outside 0..={}",
                session.starting_lives, session.max_lives
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
