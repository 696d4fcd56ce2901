//! Engine configuration.
//!
//! Loaded from `.ron` or `.json` by file extension; anything else is read as
//! RON. Every field has a default so partial files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAP_HEIGHT, MAP_WIDTH, MIN_MAP_SIZE};
use crate::logging::TracingConfig;
use crate::player::Job;
use crate::world::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Scales enemy hp and contact damage
    pub fn hp_mult(&self) -> f32 {
        match self {
            Self::Easy => 0.75,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
        }
    }
}

/// Player-facing settings, persisted with saves
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    pub map_width: usize,
    pub map_height: usize,
    /// Visible area in pixels, used for camera clamping
    pub viewport: (f32, f32),
    pub tick_rate: u32,
    pub start_location: Location,
    pub start_job: Job,
    pub settings: Settings,
    pub tracing: TracingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            viewport: (800.0, 600.0),
            tick_rate: 60,
            start_location: Location::default(),
            start_job: Job::Warrior,
            settings: Settings::default(),
            tracing: TracingConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)?,
            _ => ron::from_str(&text)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < MIN_MAP_SIZE || self.map_height < MIN_MAP_SIZE {
            return Err(ConfigError::Invalid(format!(
                "map {}x{} is below the {}x{} minimum",
                self.map_width, self.map_height, MIN_MAP_SIZE, MIN_MAP_SIZE
            )));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick rate must be non-zero".into()));
        }
        Ok(())
    }

    /// Fixed step length in seconds
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
