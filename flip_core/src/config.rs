//! Configuration file support for Flip.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/flip/config.toml`.

use crate::engine::EngineTuning;
use crate::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub autoplay: AutoplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Review timing parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// In-session delay before a left-swiped card may reappear
    #[serde(default = "default_quick_skip_minutes")]
    pub quick_skip_minutes: i64,

    /// Interval of the reinsertion scheduler's periodic tick
    #[serde(default = "default_tick_interval_seconds")]
    pub tick_interval_seconds: u64,

    /// Debounce between accepted undos
    #[serde(default = "default_undo_cooldown_ms")]
    pub undo_cooldown_ms: i64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            quick_skip_minutes: default_quick_skip_minutes(),
            tick_interval_seconds: default_tick_interval_seconds(),
            undo_cooldown_ms: default_undo_cooldown_ms(),
        }
    }
}

impl ReviewConfig {
    pub fn tuning(&self) -> EngineTuning {
        EngineTuning {
            quick_skip: Duration::minutes(self.quick_skip_minutes),
            undo_cooldown: Duration::milliseconds(self.undo_cooldown_ms),
        }
    }
}

/// Autoplay pacing parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutoplayConfig {
    /// How long the front face is shown
    #[serde(default = "default_face_ms")]
    pub reveal_ms: u64,

    /// How long the back face is shown
    #[serde(default = "default_face_ms")]
    pub flip_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            reveal_ms: default_face_ms(),
            flip_ms: default_face_ms(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("flip")
}

fn default_quick_skip_minutes() -> i64 {
    2
}

fn default_tick_interval_seconds() -> u64 {
    crate::scheduler::DEFAULT_TICK_INTERVAL_SECONDS
}

fn default_undo_cooldown_ms() -> i64 {
    1000
}

fn default_face_ms() -> u64 {
    crate::autoplay::DEFAULT_FACE_MS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("flip").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
