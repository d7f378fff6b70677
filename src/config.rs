use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::ids::IdStrategy;
use crate::logging::LogConfig;
use crate::presentation::{PanOptions, PopupSettings};
use crate::storage::FileStorage;
use crate::store::RestoreMode;
use crate::validation::ValidationRules;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Map view settings
    pub map: MapSettings,

    /// Marker popup appearance
    pub popup: PopupSettings,

    /// Where the session snapshot is kept
    pub storage: StorageSettings,

    /// Form validation rules
    pub validation: ValidationRules,

    /// Workout identifier scheme
    pub ids: IdSettings,

    /// How stored workouts come back on startup
    pub restore: RestoreSettings,

    /// Logging setup
    pub logging: LogConfig,
}

/// Map view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Zoom level for the initial view and for re-centring on a workout
    pub zoom_level: u8,

    /// Animate re-centring
    pub animate: bool,

    /// Pan animation length in seconds
    pub pan_duration_secs: f64,
}

/// Persisted storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Entry holding the serialized workout array
    pub key: String,

    /// Directory for file-backed storage
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdSettings {
    pub strategy: IdStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreSettings {
    pub mode: RestoreMode,
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            zoom_level: 14,
            animate: true,
            pan_duration_secs: 1.0,
        }
    }
}

impl MapSettings {
    pub fn pan_options(&self) -> PanOptions {
        PanOptions {
            animate: self.animate,
            duration_secs: self.pan_duration_secs,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: "workouts".to_string(),
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("maptrack"),
        }
    }
}

impl StorageSettings {
    /// File-backed storage rooted at `data_dir`
    pub fn open_file_storage(&self) -> std::result::Result<FileStorage, StorageError> {
        FileStorage::open(&self.data_dir)
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".maptrack")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Config file not usable, using defaults"
                );
                Self::default()
            }
        }
    }
}
