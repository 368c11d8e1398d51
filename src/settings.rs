//! Analysis settings persistence.
//!
//! The algorithms take their configuration as plain structs; this module
//! only bundles them and stores them as JSON in the user's config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::fats::FatsConfig;
use crate::analysis::power::VehicleConstants;
use crate::analysis::ranges::FilterConfig;
use crate::analysis::sae::SaeConfig;

const SETTINGS_FILE: &str = "analysis_settings.json";

/// Errors loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub fats: FatsConfig,
    #[serde(default)]
    pub sae: SaeConfig,
    #[serde(default)]
    pub vehicle: VehicleConstants,
}

fn default_version() -> u32 {
    1
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            filter: FilterConfig::default(),
            fats: FatsConfig::default(),
            sae: SaeConfig::default(),
            vehicle: VehicleConstants::default(),
        }
    }
}

impl AnalysisSettings {
    /// Get the config directory path for dynolog
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dynolog"))
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join(SETTINGS_FILE))
    }

    /// Load settings from the config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            tracing::warn!("No config directory, using default settings");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::get_settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }
}
