// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Preferences persist as JSON under the user config directory. Unknown or
//! missing fields fall back to defaults, so old config files keep loading
//! across releases.

use crate::capture::Facing;
use crate::collage::{CollageFormat, CollageQuality};
use crate::errors::{BoothError, BoothResult};
use crate::storage::DEFAULT_SAVE_FOLDER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mirror the live preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Camera facing opened at startup
    pub preferred_facing: Facing,
    /// Output format for finished strips
    pub output_format: CollageFormat,
    /// JPEG quality preset
    pub quality: CollageQuality,
    /// Folder under the pictures directory for saved strips
    pub save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirror_preview: true, // Default to mirrored (selfie mode)
            preferred_facing: Facing::default(),
            output_format: CollageFormat::default(),
            quality: CollageQuality::default(),
            save_folder: DEFAULT_SAVE_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// Path of the config file, when a config directory exists
    pub fn path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("photobooth").join("config.json"))
    }

    /// Load the config, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Malformed config; using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the config
    pub fn save(&self) -> BoothResult<()> {
        let path = Self::path()
            .ok_or_else(|| BoothError::Config("no config directory".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BoothError::Config(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BoothError::Config(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| BoothError::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"mirror_preview": false}"#).unwrap();
        assert!(!config.mirror_preview);
        assert_eq!(config.save_folder, DEFAULT_SAVE_FOLDER);
        assert_eq!(config.output_format, CollageFormat::Png);
    }
}
