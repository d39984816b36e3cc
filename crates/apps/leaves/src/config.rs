//! TOML configuration for the leaves demo
//!
//! Every field has a default, so a partial file only overrides what it names.
//! A missing file is not an error; a malformed one is.

use std::path::{Path, PathBuf};

use glam::Vec3;
use renderer::{AssetPaths, SceneParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "crates/apps/leaves/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Leaves".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Initial camera pose and control speeds; angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view
    pub fov: f32,
    /// Units per second
    pub move_speed: f32,
    /// Radians per pixel of raw mouse motion
    pub mouse_sensitivity: f32,
    /// Degrees of field of view per wheel line
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            move_speed: 2.5,
            mouse_sensitivity: 0.003,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Transform seed; absent or 0 draws from entropy
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeavesConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub scene: SceneParams,
    pub instances: InstanceConfig,
    pub assets: AssetPaths,
}

impl LeavesConfig {
    /// Parse a config from TOML text and clamp it to the panel ranges
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.scene.clamp_to_ranges();
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                info!("Loading config: {}", path.display());
                Self::from_toml(&text, path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
