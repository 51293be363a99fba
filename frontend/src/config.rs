//! Optional TOML configuration.
//!
//! ```toml
//! [display]
//! scale = 3
//! show_fps = true
//!
//! [audio]
//! enabled = false
//!
//! [keys]
//! cross = "Z"
//! circle = "X"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

use luaplayer_core::audio::DEFAULT_SAMPLE_RATE;
use luaplayer_core::timing::DEFAULT_REFRESH_RATE;

pub const DEFAULT_SCALE: u32 = 2;
pub const MIN_SCALE: u32 = 1;
pub const MAX_SCALE: u32 = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    /// Button name (`cross`, `up`, ...) to SDL scancode name.
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub scale: u32,
    pub refresh_rate: u32,
    pub show_fps: bool,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            refresh_rate: DEFAULT_REFRESH_RATE,
            show_fps: false,
            title: "Lua Player".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub enabled: bool,
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Config {
    /// `<config_dir>/luaplayer/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("luaplayer").join("config.toml"))
    }

    /// Load the explicit `path`, or the default file if it exists. An
    /// explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Clamp a window scale factor into the supported range.
pub fn clamp_scale(scale: u32) -> u32 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
