//! Configuration file loading and saving
//!
//! Loads user configuration from `~/.config/slidecam/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::EmbedVideoOptions;
use crate::error::{Result, SlidecamError};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default plugin options, used where a deck does not set them
    #[serde(default, rename = "embed-video")]
    pub embed_video: EmbedVideoOptions,

    /// Simulated camera settings for `slidecam run`
    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Simulated media layer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// Delay before a simulated camera request completes
    #[serde(default)]
    pub latency_ms: u64,

    /// How long to wait for a pending request before reporting it as hung
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_ms: u64,
}

fn default_settle_timeout() -> u64 {
    2000
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            settle_timeout_ms: default_settle_timeout(),
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("slidecam").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("slidecam")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/slidecam/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SlidecamError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Write the commented sample configuration to `path`.
    ///
    /// An existing file is left alone unless `force` is set. Returns
    /// whether the file was written.
    pub fn init_at(path: impl AsRef<Path>, force: bool) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() && !force {
            debug!("Config file {:?} exists, not overwriting", path);
            return Ok(false);
        }
        write_config(path, &sample_config())?;
        Ok(true)
    }
}

fn write_config(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            SlidecamError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    std::fs::write(path, content)
        .map_err(|e| SlidecamError::Config(format!("Failed to write config file: {}", e)))?;

    info!("Saved configuration to {:?}", path);
    Ok(())
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# Slidecam Configuration

[embed-video]
# Show the camera as soon as the presentation is ready (toggle with [C])
enabled = false

# Keep the camera stream open while the video is hidden.
# Avoids repeated permission prompts at the cost of keeping the camera light on.
persistent = false

# Base URL of the plugin assets (stylesheet). Leave unset to derive it
# from the location of reveal-embed-video.js.
# path = "plugin/reveal-embed-video"

# Key that toggles the camera: a letter, a digit or a name like "space" or "F9"
# key = "C"

[simulator]
# Delay in milliseconds before a simulated camera request completes
latency_ms = 0

# Give up waiting on a pending camera request after this many milliseconds
settle_timeout_ms = 2000
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.embed_video, EmbedVideoOptions::default());
        assert_eq!(config.simulator.latency_ms, 0);
        assert_eq!(config.simulator.settle_timeout_ms, 2000);
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("slidecam").join("config.toml");

        assert!(ConfigFile::init_at(&path, false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), sample_config());

        std::fs::write(&path, "[simulator]\nlatency_ms = 50\n").unwrap();
        assert!(!ConfigFile::init_at(&path, false).unwrap());
        assert_eq!(ConfigFile::load_from(&path).unwrap().simulator.latency_ms, 50);

        assert!(ConfigFile::init_at(&path, true).unwrap());
        assert_eq!(ConfigFile::load_from(&path).unwrap().simulator.latency_ms, 0);
    }

    #[test]
    fn test_sample_config_parses() {
        let config: ConfigFile = toml::from_str(&sample_config()).unwrap();
        assert_eq!(config.embed_video.enabled, Some(false));
        assert_eq!(config.embed_video.persistent, Some(false));
        assert_eq!(config.embed_video.path, None);
    }
}
