//! Simple configuration for drumkeys
//!
//! Read once at startup from `<config dir>/drumkeys/config.txt`. Nothing is
//! written back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Kit file to load; the stock kit is used when unset
    pub kit_file: Option<PathBuf>,
    /// Directory holding the stock kit's clips
    pub sample_dir: PathBuf,
    /// Initial master volume (0.0 - 2.0)
    pub master_volume: f32,
    /// Length of a pad's highlight transition in milliseconds
    pub pulse_ms: u64,
    /// Theme name
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kit_file: None,
            sample_dir: PathBuf::from("sounds"),
            master_volume: 1.0,
            pulse_ms: 70,
            theme: "classic".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be read.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("drumkeys")
            .join("config.txt")
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "kit_file" => config.kit_file = Some(PathBuf::from(value)),
                "sample_dir" => config.sample_dir = PathBuf::from(value),
                "master_volume" => match value.parse::<f32>() {
                    Ok(v) if v.is_finite() => config.master_volume = v.clamp(0.0, 2.0),
                    _ => tracing::warn!(value, "ignoring invalid master_volume"),
                },
                "pulse_ms" => match value.parse::<u64>() {
                    Ok(v) => config.pulse_ms = v,
                    Err(_) => tracing::warn!(value, "ignoring invalid pulse_ms"),
                },
                "theme" => config.theme = value.to_string(),
                _ => {} // Ignore unknown keys
            }
        }

        config
    }
}
