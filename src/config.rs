// src/config.rs

//! Defines the configuration structures for the serial terminal viewer.
//!
//! The structs deserialize from a JSON file. Every struct carries
//! `#[serde(default)]`, so a file only needs the keys it wants to change.
//!
//! The process-wide `CONFIG` is read once, from the path named by the
//! `SERIAL_TERM_CONFIG` environment variable, falling back to defaults.

use anyhow::Context;
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::Rgb;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_PATH_ENV_VAR: &str = "SERIAL_TERM_CONFIG";

/// Configuration loaded at first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_from_env);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Text pipeline settings.
    pub parser: ParserConfig,
    /// Scroll-back retention.
    pub scrollback: ScrollbackConfig,
    /// Frame pacing and renderer backpressure.
    pub performance: PerformanceConfig,
    /// Colours used by the renderer.
    pub colors: ColorScheme,
}

impl Config {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse configuration JSON")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Loads the file named by `SERIAL_TERM_CONFIG`, or the defaults if the
    /// variable is unset or the file cannot be used.
    pub fn load_from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) else {
            info!("{} not set, using default configuration", CONFIG_PATH_ENV_VAR);
            return Config::default();
        };
        match Config::load(Path::new(&path)) {
            Ok(config) => {
                info!("Configuration loaded from {}", path);
                config
            }
            Err(e) => {
                warn!("{:#}. Using default configuration.", e);
                Config::default()
            }
        }
    }
}

// --- Parser Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    /// Show control characters (CR, LF, ...) as visible glyphs instead of
    /// passing them through.
    pub replace_control_chars_with_visible_symbols: bool,
}

// --- Scroll-back Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbackConfig {
    /// Maximum number of characters kept once rendered. Older characters
    /// are trimmed from the front.
    pub max_chars: usize,
}

impl Default for ScrollbackConfig {
    fn default() -> Self {
        ScrollbackConfig { max_chars: 100_000 }
    }
}

// --- Performance Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Time between frames of the render loop.
    pub frame_interval_ms: u64,
    /// Maximum characters drawn per frame; the rest wait in the pipeline.
    /// 0 means no limit.
    pub max_chars_per_frame: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            frame_interval_ms: 16,
            max_chars_per_frame: 0,
        }
    }
}

// --- Color Scheme Configuration ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Colour of text that precedes any SGR colour change.
    pub default_foreground: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme {
            default_foreground: Rgb::new(170, 170, 170),
        }
    }
}
