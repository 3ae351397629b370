// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as pretty-printed JSON in `$XDG_CONFIG_HOME/woodglass/config.json`.
//! Missing fields take their defaults, so older files keep loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::app::state::FilterConfig;
use crate::backends::camera::Facing;
use crate::constants::BitratePreset;
use crate::constants::filter::DEFAULT_INTENSITY;
use crate::constants::recording::{MAX_DURATION_MS, SAMPLE_FPS, UI_TICK_MS};
use crate::constants::render::DEFAULT_REFRESH_RATE;
use crate::errors::{AppError, AppResult};
use crate::pipelines::video::{DeviceClass, RecorderSettings};
use crate::storage;

const CONFIG_DIR: &str = "woodglass";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blend between original and filtered pixels (0.0 - 1.0)
    pub filter_intensity: f32,
    /// Filter master switch
    pub filter_enabled: bool,
    /// Camera used at startup
    pub facing: Facing,
    /// Mirror the front camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Frame loop ticks per second
    pub refresh_rate: u32,
    /// Recording sample rate
    pub recording_fps: u32,
    /// Recording cap in milliseconds, at most 30000
    pub max_recording_ms: u64,
    /// Elapsed label refresh in milliseconds
    pub ui_tick_ms: u64,
    /// Recording format preference list to use
    pub device_class: DeviceClass,
    /// Video encoder quality preset (Low, Medium, High)
    pub bitrate_preset: BitratePreset,
    /// Where downloads go; defaults to the pictures/videos folders
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter_intensity: DEFAULT_INTENSITY,
            filter_enabled: true,
            facing: Facing::default(),
            mirror_preview: true, // Default to mirrored (selfie mode)
            refresh_rate: DEFAULT_REFRESH_RATE,
            recording_fps: SAMPLE_FPS,
            max_recording_ms: MAX_DURATION_MS,
            ui_tick_ms: UI_TICK_MS,
            device_class: DeviceClass::default(),
            bitrate_preset: BitratePreset::default(), // Default to Medium
            output_dir: None,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            debug!("No config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable config");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path()
            .ok_or_else(|| AppError::Config("no config directory".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn filter(&self) -> FilterConfig {
        FilterConfig::new(self.filter_intensity, self.filter_enabled)
    }

    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            device_class: self.device_class,
            preset: self.bitrate_preset,
            fps: self.recording_fps,
            max_duration: Duration::from_millis(self.max_recording_ms),
            ui_tick: Duration::from_millis(self.ui_tick_ms),
        }
        .sanitized()
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(storage::default_photo_dir)
    }

    pub fn video_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(storage::default_video_dir)
    }
}
