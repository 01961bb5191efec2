//! JSON Settings File
//!
//! User toggles and the best score, persisted as a small JSON document.

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::store::{ScoreStore, StoreError};

/// Persisted user settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play sound effects
    pub sound_enabled: bool,
    /// Draw tracker debug overlay
    pub show_debug_overlay: bool,
    /// Preferred camera device
    pub camera_id: Option<String>,
    /// Best score ever reached
    pub high_score: u32,
    /// When the best score was reached
    pub high_score_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            show_debug_overlay: false,
            camera_id: None,
            high_score: 0,
            high_score_at: None,
        }
    }
}

/// Settings backed by a JSON file. Every change is written through.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl JsonSettingsStore {
    /// Open the settings file, starting from defaults if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Settings::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, settings })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Turn sound on or off.
    pub fn set_sound_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.settings.sound_enabled = enabled;
        self.save()
    }

    /// Show or hide the debug overlay.
    pub fn set_show_debug_overlay(&mut self, show: bool) -> Result<(), StoreError> {
        self.settings.show_debug_overlay = show;
        self.save()
    }

    /// Choose a camera; `None` means the system default.
    pub fn set_camera_id(&mut self, camera_id: Option<String>) -> Result<(), StoreError> {
        self.settings.camera_id = camera_id;
        self.save()
    }

    /// Flip the sound toggle.
    pub fn toggle_sound(&mut self) -> Result<bool, StoreError> {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        self.save()?;
        Ok(self.settings.sound_enabled)
    }

    /// Flip the debug overlay toggle.
    pub fn toggle_debug_overlay(&mut self) -> Result<bool, StoreError> {
        self.settings.show_debug_overlay = !self.settings.show_debug_overlay;
        self.save()?;
        Ok(self.settings.show_debug_overlay)
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ScoreStore for JsonSettingsStore {
    fn high_score(&self) -> u32 {
        self.settings.high_score
    }

    fn record_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        if score <= self.settings.high_score {
            return Ok(());
        }
        self.settings.high_score = score;
        self.settings.high_score_at = Some(Utc::now());
        info!(score, "new high score saved");
        self.save()
    }
}
