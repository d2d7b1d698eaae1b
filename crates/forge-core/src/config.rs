// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persisted generation defaults and the store that loads/saves them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::{GenerationOptions, PageGeometry, Quality};

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "private-forge";

/// Persistent generation defaults, remembered between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Re-encode images before embedding them.
    pub use_image_compression: bool,
    /// JPEG quality used when re-encoding (1-100).
    pub image_quality: Quality,
    /// Page size for image entries.
    pub image_paper_size: PageGeometry,
}

impl Default for Settings {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            use_image_compression: options.compress,
            image_quality: options.quality,
            image_paper_size: options.page_geometry,
        }
    }
}

impl Settings {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            compress: self.use_image_compression,
            quality: self.image_quality,
            page_geometry: self.image_paper_size,
        }
    }
}

/// Loads and saves [`Settings`] as JSON inside a data directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Store rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform data directory (see [`data_dir`]).
    pub fn default_location() -> Self {
        Self::new(data_dir())
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Load saved settings. A missing file yields defaults; so does a corrupt
    /// one, after logging it.
    pub fn load(&self) -> Settings {
        let path = self.path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %path.display(), %err, "No saved settings, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), %err, "Saved settings are unreadable, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(self.path(), json)?;
        info!(path = %self.path().display(), "Settings saved");
        Ok(())
    }

    /// Overwrite saved settings with defaults and return them.
    pub fn reset(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Application data directory.
///
/// `FORGE_DATA_DIR` wins, then `$XDG_DATA_HOME/private-forge`, then
/// `$HOME/.local/share/private-forge`, then a temp-dir fallback.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FORGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    data_base().join(APP_DIR)
}

fn data_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return Path::new(&home).join(".local").join("share");
    }
    std::env::temp_dir()
}
