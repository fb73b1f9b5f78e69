//! User settings.
//!
//! Stored as JSON in `<config dir>/carteles/settings.json`. Every section is
//! optional in the file; missing values take their defaults.

use crate::binding::{NumberFormat, is_valid_date_pattern};
use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_ZOOM, MAX_HISTORY_ENTRIES, MAX_ZOOM, MIN_ZOOM,
};
use crate::document::CanvasDocument;
use crate::error::PersistError;
use crate::types::{CanvasConfig, PageSetup};
use crate::units::ExportQuality;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Location of the settings file for the current user
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carteles")
        .join("settings.json")
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub number_format: NumberFormat,
    pub editor: EditorSettings,
    pub export: ExportSettings,
}

/// Defaults for new editing sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub page: PageSetup,
    pub grid_size: f32,
    pub grid_visible: bool,
    pub snap_enabled: bool,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            page: PageSetup::default(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_visible: true,
            snap_enabled: false,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            history_limit: MAX_HISTORY_ENTRIES,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub quality: ExportQuality,
}

impl Settings {
    /// Load from the default path, falling back to defaults on any problem.
    pub fn load() -> Self {
        let path = default_settings_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Using default settings: {e:#}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        settings.validate()?;
        tracing::info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let editor = &self.editor;
        ensure!(
            editor.grid_size.is_finite() && editor.grid_size >= 0.0,
            "grid_size must be a non-negative number, got {}",
            editor.grid_size
        );
        ensure!(
            editor.min_zoom > 0.0 && editor.min_zoom <= editor.max_zoom,
            "zoom range {}..{} is invalid",
            editor.min_zoom,
            editor.max_zoom
        );
        ensure!(editor.history_limit > 0, "history_limit must be at least 1");
        ensure!(
            is_valid_date_pattern(&self.number_format.date_pattern),
            "date_pattern {:?} is not a valid strftime pattern",
            self.number_format.date_pattern
        );
        Ok(())
    }

    /// Canvas configuration for a new document
    pub fn canvas_config(&self) -> CanvasConfig {
        let editor = &self.editor;
        CanvasConfig {
            page: editor.page,
            grid_size: editor.grid_size,
            grid_visible: editor.grid_visible,
            snap_enabled: editor.snap_enabled,
            zoom: editor.zoom,
            min_zoom: editor.min_zoom,
            max_zoom: editor.max_zoom,
        }
    }

    /// Empty document configured from these settings
    pub fn new_document(&self) -> CanvasDocument {
        CanvasDocument::new(self.canvas_config()).with_history_limit(self.editor.history_limit)
    }

    /// Reopen a saved document with this session's history limit. Page setup
    /// and view state come from the file.
    pub fn open_document(&self, path: impl AsRef<Path>) -> Result<CanvasDocument, PersistError> {
        CanvasDocument::load_from_path_with_limit(path, self.editor.history_limit)
    }
}
