//! Configuration handling: the popup definition and user settings

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding where payloads are written
pub const OUTPUT_ENV_VAR: &str = "DYNAMIC_POPUP_OUTPUT";

/// Definition of one popup form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupConfig {
    pub id: String,
    pub title: String,
    /// Markdown with embedded `:::dc<...>` components
    pub markdown_content: String,
    /// Blocking forms can only be closed by submitting
    #[serde(default)]
    pub is_blocking: bool,
    /// Hint for hosts that track which forms were already shown
    #[serde(default)]
    pub show_once: bool,
}

impl PopupConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read popup config {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid popup config {}", path.display()))
    }
}

/// User settings for the terminal renderer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// File the submission payload is written to; stdout when unset
    pub output_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: Option<String>,
    /// Show the key hints line under the form
    pub show_hints: Option<bool>,
}

impl Settings {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "dynamic-popup", "dynamic-popup")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        if let Ok(output) = std::env::var(OUTPUT_ENV_VAR) {
            if !output.is_empty() {
                settings.output_path = Some(PathBuf::from(output));
            }
        }
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn show_hints(&self) -> bool {
        self.show_hints.unwrap_or(true)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("dynamic_popup=info")
    }
}
