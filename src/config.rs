//! rebind configuration persistence
//!
//! Stores user preferences in `~/.config/rebind/config.yaml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keymap::{MatchingMode, MatchingOptions, SimultaneousMode};

/// Configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebindConfig {
    /// Binding store file; defaults to `~/.config/rebind/bindings.yaml`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    #[serde(default)]
    pub simultaneous_mode: SimultaneousMode,

    #[serde(default)]
    pub matching_mode: MatchingMode,

    /// Insert missing default bindings into the store on startup
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,

    /// Debounce delay for store file change events
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

fn default_seed_defaults() -> bool {
    true
}

fn default_watch_debounce_ms() -> u64 {
    250
}

impl Default for RebindConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            simultaneous_mode: SimultaneousMode::default(),
            matching_mode: MatchingMode::default(),
            seed_defaults: default_seed_defaults(),
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

impl RebindConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, or return defaults if unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// The store file to use: the configured one, or the default location
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(crate::config_paths::store_file)
    }

    pub fn matching_options(&self) -> MatchingOptions {
        MatchingOptions::new(self.simultaneous_mode, self.matching_mode)
    }

    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}
