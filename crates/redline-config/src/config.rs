/// Engine configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use redline_core::DiffOptions;
use redline_mod_history::config::resolve_data_dir;
use redline_mod_history::HistoryConfig;
use serde::{Deserialize, Serialize};

/// Upper bound for `history_max_entries`.
const MAX_HISTORY_ENTRIES: usize = 10_000;
/// Upper bound for `history_debounce_ms`.
const MAX_DEBOUNCE_MS: u64 = 60_000;
/// Upper bound for `anchor_context_chars`.
const MAX_CONTEXT_CHARS: usize = 1_000;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snapshots kept per document, including the seed entry.
    pub history_max_entries: usize,
    /// Quiet period before a content change becomes a snapshot. 0 commits
    /// every change immediately.
    pub history_debounce_ms: u64,
    /// Chars captured on each side of a selection for relocation.
    pub anchor_context_chars: usize,
    /// Whether fragments show accept/reject/close affordances.
    pub show_actions: bool,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Directory for the history database. Empty = `REDLINE_DATA_DIR` or
    /// `.data` next to the executable.
    pub data_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_max_entries: 100,
            history_debounce_ms: 500,
            anchor_context_chars: 50,
            show_actions: true,
            log_filter: "info".to_string(),
            data_dir: String::new(),
        }
    }
}

impl EngineConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `REDLINE_CONFIG` environment variable
    /// 2. `redline/redline.json` under the platform config directory
    /// 3. `redline.json` in the working directory
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("REDLINE_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("redline").join("redline.json"))
            .unwrap_or_else(|| PathBuf::from("redline.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EngineConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Broken files are left alone for the user to fix.
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.history_max_entries = self.history_max_entries.clamp(1, MAX_HISTORY_ENTRIES);
        self.history_debounce_ms = self.history_debounce_ms.min(MAX_DEBOUNCE_MS);
        self.anchor_context_chars = self.anchor_context_chars.clamp(1, MAX_CONTEXT_CHARS);
        if self.log_filter.trim().is_empty() {
            self.log_filter = "info".to_string();
        }
    }

    /// History settings for documents opened under this config.
    pub fn history_config(&self) -> HistoryConfig {
        let data_dir = if self.data_dir.trim().is_empty() {
            resolve_data_dir()
        } else {
            PathBuf::from(&self.data_dir)
        };
        HistoryConfig {
            max_entries: self.history_max_entries,
            debounce_ms: self.history_debounce_ms,
            data_dir,
        }
    }

    /// Presentation settings for the diff controller.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            context_chars: self.anchor_context_chars,
            show_actions: self.show_actions,
        }
    }
}
