use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vantage_layout::LayoutConfig;

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_NAME: &str = "vantage.config.json";

/// Editor configuration file format. Layout keys sit at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    #[serde(flatten)]
    pub layout: LayoutConfig,

    /// Milliseconds of inactivity before auto-saving; `<= 0` disables it
    pub auto_save_delay: i64,

    /// Undo levels kept in memory and persisted
    pub max_history_size: usize,

    /// Write history snapshots through the storage backend
    pub persist_history: bool,

    /// Milliseconds to coalesce history writes
    pub history_persist_delay: u64,
}

impl EditorConfig {
    /// Load config from a file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    /// Load `vantage.config.json` from a directory, or defaults if there is none
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn auto_save_delay(&self) -> Option<Duration> {
        (self.auto_save_delay > 0).then(|| Duration::from_millis(self.auto_save_delay as u64))
    }

    pub fn history_persist_delay(&self) -> Duration {
        Duration::from_millis(self.history_persist_delay)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            auto_save_delay: 3000,
            max_history_size: 50,
            persist_history: false,
            history_persist_delay: 250,
        }
    }
}
