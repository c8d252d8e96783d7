use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use vantage_editor::{EditorConfig, FileStorage};
use walkdir::WalkDir;

pub use vantage_editor::DEFAULT_CONFIG_NAME;

const HISTORY_SUFFIX: &str = "-history";

/// A directory of stored pages plus the config that applies to it
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: EditorConfig,
}

impl Project {
    /// Load config from `config_path` when given, else from `root`
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::load_from_dir(root)?,
        };
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(DEFAULT_CONFIG_NAME)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.root, self.config.layout.clone())
    }

    /// Ids of every page stored directly under the root, sorted
    pub fn page_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        for entry in WalkDir::new(&self.root).max_depth(1) {
            let entry = entry.with_context(|| format!("Cannot read {}", self.root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|s| s.to_str()) == Some(DEFAULT_CONFIG_NAME) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.ends_with(HISTORY_SUFFIX) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}
