//! # Page Storage
//!
//! The capability the editor persists through. Backends implement
//! [`PageStorage`]; history methods are optional and default to "not
//! supported".
//!
//! Two backends ship with the crate:
//! - **Memory**: process-local, for tests and previews
//! - **File**: one `<page>.json` per page plus `<page>-history.json`
//!
//! Both decode stored JSON through the legacy adapter, so percent-rect pages
//! come back as grid-cell documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use vantage_layout::{decode_document, LayoutConfig, PageDocument};

use crate::errors::StorageError;

/// One persisted history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub data: PageDocument,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl HistorySnapshot {
    pub fn now(data: PageDocument) -> Self {
        Self {
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
            version: None,
        }
    }
}

/// Storage capability consumed by the editor
pub trait PageStorage: Send + Sync + 'static {
    /// `Ok(None)` when the page does not exist yet
    fn load(&self, page_id: &str) -> impl Future<Output = Result<Option<PageDocument>, StorageError>> + Send;

    /// Persist a page. A backend may return its own normalized copy.
    fn save(
        &self,
        page_id: &str,
        document: &PageDocument,
    ) -> impl Future<Output = Result<Option<PageDocument>, StorageError>> + Send;

    fn delete(&self, _page_id: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        async { Ok(()) }
    }

    fn supports_history(&self) -> bool {
        false
    }

    fn save_history(
        &self,
        _page_id: &str,
        _snapshots: &[HistorySnapshot],
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async { Ok(()) }
    }

    fn load_history(&self, _page_id: &str) -> impl Future<Output = Result<Option<Vec<HistorySnapshot>>, StorageError>> + Send {
        async { Ok(None) }
    }

    fn clear_history(&self, _page_id: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        async { Ok(()) }
    }
}

/// In-memory backend. Pages are kept as raw JSON so legacy fixtures can be
/// seeded with [`MemoryStorage::insert_raw`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    layout: LayoutConfig,
    pages: RwLock<HashMap<String, Value>>,
    histories: RwLock<HashMap<String, Vec<HistorySnapshot>>>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub async fn insert_raw(&self, page_id: impl Into<String>, value: Value) {
        self.pages.write().await.insert(page_id.into(), value);
    }

    /// Stored page, decoded
    pub async fn get(&self, page_id: &str) -> Option<PageDocument> {
        let value = self.pages.read().await.get(page_id).cloned()?;
        decode_document(value, &self.layout).ok()
    }

    pub async fn history(&self, page_id: &str) -> Option<Vec<HistorySnapshot>> {
        self.histories.read().await.get(page_id).cloned()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PageStorage for MemoryStorage {
    async fn load(&self, page_id: &str) -> Result<Option<PageDocument>, StorageError> {
        let Some(value) = self.pages.read().await.get(page_id).cloned() else {
            return Ok(None);
        };
        Ok(Some(decode_document(value, &self.layout)?))
    }

    async fn save(&self, page_id: &str, document: &PageDocument) -> Result<Option<PageDocument>, StorageError> {
        let value = serde_json::to_value(document)?;
        self.pages.write().await.insert(page_id.to_string(), value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }

    async fn delete(&self, page_id: &str) -> Result<(), StorageError> {
        self.pages.write().await.remove(page_id);
        self.histories.write().await.remove(page_id);
        Ok(())
    }

    fn supports_history(&self) -> bool {
        true
    }

    async fn save_history(&self, page_id: &str, snapshots: &[HistorySnapshot]) -> Result<(), StorageError> {
        self.histories
            .write()
            .await
            .insert(page_id.to_string(), snapshots.to_vec());
        Ok(())
    }

    async fn load_history(&self, page_id: &str) -> Result<Option<Vec<HistorySnapshot>>, StorageError> {
        Ok(self.histories.read().await.get(page_id).cloned())
    }

    async fn clear_history(&self, page_id: &str) -> Result<(), StorageError> {
        self.histories.write().await.remove(page_id);
        Ok(())
    }
}

/// One JSON file per page under a root directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    layout: LayoutConfig,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, layout: LayoutConfig) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Page ids become file names, so only `[A-Za-z0-9_.-]` is accepted and
    /// a leading dot is rejected.
    fn validate(page_id: &str) -> Result<(), StorageError> {
        let valid = !page_id.is_empty()
            && !page_id.starts_with('.')
            && page_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(())
        } else {
            Err(StorageError::InvalidPageId(page_id.to_string()))
        }
    }

    pub fn page_path(&self, page_id: &str) -> Result<PathBuf, StorageError> {
        Self::validate(page_id)?;
        Ok(self.root.join(format!("{page_id}.json")))
    }

    pub fn history_path(&self, page_id: &str) -> Result<PathBuf, StorageError> {
        Self::validate(page_id)?;
        Ok(self.root.join(format!("{page_id}-history.json")))
    }

    /// Raw stored JSON, without decoding
    pub async fn load_raw(&self, page_id: &str) -> Result<Option<Value>, StorageError> {
        let path = self.page_path(page_id)?;
        match read_optional(&path).await? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_optional(path: &Path) -> Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl PageStorage for FileStorage {
    async fn load(&self, page_id: &str) -> Result<Option<PageDocument>, StorageError> {
        match self.load_raw(page_id).await? {
            Some(value) => Ok(Some(decode_document(value, &self.layout)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, page_id: &str, document: &PageDocument) -> Result<Option<PageDocument>, StorageError> {
        let path = self.page_path(page_id)?;
        self.write_json(&path, document).await?;
        Ok(None)
    }

    async fn delete(&self, page_id: &str) -> Result<(), StorageError> {
        remove_optional(&self.page_path(page_id)?).await?;
        remove_optional(&self.history_path(page_id)?).await
    }

    fn supports_history(&self) -> bool {
        true
    }

    async fn save_history(&self, page_id: &str, snapshots: &[HistorySnapshot]) -> Result<(), StorageError> {
        let path = self.history_path(page_id)?;
        self.write_json(&path, snapshots).await
    }

    async fn load_history(&self, page_id: &str) -> Result<Option<Vec<HistorySnapshot>>, StorageError> {
        let path = self.history_path(page_id)?;
        match read_optional(&path).await? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn clear_history(&self, page_id: &str) -> Result<(), StorageError> {
        remove_optional(&self.history_path(page_id)?).await
    }
}
