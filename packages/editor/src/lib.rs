//! # Vantage Editor
//!
//! Page lifecycle for the Vantage layout engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ layout: pure PageDocument transforms        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one page, one owner                 │
//! │  - Undo/redo over whole-document snapshots  │
//! │  - Dirty tracking against the last save     │
//! │  - Optimistic saves, debounced auto-save    │
//! │  - Optional persisted history               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ storage: PageStorage (memory, files, ...)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **History present is the document**: there is no second copy to drift
//! 2. **Saves are optimistic**: the local document never waits for storage
//! 3. **Storage may normalize**: a returned document is adopted only when
//!    nothing changed locally since the save started
//! 4. **Failures are logged, not thrown**: a failed save leaves the page dirty
//!
//! ## Usage
//!
//! ### Direct
//!
//! ```rust,ignore
//! use vantage_editor::{Editor, EditorConfig, MemoryStorage};
//! use vantage_layout::NewElement;
//!
//! let storage = Arc::new(MemoryStorage::default());
//! let mut editor = Editor::open("home", EditorConfig::default(), storage, None).await;
//!
//! let id = editor.add_element(NewElement::new("text"));
//! editor.move_element(&id, 50.0, 0.0);
//! editor.undo();
//!
//! editor.save().await;
//! ```
//!
//! ### On its own task
//!
//! ```rust,ignore
//! use vantage_editor::EditorHandle;
//!
//! let handle = EditorHandle::open("home", config, storage, None).await;
//! handle.apply(Action::AddElement(NewElement::new("text"))).await?;
//!
//! // auto-save fires after the configured quiet period
//! handle.shutdown().await?;
//! ```

mod config;
mod debounce;
mod editor;
mod errors;
mod history;
mod observer;
mod runtime;
mod save;
mod storage;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use debounce::Debounce;
pub use editor::Editor;
pub use errors::{ConfigError, EditorError, StorageError};
pub use history::History;
pub use observer::{EditorEvent, EditorObserver, NoopObserver};
pub use runtime::EditorHandle;
pub use save::{PendingSave, SaveCoordinator, SaveOutcome};
pub use storage::{FileStorage, HistorySnapshot, MemoryStorage, PageStorage};
