//! # Undo/Redo History
//!
//! Snapshot history over whole page documents.
//!
//! ## Design
//!
//! - `present` is the current document; `past` holds older ones (oldest first)
//! - Recording pushes `present` to `past` and clears `future`
//! - `past` is trimmed to `max_size`, oldest dropped first
//! - Undo and redo move `present` across without recording
//! - Change detection is structural: recording an equal document is a no-op
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new(doc, 50);
//!
//! history.record(edited);
//! assert!(history.can_undo());
//!
//! history.undo();
//! history.redo();
//! ```

use std::collections::VecDeque;
use vantage_layout::PageDocument;

use crate::storage::HistorySnapshot;

#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<PageDocument>,
    present: PageDocument,
    future: VecDeque<PageDocument>,
    max_size: usize,
}

impl History {
    pub fn new(present: PageDocument, max_size: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            max_size,
        }
    }

    /// Rebuild from persisted snapshots: the last one is the present.
    /// `None` when there are no snapshots.
    pub fn from_snapshots(snapshots: Vec<HistorySnapshot>, max_size: usize) -> Option<Self> {
        let mut docs: VecDeque<PageDocument> = snapshots.into_iter().map(|s| s.data).collect();
        let present = docs.pop_back()?;
        while docs.len() > max_size {
            docs.pop_front();
        }
        Some(Self {
            past: docs,
            present,
            future: VecDeque::new(),
            max_size,
        })
    }

    pub fn present(&self) -> &PageDocument {
        &self.present
    }

    /// Replace `present`. With `add_to_history` the old present is pushed to
    /// `past` and `future` is cleared; without it nothing else changes.
    pub fn update(&mut self, present: PageDocument, add_to_history: bool) {
        if !add_to_history {
            self.present = present;
            return;
        }

        let previous = std::mem::replace(&mut self.present, present);
        self.past.push_back(previous);
        while self.past.len() > self.max_size {
            self.past.pop_front();
        }

        // New edit invalidates redo
        self.future.clear();
    }

    /// Record `document` if it differs from `present`. Returns true if recorded.
    pub fn record(&mut self, document: PageDocument) -> bool {
        if document == self.present {
            return false;
        }
        self.update(document, true);
        true
    }

    /// Step back. Returns the new present, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&PageDocument> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        Some(&self.present)
    }

    /// Step forward. Returns the new present, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&PageDocument> {
        let next = self.future.pop_front()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        while self.past.len() > self.max_size {
            self.past.pop_front();
        }
        Some(&self.present)
    }

    /// Drop undo and redo levels, keep the present
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// `past` and `present` as one list, newest last, capped to the most
    /// recent `max_size` entries (at least the present).
    pub fn snapshots(&self) -> Vec<HistorySnapshot> {
        let keep = self.max_size.max(1);
        let all: Vec<&PageDocument> = self.past.iter().chain(std::iter::once(&self.present)).collect();
        let skip = all.len().saturating_sub(keep);
        all.into_iter()
            .skip(skip)
            .map(|doc| HistorySnapshot::now(doc.clone()))
            .collect()
    }
}
