//! # Save Coordination
//!
//! Dirty tracking and optimistic saves.
//!
//! A save has two states:
//!
//! ```text
//! begin(doc)  → proposed: doc is already the local state, I/O in flight
//! complete()  → confirmed: storage answered
//!                 Some(normalized) + no local edits since → adopt it
//!                 Some(normalized) + local edits since    → baseline only
//!                 None                                    → sent doc is baseline
//!                 Err                                     → nothing changes
//! ```
//!
//! Every local change bumps a revision counter; a save remembers the revision
//! it started at, which is how "no local edits since" is decided. A completion
//! older than one already applied means storage now holds the older write, so
//! that write becomes the baseline and the editor is dirty until the next save.

use std::time::Duration;
use tokio::time::Instant;
use vantage_layout::{normalize, PageDocument};

use crate::debounce::Debounce;
use crate::errors::StorageError;

/// A save that has been started but not completed
#[derive(Debug, Clone)]
pub struct PendingSave {
    id: u64,
    revision: u64,
    pub document: PageDocument,
}

impl PendingSave {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// Storage returned a normalized document that now replaces the local one
    Adopted(PageDocument),
    /// Baseline refreshed, local document kept
    Confirmed(PageDocument),
    /// Landed after a newer save; storage holds this older document
    Stale,
    Failed(StorageError),
}

#[derive(Debug)]
pub struct SaveCoordinator {
    baseline: Option<PageDocument>,
    revision: u64,
    applied_revision: Option<u64>,
    next_id: u64,
    reported_dirty: bool,
    auto_save: Option<Debounce>,
}

impl SaveCoordinator {
    /// `auto_save_delay` of `None` disables auto-save
    pub fn new(auto_save_delay: Option<Duration>) -> Self {
        Self {
            baseline: None,
            revision: 0,
            applied_revision: None,
            next_id: 0,
            reported_dirty: false,
            auto_save: auto_save_delay.map(Debounce::new),
        }
    }

    pub fn set_baseline(&mut self, document: PageDocument) {
        self.baseline = Some(document);
    }

    pub fn baseline(&self) -> Option<&PageDocument> {
        self.baseline.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self, current: &PageDocument) -> bool {
        self.baseline.as_ref().is_some_and(|baseline| baseline != current)
    }

    /// Dirty state if it flipped since the last call
    pub fn take_dirty_change(&mut self, current: &PageDocument) -> Option<bool> {
        let dirty = self.is_dirty(current);
        if dirty == self.reported_dirty {
            return None;
        }
        self.reported_dirty = dirty;
        Some(dirty)
    }

    /// Record a local change and restart the auto-save countdown
    pub fn touch(&mut self, now: Instant) {
        self.revision += 1;
        if let Some(timer) = &mut self.auto_save {
            timer.arm(now);
        }
    }

    pub fn auto_save_deadline(&self) -> Option<Instant> {
        self.auto_save.as_ref().and_then(Debounce::deadline)
    }

    pub fn auto_save_due(&mut self, now: Instant) -> bool {
        self.auto_save.as_mut().is_some_and(|timer| timer.fire(now))
    }

    /// Restart the auto-save countdown without recording a change
    pub fn arm_auto_save(&mut self, now: Instant) {
        if let Some(timer) = &mut self.auto_save {
            timer.arm(now);
        }
    }

    pub fn cancel_auto_save(&mut self) {
        if let Some(timer) = &mut self.auto_save {
            timer.cancel();
        }
    }

    pub fn begin(&mut self, document: PageDocument) -> PendingSave {
        self.next_id += 1;
        PendingSave {
            id: self.next_id,
            revision: self.revision,
            document,
        }
    }

    pub fn complete(
        &mut self,
        save: PendingSave,
        result: Result<Option<PageDocument>, StorageError>,
        default_section_height: f64,
    ) -> SaveOutcome {
        let returned = match result {
            Ok(returned) => returned,
            Err(e) => return SaveOutcome::Failed(e),
        };

        if self.applied_revision.is_some_and(|applied| applied > save.revision) {
            let written = match returned {
                Some(document) => normalize(&document, default_section_height),
                None => save.document,
            };
            self.baseline = Some(written);
            return SaveOutcome::Stale;
        }
        self.applied_revision = Some(save.revision);

        match returned {
            Some(document) => {
                let document = normalize(&document, default_section_height);
                self.baseline = Some(document.clone());
                if save.revision == self.revision {
                    SaveOutcome::Adopted(document)
                } else {
                    SaveOutcome::Confirmed(document)
                }
            }
            None => {
                self.baseline = Some(save.document.clone());
                SaveOutcome::Confirmed(save.document)
            }
        }
    }
}
