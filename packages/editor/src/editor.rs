//! # Page Editor
//!
//! One editor per page. It owns the canonical document (the history's
//! present), the save state, view state and both debounce timers.
//!
//! ## Lifecycle
//!
//! ```text
//! open → load + normalize → edit ⇄ undo/redo → save (manual or auto)
//!   ↓          ↓                ↓                  ↓
//! storage   baseline        history          optimistic, then confirmed
//! ```
//!
//! All methods that touch the document are synchronous. Storage calls
//! are either awaited here (`save`, `poll_timers`, `clear_history`) or
//! split into a `begin`/`finish` pair so a runtime can run the I/O
//! elsewhere; see [`crate::EditorHandle`].

use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use vantage_layout::actions::{ElementPatch, NewElement, ZDirection};
use vantage_layout::placement::move_group;
use vantage_layout::selection::marquee_select_px;
use vantage_layout::{
    normalize, Action, Breakpoint, Content, GridGeometry, GridPlacement, LayoutUpdate, PageDocument, PixelRect,
    Selection,
};

use crate::config::EditorConfig;
use crate::debounce::Debounce;
use crate::errors::StorageError;
use crate::history::History;
use crate::observer::{EditorObserver, NoopObserver};
use crate::save::{PendingSave, SaveCoordinator, SaveOutcome};
use crate::storage::{HistorySnapshot, PageStorage};

pub struct Editor<S> {
    page_id: String,
    config: EditorConfig,
    storage: Arc<S>,
    history: History,
    save: SaveCoordinator,
    /// Armed on history changes when history persistence is on
    history_persist: Option<Debounce>,
    selection: Selection,
    breakpoint: Breakpoint,
    show_grid: bool,
    observer: Box<dyn EditorObserver>,
}

impl<S: PageStorage> Editor<S> {
    /// Mount an editor on `page_id`.
    ///
    /// The document comes from `initial` when given, else from storage.
    /// Load failures are logged and the editor starts on an empty page.
    /// When history persistence is on and storage has snapshots, they seed
    /// undo history and the last one becomes the present.
    pub async fn open(
        page_id: impl Into<String>,
        config: EditorConfig,
        storage: Arc<S>,
        initial: Option<PageDocument>,
    ) -> Self {
        let page_id = page_id.into();

        let document = match initial {
            Some(doc) => doc,
            None => match storage.load(&page_id).await {
                Ok(Some(doc)) => {
                    info!(page_id = %page_id, elements = doc.elements.len(), "loaded page");
                    doc
                }
                Ok(None) => {
                    debug!(page_id = %page_id, "page not found, starting empty");
                    PageDocument::new(page_id.clone())
                }
                Err(e) => {
                    error!(page_id = %page_id, error = %e, "failed to load page");
                    PageDocument::new(page_id.clone())
                }
            },
        };

        let mut editor = Self::with_document(page_id, config, storage, document);
        if editor.history_persist.is_some() {
            editor.seed_history().await;
        }
        editor
    }

    /// Editor over an already loaded document. No storage reads happen.
    pub fn with_document(
        page_id: impl Into<String>,
        config: EditorConfig,
        storage: Arc<S>,
        document: PageDocument,
    ) -> Self {
        let document = normalize(&document, config.layout.default_section_height);
        let mut save = SaveCoordinator::new(config.auto_save_delay());
        save.set_baseline(document.clone());

        let history_persist =
            (config.persist_history && storage.supports_history()).then(|| Debounce::new(config.history_persist_delay()));

        Self {
            page_id: page_id.into(),
            history: History::new(document, config.max_history_size),
            save,
            history_persist,
            selection: Selection::new(),
            breakpoint: Breakpoint::Desktop,
            show_grid: true,
            observer: Box::new(NoopObserver),
            storage,
            config,
        }
    }

    async fn seed_history(&mut self) {
        match self.storage.load_history(&self.page_id).await {
            Ok(Some(snapshots)) => {
                let count = snapshots.len();
                if let Some(mut history) = History::from_snapshots(snapshots, self.config.max_history_size) {
                    let present = normalize(history.present(), self.config.layout.default_section_height);
                    history.update(present, false);
                    self.history = history;
                    info!(page_id = %self.page_id, snapshots = count, "restored history");
                    self.notify_dirty();
                }
            }
            Ok(None) => {}
            Err(e) => warn!(page_id = %self.page_id, error = %e, "failed to load history"),
        }
    }

    /// Replace the observer; the next notification goes to the new one
    pub fn set_observer(&mut self, observer: impl EditorObserver + 'static) {
        self.observer = Box::new(observer);
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn document(&self) -> &PageDocument {
        self.history.present()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn is_dirty(&self) -> bool {
        self.save.is_dirty(self.history.present())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // --- document changes ---

    /// Record `document` as the new present. Returns false when it equals
    /// the current one.
    pub fn commit(&mut self, document: PageDocument) -> bool {
        if !self.history.record(document) {
            return false;
        }
        self.document_changed();
        true
    }

    pub fn apply(&mut self, action: &Action) -> bool {
        let next = action.apply(self.document(), &self.config.layout);
        let changed = self.commit(next);
        if !changed {
            debug!(action = action.name(), "action left the document unchanged");
        }
        changed
    }

    fn document_changed(&mut self) {
        let now = Instant::now();
        self.save.touch(now);
        self.history_changed(now);

        if self.selection.retain_existing(self.history.present()) {
            let ids = self.selection.to_vec();
            self.observer.on_select(&ids);
        }
        self.notify_dirty();
    }

    fn history_changed(&mut self, now: Instant) {
        if let Some(timer) = &mut self.history_persist {
            timer.arm(now);
        }
    }

    fn notify_dirty(&mut self) {
        if let Some(dirty) = self.save.take_dirty_change(self.history.present()) {
            self.observer.on_dirty_change(dirty);
        }
    }

    fn notify_layout(&mut self, ids: &[String]) {
        let breakpoint = self.breakpoint;
        let placements: Vec<(String, GridPlacement)> = ids
            .iter()
            .filter_map(|id| {
                let element = self.history.present().element(id)?;
                Some((id.clone(), element.layout.resolve(breakpoint)))
            })
            .collect();
        for (id, placement) in placements {
            self.observer.on_element_update(&id, breakpoint, placement);
        }
    }

    // --- elements ---

    /// Add an element and return its id
    pub fn add_element(&mut self, new: NewElement) -> String {
        let id = new.id.clone();
        self.apply(&Action::AddElement(new));
        id
    }

    pub fn update_element(&mut self, id: &str, patch: ElementPatch) -> bool {
        self.apply(&Action::UpdateElement {
            id: id.to_string(),
            patch,
        })
    }

    pub fn update_element_content(&mut self, id: &str, content: Content) -> bool {
        self.apply(&Action::UpdateContent {
            id: id.to_string(),
            content,
        })
    }

    pub fn delete_element(&mut self, id: &str) -> bool {
        self.apply(&Action::DeleteElement { id: id.to_string() })
    }

    pub fn update_z_index(&mut self, id: &str, direction: ZDirection) -> bool {
        self.apply(&Action::UpdateZIndex {
            id: id.to_string(),
            direction,
        })
    }

    pub fn update_layout(&mut self, id: &str, breakpoint: Breakpoint, placement: GridPlacement) -> bool {
        let changed = self.apply(&Action::UpdateLayout {
            id: id.to_string(),
            breakpoint,
            placement,
        });
        if changed && breakpoint == self.breakpoint {
            self.notify_layout(&[id.to_string()]);
        }
        changed
    }

    pub fn update_layout_bulk(&mut self, breakpoint: Breakpoint, updates: Vec<LayoutUpdate>) -> bool {
        let ids: Vec<String> = updates.iter().map(|u| u.id.clone()).collect();
        let changed = self.apply(&Action::UpdateLayoutBulk { breakpoint, updates });
        if changed && breakpoint == self.breakpoint {
            self.notify_layout(&ids);
        }
        changed
    }

    /// Grid of the section `element_id` lives in, at the active breakpoint
    pub fn geometry_for(&self, element_id: &str) -> Option<GridGeometry> {
        let doc = self.document();
        let element = doc.element(element_id)?;
        Some(GridGeometry::for_section(
            doc.section_of(element),
            self.breakpoint,
            &self.config.layout,
        ))
    }

    /// Commit a drag by `(dx, dy)` px at the active breakpoint.
    ///
    /// When the element is part of a multi-selection the whole selection
    /// moves by the delta the element itself ended up moving.
    pub fn move_element(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        let Some(geometry) = self.geometry_for(id) else {
            debug!(id, "move_element: element not found");
            return false;
        };
        let breakpoint = self.breakpoint;
        let doc = self.document();
        let before = match doc.element(id) {
            Some(element) => element.layout.resolve(breakpoint),
            None => return false,
        };
        let proposed = geometry.commit_move(before, dx, dy);

        let updates = if self.selection.contains(id) && self.selection.len() > 1 {
            let others: Vec<(&str, GridPlacement)> = self
                .selection
                .ids()
                .filter(|other| *other != id)
                .filter_map(|other| Some((other, doc.element(other)?.layout.resolve(breakpoint))))
                .collect();
            move_group(&geometry, id, before, proposed, others)
        } else {
            vec![LayoutUpdate::new(id, proposed)]
        };

        self.update_layout_bulk(breakpoint, updates)
    }

    /// Commit a resize to `rect` (px, relative to the section) at the
    /// active breakpoint, honoring the element's snapping and aspect ratio.
    pub fn resize_element(&mut self, id: &str, rect: PixelRect) -> bool {
        let Some(geometry) = self.geometry_for(id) else {
            debug!(id, "resize_element: element not found");
            return false;
        };
        let Some(element) = self.document().element(id) else {
            return false;
        };
        let placement = geometry.commit_resize(rect, element.snaps_to_grid(), element.aspect_ratio);
        self.update_layout(id, self.breakpoint, placement)
    }

    // --- sections ---

    /// Add a section and return its id
    pub fn add_section(&mut self, full_width: bool) -> String {
        let id = vantage_layout::ids::section_id();
        self.apply(&Action::AddSection {
            id: Some(id.clone()),
            full_width,
        });
        id
    }

    /// Remove a section, moving its elements to the first remaining one.
    /// Returns false for the page's last section.
    pub fn delete_section(&mut self, id: &str) -> bool {
        self.apply(&Action::DeleteSection { id: id.to_string() })
    }

    pub fn update_section_height(&mut self, id: &str, height: f64) -> bool {
        self.apply(&Action::UpdateSectionHeight {
            id: id.to_string(),
            height,
        })
    }

    pub fn update_section_width(&mut self, id: &str, width: f64) -> bool {
        self.apply(&Action::UpdateSectionWidth {
            id: id.to_string(),
            width,
        })
    }

    pub fn update_section_full_width(&mut self, id: &str, full_width: bool) -> bool {
        self.apply(&Action::UpdateSectionFullWidth {
            id: id.to_string(),
            full_width,
        })
    }

    pub fn total_height(&self) -> f64 {
        vantage_layout::total_page_height(&self.document().sections, self.config.layout.default_canvas_height)
    }

    // --- history ---

    /// Step back. The restored document is not re-recorded.
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.document_changed();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.document_changed();
        true
    }

    /// Drop undo/redo levels locally. Storage is not touched; see
    /// [`Editor::clear_history`].
    pub fn reset_history(&mut self) {
        self.history.clear();
        if let Some(timer) = &mut self.history_persist {
            timer.cancel();
        }
    }

    /// Drop undo/redo levels and the persisted history
    pub async fn clear_history(&mut self) {
        self.reset_history();
        if self.persists_history() {
            clear_stored_history(self.storage.as_ref(), &self.page_id).await;
        }
    }

    // --- selection & view ---

    pub fn select<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let before = self.selection.clone();
        self.selection.select(ids);
        self.selection.retain_existing(self.history.present());
        if self.selection != before {
            let ids = self.selection.to_vec();
            self.observer.on_select(&ids);
        }
    }

    /// Plain click on an element
    pub fn click(&mut self, id: &str) {
        let before = self.selection.clone();
        self.selection.click(id);
        self.selection.retain_existing(self.history.present());
        if self.selection != before {
            let ids = self.selection.to_vec();
            self.observer.on_select(&ids);
        }
    }

    /// Modifier click on an element
    pub fn toggle_select(&mut self, id: &str) {
        if self.document().element(id).is_none() {
            return;
        }
        self.selection.toggle(id);
        let ids = self.selection.to_vec();
        self.observer.on_select(&ids);
    }

    pub fn clear_selection(&mut self) {
        self.select(Vec::<String>::new());
    }

    /// Select everything in `section_id` hit by a rubber-band `rect`
    /// (px, relative to the section)
    pub fn marquee_select(&mut self, section_id: &str, rect: PixelRect) -> Vec<String> {
        let doc = self.document();
        let grid = GridGeometry::for_section(doc.section(section_id), self.breakpoint, &self.config.layout);
        let hits = marquee_select_px(doc, section_id, self.breakpoint, &grid, rect);
        self.select(hits.clone());
        hits
    }

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.breakpoint = breakpoint;
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }

    // --- saving ---

    /// Start a save of `document`, or of the current document when `None`.
    /// The observer hears about it before any I/O; a save of the current
    /// document also cancels a pending auto-save.
    pub fn begin_save(&mut self, document: Option<PageDocument>) -> PendingSave {
        let document = match document {
            Some(doc) => doc,
            None => {
                self.save.cancel_auto_save();
                self.history.present().clone()
            }
        };
        self.observer.on_save(&document);
        self.save.begin(document)
    }

    /// Apply the storage result of a save started with [`Editor::begin_save`].
    /// Returns true if storage accepted it.
    pub fn finish_save(&mut self, pending: PendingSave, result: Result<Option<PageDocument>, StorageError>) -> bool {
        let save_id = pending.id();
        let outcome = self
            .save
            .complete(pending, result, self.config.layout.default_section_height);

        let saved = match outcome {
            SaveOutcome::Adopted(document) => {
                info!(page_id = %self.page_id, save_id, "saved, adopting returned document");
                self.history.update(document.clone(), false);
                if self.selection.retain_existing(self.history.present()) {
                    let ids = self.selection.to_vec();
                    self.observer.on_select(&ids);
                }
                self.observer.on_saved(&document);
                true
            }
            SaveOutcome::Confirmed(document) => {
                info!(page_id = %self.page_id, save_id, "saved");
                self.observer.on_saved(&document);
                true
            }
            SaveOutcome::Stale => {
                warn!(page_id = %self.page_id, save_id, "older save landed last, saving again");
                self.save.arm_auto_save(Instant::now());
                true
            }
            SaveOutcome::Failed(e) => {
                error!(page_id = %self.page_id, save_id, error = %e, "failed to save page");
                false
            }
        };

        self.notify_dirty();
        saved
    }

    /// Save the current document and wait for storage
    pub async fn save(&mut self) -> bool {
        let pending = self.begin_save(None);
        let result = self.storage.save(&self.page_id, &pending.document).await;
        self.finish_save(pending, result)
    }

    /// Save a caller-supplied document instead of the current one
    pub async fn save_document(&mut self, document: PageDocument) -> bool {
        let pending = self.begin_save(Some(document));
        let result = self.storage.save(&self.page_id, &pending.document).await;
        self.finish_save(pending, result)
    }

    // --- timers ---

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        let history = self.history_persist.as_ref().and_then(Debounce::deadline);
        match (self.save.auto_save_deadline(), history) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Consume the auto-save timer if its deadline has passed. True when a
    /// save is owed; a clean document owes nothing.
    pub fn auto_save_due(&mut self, now: Instant) -> bool {
        if !self.save.auto_save_due(now) {
            return false;
        }
        if !self.is_dirty() {
            debug!(page_id = %self.page_id, "auto-save skipped, document is clean");
            return false;
        }
        true
    }

    /// Start the auto-save if its deadline has passed. The document is read
    /// now, not when the timer was armed.
    pub fn take_due_save(&mut self, now: Instant) -> Option<PendingSave> {
        if !self.auto_save_due(now) {
            return None;
        }
        debug!(page_id = %self.page_id, "auto-save firing");
        Some(self.begin_save(None))
    }

    /// Snapshots to persist if the history timer has fired
    pub fn take_due_history(&mut self, now: Instant) -> Option<Vec<HistorySnapshot>> {
        let timer = self.history_persist.as_mut()?;
        if !timer.fire(now) {
            return None;
        }
        Some(self.history.snapshots())
    }

    /// Run whatever timers are due, awaiting storage inline
    pub async fn poll_timers(&mut self) {
        let now = Instant::now();
        if let Some(pending) = self.take_due_save(now) {
            let result = self.storage.save(&self.page_id, &pending.document).await;
            self.finish_save(pending, result);
        }
        if let Some(snapshots) = self.take_due_history(now) {
            write_history(self.storage.as_ref(), &self.page_id, &snapshots).await;
        }
    }

    /// Whether history changes are written to storage
    fn persists_history(&self) -> bool {
        self.history_persist.is_some()
    }

    /// Cancel every pending timer. Nothing scheduled before this fires.
    pub fn unmount(&mut self) {
        self.save.cancel_auto_save();
        if let Some(timer) = &mut self.history_persist {
            timer.cancel();
        }
        debug!(page_id = %self.page_id, "editor unmounted");
    }
}

/// Best-effort history write; failures are logged
pub(crate) async fn write_history<S: PageStorage>(storage: &S, page_id: &str, snapshots: &[HistorySnapshot]) {
    match storage.save_history(page_id, snapshots).await {
        Ok(()) => debug!(page_id, snapshots = snapshots.len(), "persisted history"),
        Err(e) => warn!(page_id, error = %e, "failed to persist history"),
    }
}

pub(crate) async fn clear_stored_history<S: PageStorage>(storage: &S, page_id: &str) {
    if let Err(e) = storage.clear_history(page_id).await {
        warn!(page_id, error = %e, "failed to clear history");
    }
}
