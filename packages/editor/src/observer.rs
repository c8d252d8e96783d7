//! Notifications the editor emits to the surrounding UI.
//!
//! The editor keeps a single boxed observer and calls through it at the
//! moment of the event, so replacing it with [`crate::Editor::set_observer`]
//! takes effect for the very next notification.

use tokio::sync::mpsc;
use vantage_layout::{Breakpoint, GridPlacement, PageDocument};

pub trait EditorObserver: Send {
    fn on_select(&mut self, _ids: &[String]) {}

    fn on_element_update(&mut self, _id: &str, _breakpoint: Breakpoint, _placement: GridPlacement) {}

    fn on_dirty_change(&mut self, _dirty: bool) {}

    /// A save is starting with `document` (fires before any I/O)
    fn on_save(&mut self, _document: &PageDocument) {}

    /// Storage accepted `document`
    fn on_saved(&mut self, _document: &PageDocument) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EditorObserver for NoopObserver {}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectionChanged(Vec<String>),
    ElementUpdated {
        id: String,
        breakpoint: Breakpoint,
        placement: GridPlacement,
    },
    DirtyChanged(bool),
    Saving(PageDocument),
    Saved(PageDocument),
}

/// Forward every notification as an [`EditorEvent`]. A closed receiver is ignored.
impl EditorObserver for mpsc::UnboundedSender<EditorEvent> {
    fn on_select(&mut self, ids: &[String]) {
        let _ = self.send(EditorEvent::SelectionChanged(ids.to_vec()));
    }

    fn on_element_update(&mut self, id: &str, breakpoint: Breakpoint, placement: GridPlacement) {
        let _ = self.send(EditorEvent::ElementUpdated {
            id: id.to_string(),
            breakpoint,
            placement,
        });
    }

    fn on_dirty_change(&mut self, dirty: bool) {
        let _ = self.send(EditorEvent::DirtyChanged(dirty));
    }

    fn on_save(&mut self, document: &PageDocument) {
        let _ = self.send(EditorEvent::Saving(document.clone()));
    }

    fn on_saved(&mut self, document: &PageDocument) {
        let _ = self.send(EditorEvent::Saved(document.clone()));
    }
}
