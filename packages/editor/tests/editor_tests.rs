//! Integration tests for the page editor

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use vantage_editor::{Editor, EditorConfig, EditorEvent, MemoryStorage, PageStorage, StorageError};
use vantage_layout::{Breakpoint, GridPlacement, NewElement, PageDocument, Section};

fn page() -> PageDocument {
    let mut doc = PageDocument::new("home");
    doc.sections.push(Section {
        id: "hero".into(),
        full_width: true,
        height: 600.0,
        width: None,
        max_width: None,
    });
    doc
}

/// Backend that is always down
struct OfflineStorage;

impl PageStorage for OfflineStorage {
    async fn load(&self, _page_id: &str) -> Result<Option<PageDocument>, StorageError> {
        Err(StorageError::Backend("offline".into()))
    }

    async fn save(&self, _page_id: &str, _document: &PageDocument) -> Result<Option<PageDocument>, StorageError> {
        Err(StorageError::Backend("offline".into()))
    }
}

/// Backend that stamps every element it stores and hands the result back
#[derive(Default)]
struct StampingStorage {
    inner: MemoryStorage,
}

impl PageStorage for StampingStorage {
    async fn load(&self, page_id: &str) -> Result<Option<PageDocument>, StorageError> {
        self.inner.load(page_id).await
    }

    async fn save(&self, page_id: &str, document: &PageDocument) -> Result<Option<PageDocument>, StorageError> {
        let mut stored = document.clone();
        for element in &mut stored.elements {
            element.content.insert("stored".into(), json!(true));
        }
        self.inner.save(page_id, &stored).await?;
        Ok(Some(stored))
    }
}

#[tokio::test]
async fn test_edit_save_reload() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::open("home", EditorConfig::default(), storage.clone(), Some(page())).await;

    let id = editor.add_element(NewElement::new("heading"));
    assert!(editor.is_dirty());
    assert!(editor.save().await);
    assert!(!editor.is_dirty());

    let reopened = Editor::open("home", EditorConfig::default(), storage.clone(), None).await;
    assert_eq!(reopened.document(), editor.document());
    assert!(reopened.document().element(&id).is_some());
    assert!(storage.load("home").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_undo_back_to_saved_state_is_clean() {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::open("home", EditorConfig::default(), storage, Some(page())).await;

    editor.add_element(NewElement::new("text"));
    assert!(editor.is_dirty());
    editor.undo();
    assert!(!editor.is_dirty());
    editor.redo();
    assert!(editor.is_dirty());
}

#[tokio::test]
async fn test_load_failure_starts_empty() {
    let editor = Editor::open("home", EditorConfig::default(), Arc::new(OfflineStorage), None).await;
    assert_eq!(editor.page_id(), "home");
    assert!(editor.document().elements.is_empty());
    assert_eq!(editor.document().sections.len(), 1);
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_failed_save_stays_dirty() {
    let mut editor = Editor::with_document("home", EditorConfig::default(), Arc::new(OfflineStorage), page());
    let (tx, mut rx) = mpsc::unbounded_channel();
    editor.set_observer(tx);

    editor.add_element(NewElement::new("text"));
    assert!(!editor.save().await);
    assert!(editor.is_dirty());

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(events[0], EditorEvent::DirtyChanged(true)));
    assert!(matches!(events[1], EditorEvent::Saving(_)));
    assert!(!events.iter().any(|e| matches!(e, EditorEvent::Saved(_))));
}

#[tokio::test]
async fn test_returned_document_is_adopted() {
    let storage = Arc::new(StampingStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage, page());

    let id = editor.add_element(NewElement::new("text"));
    assert!(editor.save().await);

    let element = editor.document().element(&id).unwrap();
    assert_eq!(element.content.get("stored"), Some(&json!(true)));
    assert!(!editor.is_dirty());
    // adoption is not an undo step
    assert_eq!(editor.history().undo_levels(), 1);
}

#[tokio::test]
async fn test_returned_document_ignored_after_local_edit() {
    let storage = Arc::new(StampingStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage.clone(), page());

    let first = editor.add_element(NewElement::new("text"));
    let pending = editor.begin_save(None);
    editor.add_element(NewElement::new("image"));

    let result = storage.save("home", &pending.document).await;
    assert!(editor.finish_save(pending, result));

    let element = editor.document().element(&first).unwrap();
    assert!(element.content.get("stored").is_none());
    assert_eq!(editor.document().elements.len(), 2);
    assert!(editor.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn test_older_save_landing_last_leaves_page_dirty() {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage.clone(), page());

    editor.add_element(NewElement::new("text"));
    let older = editor.begin_save(None);
    editor.add_element(NewElement::new("image"));
    let newer = editor.begin_save(None);

    let result = storage.save("home", &newer.document).await;
    assert!(editor.finish_save(newer, result));
    assert!(!editor.is_dirty());
    assert_eq!(editor.next_deadline(), None);

    // storage now holds the one-element page
    let result = storage.save("home", &older.document).await;
    assert!(editor.finish_save(older, result));
    assert!(editor.is_dirty());
    assert!(editor.next_deadline().is_some());

    tokio::time::advance(Duration::from_millis(3000)).await;
    editor.poll_timers().await;
    assert!(!editor.is_dirty());
    assert_eq!(storage.get("home").await.as_ref(), Some(editor.document()));
}

#[tokio::test]
async fn test_last_section_is_kept() {
    let mut editor = Editor::with_document("home", EditorConfig::default(), Arc::new(MemoryStorage::default()), page());
    editor.add_element(NewElement::new("text"));

    assert!(!editor.delete_section("hero"));
    assert_eq!(editor.document().sections.len(), 1);

    let id = editor.add_element(NewElement::new("image"));
    let section = editor.document().element(&id).and_then(|el| el.section_id.clone());
    assert_eq!(section.as_deref(), Some("hero"));

    let extra = editor.add_section(false);
    assert!(editor.delete_section("hero"));
    assert!(editor.document().elements.iter().all(|el| el.in_section(&extra)));
}

#[tokio::test]
async fn test_legacy_page_is_converted_on_open() {
    let storage = Arc::new(MemoryStorage::default());
    storage
        .insert_raw(
            "old",
            json!({
                "pageId": "old",
                "elements": [{
                    "id": "logo", "type": "image", "content": {}, "zIndex": 0,
                    "layout": {
                        "desktop": { "x": 50, "y": 0, "w": 25, "h": 10 },
                        "responsive": true
                    }
                }]
            }),
        )
        .await;

    let editor = Editor::open("old", EditorConfig::default(), storage, None).await;
    let doc = editor.document();
    assert_eq!(doc.sections.len(), 1);

    let logo = doc.element("logo").unwrap();
    assert_eq!(logo.section_id.as_deref(), Some(doc.sections[0].id.as_str()));
    assert_eq!(logo.layout.desktop.column_start, 12);
    assert_eq!(logo.layout.desktop.column_end, 18);
}

#[tokio::test]
async fn test_observer_events() {
    let mut editor = Editor::with_document(
        "home",
        EditorConfig::default(),
        Arc::new(MemoryStorage::default()),
        page(),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    editor.set_observer(tx);

    let id = editor.add_element(NewElement::new("text"));
    assert_eq!(rx.try_recv().ok(), Some(EditorEvent::DirtyChanged(true)));

    editor.select([id.clone()]);
    assert_eq!(rx.try_recv().ok(), Some(EditorEvent::SelectionChanged(vec![id.clone()])));

    let placement = GridPlacement::new(2, 8, 0, 10);
    editor.update_layout(&id, Breakpoint::Desktop, placement);
    assert_eq!(
        rx.try_recv().ok(),
        Some(EditorEvent::ElementUpdated {
            id: id.clone(),
            breakpoint: Breakpoint::Desktop,
            placement,
        })
    );

    editor.add_element(NewElement::new("image"));
    editor.delete_element(&id);
    assert_eq!(rx.try_recv().ok(), Some(EditorEvent::SelectionChanged(Vec::new())));

    editor.save().await;
    assert!(matches!(rx.try_recv(), Ok(EditorEvent::Saving(_))));
    assert!(matches!(rx.try_recv(), Ok(EditorEvent::Saved(_))));
    assert_eq!(rx.try_recv().ok(), Some(EditorEvent::DirtyChanged(false)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_replacing_observer_takes_effect_immediately() {
    let mut editor = Editor::with_document(
        "home",
        EditorConfig::default(),
        Arc::new(MemoryStorage::default()),
        page(),
    );
    let (old_tx, mut old_rx) = mpsc::unbounded_channel();
    let (new_tx, mut new_rx) = mpsc::unbounded_channel();

    editor.set_observer(old_tx);
    editor.set_observer(new_tx);
    editor.add_element(NewElement::new("text"));

    assert!(old_rx.try_recv().is_err());
    assert_eq!(new_rx.try_recv().ok(), Some(EditorEvent::DirtyChanged(true)));
}

#[tokio::test(start_paused = true)]
async fn test_auto_save_is_debounced() {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage.clone(), page());

    editor.add_element(NewElement::new("text"));
    tokio::time::advance(Duration::from_millis(2000)).await;
    editor.add_element(NewElement::new("text"));
    tokio::time::advance(Duration::from_millis(2000)).await;
    editor.poll_timers().await;
    assert_eq!(storage.save_count(), 0);

    tokio::time::advance(Duration::from_millis(1000)).await;
    editor.poll_timers().await;
    assert_eq!(storage.save_count(), 1);
    assert!(!editor.is_dirty());
    assert_eq!(storage.get("home").await.unwrap().elements.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_auto_save_disabled() {
    let storage = Arc::new(MemoryStorage::default());
    let config = EditorConfig {
        auto_save_delay: 0,
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_document("home", config, storage.clone(), page());

    editor.add_element(NewElement::new("text"));
    assert_eq!(editor.next_deadline(), None);
    tokio::time::advance(Duration::from_secs(60)).await;
    editor.poll_timers().await;
    assert_eq!(storage.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_discards_pending_auto_save() {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage.clone(), page());

    editor.add_element(NewElement::new("text"));
    editor.unmount();
    tokio::time::advance(Duration::from_secs(10)).await;
    editor.poll_timers().await;
    assert_eq!(storage.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_history_survives_reopen() {
    let storage = Arc::new(MemoryStorage::default());
    let config = EditorConfig {
        persist_history: true,
        auto_save_delay: 0,
        ..EditorConfig::default()
    };

    let mut editor = Editor::open("home", config.clone(), storage.clone(), Some(page())).await;
    let id = editor.add_element(NewElement::new("text"));
    tokio::time::advance(Duration::from_millis(250)).await;
    editor.poll_timers().await;

    let snapshots = storage.history("home").await.unwrap();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(&snapshots[1].data, editor.document());

    let mut reopened = Editor::open("home", config, storage.clone(), None).await;
    assert!(reopened.document().element(&id).is_some());
    assert!(reopened.can_undo());
    // never saved, so it opens dirty
    assert!(reopened.is_dirty());

    reopened.undo();
    assert!(reopened.document().elements.is_empty());

    reopened.clear_history().await;
    assert!(!reopened.can_undo());
    assert!(storage.history("home").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_history_not_persisted_when_disabled() {
    let storage = Arc::new(MemoryStorage::default());
    let mut editor = Editor::with_document("home", EditorConfig::default(), storage.clone(), page());

    editor.add_element(NewElement::new("text"));
    tokio::time::advance(Duration::from_secs(1)).await;
    editor.poll_timers().await;
    assert!(storage.history("home").await.is_none());
}
