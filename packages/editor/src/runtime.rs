//! # Editor Runtime
//!
//! Runs one [`Editor`] on its own task and drives its timers.
//!
//! ```text
//! EditorHandle ──commands──▶ ┌──────────────┐ ──spawn──▶ storage.save()
//!                            │  editor task │                 │
//!       sleep_until(next) ─▶ │   (select!)  │ ◀─completions───┘
//!                            └──────────────┘
//! ```
//!
//! Edits run to completion one at a time. Saves run on spawned tasks so
//! edits keep flowing while I/O is in flight. At most one page save and one
//! history write are with storage at a time: requests arriving meanwhile
//! wait, and read the current document when they start, so writes land in
//! the order they were started. Dropping every handle, or calling
//! [`EditorHandle::shutdown`], unmounts the editor and discards its timers
//! and any waiting requests.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;
use vantage_layout::{Action, PageDocument};

use crate::config::EditorConfig;
use crate::editor::{clear_stored_history, write_history, Editor};
use crate::errors::{EditorError, StorageError};
use crate::save::PendingSave;
use crate::storage::{HistorySnapshot, PageStorage};

type EditFn<S> = Box<dyn FnOnce(&mut Editor<S>) + Send>;

enum Command<S> {
    Edit(EditFn<S>),
    Save {
        document: Option<PageDocument>,
        reply: oneshot::Sender<bool>,
    },
    ClearHistory(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

struct Completion {
    pending: PendingSave,
    result: Result<Option<PageDocument>, StorageError>,
    reply: Option<oneshot::Sender<bool>>,
}

/// A save waiting for the one in flight. `None` document means the current
/// one; no reply means an auto-save.
struct SaveRequest {
    document: Option<PageDocument>,
    reply: Option<oneshot::Sender<bool>>,
}

impl SaveRequest {
    fn is_auto(&self) -> bool {
        self.document.is_none() && self.reply.is_none()
    }
}

#[derive(Default)]
struct SaveQueue {
    in_flight: bool,
    waiting: VecDeque<SaveRequest>,
}

impl SaveQueue {
    fn request<S: PageStorage>(
        &mut self,
        editor: &mut Editor<S>,
        request: SaveRequest,
        done: &mpsc::UnboundedSender<Completion>,
    ) {
        if !self.in_flight {
            self.start(editor, request, done);
        } else if !(request.is_auto() && self.waiting.iter().any(SaveRequest::is_auto)) {
            self.waiting.push_back(request);
        }
    }

    fn start<S: PageStorage>(
        &mut self,
        editor: &mut Editor<S>,
        request: SaveRequest,
        done: &mpsc::UnboundedSender<Completion>,
    ) {
        let pending = editor.begin_save(request.document);
        spawn_save(editor, pending, request.reply, done.clone());
        self.in_flight = true;
    }

    /// The save in flight finished; start the next one still owed
    fn next<S: PageStorage>(&mut self, editor: &mut Editor<S>, done: &mpsc::UnboundedSender<Completion>) {
        self.in_flight = false;
        while let Some(request) = self.waiting.pop_front() {
            if request.is_auto() && !editor.is_dirty() {
                continue;
            }
            self.start(editor, request, done);
            return;
        }
    }
}

/// History writes, one at a time. A clear requested while a write is in
/// flight runs after it lands.
#[derive(Default)]
struct HistoryWrites {
    in_flight: bool,
    follow_up: bool,
    clears: Vec<oneshot::Sender<()>>,
}

impl HistoryWrites {
    fn write<S: PageStorage>(
        &mut self,
        editor: &Editor<S>,
        snapshots: Vec<HistorySnapshot>,
        done: &mpsc::UnboundedSender<()>,
    ) {
        if self.in_flight {
            self.follow_up = true;
            return;
        }
        self.in_flight = true;
        let storage = Arc::clone(editor.storage());
        let page_id = editor.page_id().to_string();
        let done = done.clone();
        tokio::spawn(async move {
            write_history(storage.as_ref(), &page_id, &snapshots).await;
            let _ = done.send(());
        });
    }

    async fn landed<S: PageStorage>(&mut self, editor: &mut Editor<S>, done: &mpsc::UnboundedSender<()>) {
        self.in_flight = false;
        if !self.clears.is_empty() {
            let storage = Arc::clone(editor.storage());
            let page_id = editor.page_id().to_string();
            clear_stored_history(storage.as_ref(), &page_id).await;
            for reply in self.clears.drain(..) {
                let _ = reply.send(());
            }
        }
        if std::mem::take(&mut self.follow_up) {
            let snapshots = editor.history().snapshots();
            self.write(editor, snapshots, done);
        }
    }
}

/// Cheap handle to an editor running on its own task
pub struct EditorHandle<S> {
    page_id: String,
    commands: mpsc::Sender<Command<S>>,
}

impl<S> Clone for EditorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            page_id: self.page_id.clone(),
            commands: self.commands.clone(),
        }
    }
}

impl<S: PageStorage> EditorHandle<S> {
    /// Move `editor` onto a new task
    pub fn spawn(editor: Editor<S>) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let page_id = editor.page_id().to_string();
        tokio::spawn(run(editor, rx));
        Self { page_id, commands: tx }
    }

    /// [`Editor::open`] followed by [`EditorHandle::spawn`]
    pub async fn open(
        page_id: impl Into<String>,
        config: EditorConfig,
        storage: Arc<S>,
        initial: Option<PageDocument>,
    ) -> Self {
        Self::spawn(Editor::open(page_id, config, storage, initial).await)
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Run `f` against the editor and return its result
    pub async fn edit<T, F>(&self, f: F) -> Result<T, EditorError>
    where
        F: FnOnce(&mut Editor<S>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let command = Command::Edit(Box::new(move |editor: &mut Editor<S>| {
            let _ = tx.send(f(editor));
        }));
        self.send(command).await?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    pub async fn apply(&self, action: Action) -> Result<bool, EditorError> {
        self.edit(move |editor| editor.apply(&action)).await
    }

    pub async fn document(&self) -> Result<PageDocument, EditorError> {
        self.edit(|editor| editor.document().clone()).await
    }

    pub async fn is_dirty(&self) -> Result<bool, EditorError> {
        self.edit(|editor| editor.is_dirty()).await
    }

    /// Save the current document. Resolves once storage answers, with
    /// whether it accepted the save.
    pub async fn save(&self) -> Result<bool, EditorError> {
        self.request_save(None).await
    }

    pub async fn save_document(&self, document: PageDocument) -> Result<bool, EditorError> {
        self.request_save(Some(document)).await
    }

    async fn request_save(&self, document: Option<PageDocument>) -> Result<bool, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Save { document, reply }).await?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    pub async fn clear_history(&self) -> Result<(), EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClearHistory(reply)).await?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    /// Unmount the editor. Pending timers and waiting saves never run; a
    /// save already handed to storage still completes there but is not
    /// applied.
    pub async fn shutdown(self) -> Result<(), EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown(reply)).await?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    async fn send(&self, command: Command<S>) -> Result<(), EditorError> {
        self.commands.send(command).await.map_err(|_| EditorError::Closed)
    }
}

async fn run<S: PageStorage>(mut editor: Editor<S>, mut commands: mpsc::Receiver<Command<S>>) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let (history_tx, mut history_rx) = mpsc::unbounded_channel::<()>();
    let mut saves = SaveQueue::default();
    let mut history = HistoryWrites::default();

    loop {
        let deadline = editor.next_deadline();

        tokio::select! {
            biased;

            Some(done) = done_rx.recv() => {
                let saved = editor.finish_save(done.pending, done.result);
                if let Some(reply) = done.reply {
                    let _ = reply.send(saved);
                }
                saves.next(&mut editor, &done_tx);
            }

            Some(()) = history_rx.recv() => {
                history.landed(&mut editor, &history_tx).await;
            }

            command = commands.recv() => match command {
                Some(Command::Edit(f)) => f(&mut editor),
                Some(Command::Save { document, reply }) => {
                    let request = SaveRequest { document, reply: Some(reply) };
                    saves.request(&mut editor, request, &done_tx);
                }
                Some(Command::ClearHistory(reply)) => {
                    if history.in_flight {
                        editor.reset_history();
                        history.follow_up = false;
                        history.clears.push(reply);
                    } else {
                        editor.clear_history().await;
                        let _ = reply.send(());
                    }
                }
                Some(Command::Shutdown(reply)) => {
                    editor.unmount();
                    let _ = reply.send(());
                    break;
                }
                None => {
                    editor.unmount();
                    break;
                }
            },

            _ = wait_until(deadline) => {
                let now = Instant::now();
                if editor.auto_save_due(now) {
                    debug!(page_id = %editor.page_id(), queued = saves.in_flight, "auto-save firing");
                    let request = SaveRequest { document: None, reply: None };
                    saves.request(&mut editor, request, &done_tx);
                }
                if let Some(snapshots) = editor.take_due_history(now) {
                    history.write(&editor, snapshots, &history_tx);
                }
            }
        }
    }

    debug!(page_id = %editor.page_id(), "editor task stopped");
}

fn spawn_save<S: PageStorage>(
    editor: &Editor<S>,
    pending: PendingSave,
    reply: Option<oneshot::Sender<bool>>,
    done: mpsc::UnboundedSender<Completion>,
) {
    let storage = Arc::clone(editor.storage());
    let page_id = editor.page_id().to_string();
    tokio::spawn(async move {
        let result = storage.save(&page_id, &pending.document).await;
        let _ = done.send(Completion { pending, result, reply });
    });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
