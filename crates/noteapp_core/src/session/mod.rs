//! Note list session (state holder).
//!
//! # Responsibility
//! - Merge the live ordered note list and user intents into one `NotesState`.
//! - Own the single-slot undo buffer for deleted notes.
//! - Serialize every store write issued on behalf of the UI.
//!
//! # Invariants
//! - Intents run one at a time, in arrival order, on a single actor task.
//! - At most one deleted note is recoverable; a newer delete silently makes
//!   the older one permanent.
//! - Nothing is published after the session is cancelled.
//! - A failed order change leaves order and live list untouched.
//! - Without a live list, every handled intent retries the subscription.
//!
//! # Threading
//! Store calls run inline on the actor task and block its worker thread
//! for their duration. Hosts backed by a disk store should run the session
//! on a multi-thread runtime.

mod state;

pub use state::{NotesEvent, NotesState};

use crate::clock::Clock;
use crate::model::note::{Note, NoteId};
use crate::model::order::NoteOrder;
use crate::repo::note_store::NoteStore;
use crate::service::note_service::{NoteError, NoteResult, NoteService, OrderedNotes};
use log::{debug, error, info, warn};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Restore window applied when none is configured.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error("note list session is shut down")]
    Closed,
}

/// Start-up options for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub initial_order: NoteOrder,
    /// How long a deleted note stays restorable. `None` keeps it until a
    /// newer delete or a restore.
    pub undo_window: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            initial_order: NoteOrder::default(),
            undo_window: Some(DEFAULT_UNDO_WINDOW),
        }
    }
}

enum Command {
    Event(NotesEvent, oneshot::Sender<NoteResult<()>>),
    Save(Note, oneshot::Sender<NoteResult<Note>>),
    Load(NoteId, oneshot::Sender<NoteResult<Option<Note>>>),
}

/// Handle to a running note list session.
///
/// Dropping the handle cancels the session.
pub struct NoteListSession {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<NotesState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl NoteListSession {
    /// Spawns the session actor on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn<S, C>(service: NoteService<S, C>, options: SessionOptions) -> Self
    where
        S: NoteStore + 'static,
        C: Clock + 'static,
    {
        let initial = NotesState {
            order: options.initial_order,
            ..NotesState::default()
        };
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let actor = SessionActor {
            service,
            state: initial,
            state_tx,
            undo_window: options.undo_window,
            undo_deadline: None,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(actor.run(command_rx));

        Self {
            commands: command_tx,
            state: state_rx,
            cancel,
            task: Some(task),
        }
    }

    /// Sends one intent and waits for it to be applied.
    ///
    /// Store failures are reported; an unsaved note passed to `DeleteNote`
    /// is ignored and reported as success.
    pub async fn dispatch(&self, event: NotesEvent) -> Result<(), SessionError> {
        self.request(|reply| Command::Event(event, reply)).await
    }

    /// Validates, stamps and persists a note (add/edit flow).
    pub async fn save_note(&self, note: Note) -> Result<Note, SessionError> {
        self.request(|reply| Command::Save(note, reply)).await
    }

    /// Loads one note for editing; `Ok(None)` when absent.
    pub async fn note_by_id(&self, id: NoteId) -> Result<Option<Note>, SessionError> {
        self.request(|reply| Command::Load(id, reply)).await
    }

    /// Current state snapshot.
    pub fn state(&self) -> NotesState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state.
    pub fn subscribe_state(&self) -> watch::Receiver<NotesState> {
        self.state.clone()
    }

    /// Cancels the session and waits for the actor to stop.
    ///
    /// After this returns no further state is published.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!("event=session_stop module=session status=error error={err}");
            }
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<NoteResult<T>>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .map_err(|_| SessionError::Closed)?;
        let result = reply_rx.await.map_err(|_| SessionError::Closed)?;
        Ok(result?)
    }
}

impl Drop for NoteListSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SessionActor<S: NoteStore, C: Clock> {
    service: NoteService<S, C>,
    state: NotesState,
    state_tx: watch::Sender<NotesState>,
    undo_window: Option<Duration>,
    undo_deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl<S: NoteStore, C: Clock> SessionActor<S, C> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(
            "event=session_start module=session status=ok order={:?}",
            self.state.order
        );
        let cancel = self.cancel.clone();
        let mut feed = self.subscribe(self.state.order);

        loop {
            let deadline = self.undo_deadline;
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if let Some(next) = self.handle(command) {
                        // Replacing the feed drops (cancels) the old subscription.
                        feed = Some(next);
                    }
                    if feed.is_none() {
                        feed = self.subscribe(self.state.order);
                    }
                }
                emission = next_emission(&mut feed) => match emission {
                    Some(notes) => {
                        self.state.notes = notes;
                        self.publish();
                    }
                    None => {
                        warn!("event=note_feed_closed module=session status=degraded");
                        feed = None;
                    }
                },
                () = sleep_until(deadline) => self.expire_undo(),
            }
        }

        info!("event=session_stop module=session status=ok");
    }

    fn subscribe(&self, order: NoteOrder) -> Option<OrderedNotes> {
        match self.service.get_notes(order) {
            Ok(feed) => Some(feed),
            Err(err) => {
                error!("event=note_subscribe module=session status=error order={order:?} error={err}");
                None
            }
        }
    }

    /// Applies one command; returns the replacement feed after an order change.
    fn handle(&mut self, command: Command) -> Option<OrderedNotes> {
        match command {
            Command::Event(event, reply) => {
                let (result, feed) = self.apply(event);
                let _ = reply.send(result);
                feed
            }
            Command::Save(note, reply) => {
                let _ = reply.send(self.service.add_or_update_note(note));
                None
            }
            Command::Load(id, reply) => {
                let _ = reply.send(self.service.get_note_by_id(id));
                None
            }
        }
    }

    fn apply(&mut self, event: NotesEvent) -> (NoteResult<()>, Option<OrderedNotes>) {
        match event {
            NotesEvent::ChangeOrder(order) => {
                if order == self.state.order {
                    return (Ok(()), None);
                }
                let feed = match self.service.get_notes(order) {
                    Ok(feed) => feed,
                    Err(err) => {
                        warn!("event=order_change module=session status=error order={order:?} error={err}");
                        return (Err(err), None);
                    }
                };
                debug!("event=order_change module=session status=ok order={order:?}");
                self.state.order = order;
                order.sort(&mut self.state.notes);
                self.publish();
                (Ok(()), Some(feed))
            }
            NotesEvent::ToggleOrderSection => {
                self.state.is_order_section_visible = !self.state.is_order_section_visible;
                self.publish();
                (Ok(()), None)
            }
            NotesEvent::DeleteNote(note) => (self.delete(note), None),
            NotesEvent::RestoreNote => (self.restore(), None),
        }
    }

    fn delete(&mut self, note: Note) -> NoteResult<()> {
        match self.service.delete_note(&note) {
            Ok(()) => {
                if let Some(previous) = self.state.recently_deleted.replace(note) {
                    debug!(
                        "event=undo_buffer module=session status=superseded id={}",
                        previous.id.unwrap_or_default()
                    );
                }
                self.undo_deadline = self.undo_window.map(|window| Instant::now() + window);
                self.publish();
                Ok(())
            }
            Err(NoteError::InvalidOperation(err)) => {
                warn!("event=note_delete module=session status=ignored reason=\"{err}\"");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn restore(&mut self) -> NoteResult<()> {
        let Some(note) = self.state.recently_deleted.take() else {
            return Ok(());
        };
        match self.service.restore_note(&note) {
            Ok(_) => {
                self.undo_deadline = None;
                self.publish();
                Ok(())
            }
            Err(err) => {
                // Keep the buffer so the user can retry the restore.
                self.state.recently_deleted = Some(note);
                Err(err)
            }
        }
    }

    fn expire_undo(&mut self) {
        self.undo_deadline = None;
        if let Some(note) = self.state.recently_deleted.take() {
            debug!(
                "event=undo_buffer module=session status=expired id={}",
                note.id.unwrap_or_default()
            );
            self.publish();
        }
    }

    fn publish(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state_tx.send_replace(self.state.clone());
    }
}

async fn next_emission(feed: &mut Option<OrderedNotes>) -> Option<Vec<Note>> {
    match feed {
        Some(feed) => feed.next().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
