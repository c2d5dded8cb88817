//! Session manager: applies events to the session state and runs their effects.

use std::sync::Arc;

use runpad_core::{
    DocumentSlot, Effect, ExecutionResult, Executor, FileSource, RunOrdering, RunTicket,
    SessionEvent, SessionSnapshot, SessionState,
};
use tokio::sync::{Mutex, broadcast};

use crate::{
    store::DocumentStore,
    transfer::{self, ArtifactSink},
};

/// Capacity of the snapshot broadcast channel.
const UPDATE_CAPACITY: usize = 64;

/// Single editor session.
///
/// Owns all in-memory session fields. Every event is applied under the state
/// lock, and its persistence and export effects complete before the lock is
/// released; the lock is never held across the executor or a file read, so
/// runs and imports overlap freely and apply in completion order.
pub struct SessionManager {
    state: Mutex<SessionState>,
    store: DocumentStore,
    executor: Arc<dyn Executor>,
    sink: Arc<dyn ArtifactSink>,
    updates: broadcast::Sender<SessionSnapshot>,
}

impl SessionManager {
    /// Start a session, loading the document from `slot`.
    #[must_use]
    pub fn new(
        slot: Arc<dyn DocumentSlot>,
        executor: Arc<dyn Executor>,
        sink: Arc<dyn ArtifactSink>,
        ordering: RunOrdering,
    ) -> Self {
        let store = DocumentStore::new(slot);
        let state = SessionState::new(store.load(), ordering);
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            state: Mutex::new(state),
            store,
            executor,
            sink,
            updates,
        }
    }

    /// Current view of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Receive a snapshot after every applied event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// The editor surface replaced the document.
    pub async fn on_edit(&self, text: impl Into<String>) {
        self.dispatch(SessionEvent::Edit(text.into())).await;
    }

    /// The program input changed.
    pub async fn on_input_edit(&self, text: impl Into<String>) {
        self.dispatch(SessionEvent::InputEdit(text.into())).await;
    }

    /// Submit the current document and input, then apply the outcome.
    ///
    /// Transport failures of any kind become the fixed connection error.
    pub async fn on_run(&self) {
        let Some(ticket) = self.dispatch(SessionEvent::RunRequested).await else {
            return;
        };
        let RunTicket { seq, request } = ticket;

        let result = match self.executor.run(&request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(seq, "Run failed: {e}");
                ExecutionResult::connection_failed()
            }
        };

        self.dispatch(SessionEvent::RunCompleted { seq, result }).await;
    }

    /// Flip the presentation mode.
    pub async fn on_toggle_theme(&self) {
        self.dispatch(SessionEvent::ToggleTheme).await;
    }

    /// Offer the document as a download.
    pub async fn on_export(&self) {
        self.dispatch(SessionEvent::ExportRequested).await;
    }

    /// Replace the document with the selected file's text.
    ///
    /// No selection, or a file that cannot be read, leaves the session as is.
    pub async fn on_import_selected(&self, file: Option<&dyn FileSource>) {
        if let Some(text) = transfer::import(file).await {
            self.dispatch(SessionEvent::ImportResolved(text)).await;
        }
    }

    /// Restore the default document and clear the last result.
    pub async fn on_reset(&self) {
        self.dispatch(SessionEvent::Reset).await;
    }

    async fn dispatch(&self, event: SessionEvent) -> Option<RunTicket> {
        let (ticket, snapshot) = {
            let mut state = self.state.lock().await;
            let mut ticket = None;
            for effect in state.apply(event) {
                match effect {
                    Effect::Persist(text) => self.store.save(&text),
                    Effect::Export(text) => {
                        if let Err(e) = self.sink.deliver(transfer::export(&text)) {
                            tracing::warn!("Export failed: {e}");
                        }
                    }
                    Effect::Execute(run) => ticket = Some(run),
                }
            }
            (ticket, state.snapshot())
        };

        // No listeners is fine.
        let _ = self.updates.send(snapshot);
        ticket
    }
}
