//! WebSocket transport for the browser editor.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use runpad_core::{DocumentSlot, Executor, FileSource, RunOrdering};
use runpad_session::{
    SessionManager,
    transfer::{ArtifactSink, ExportArtifact, TransferError},
};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ServerMessage};

/// WebSocket handler state.
///
/// Each connection gets its own session; all sessions share the persisted
/// slot and the executor.
#[derive(Clone)]
pub struct WsState {
    slot: Arc<dyn DocumentSlot>,
    executor: Arc<dyn Executor>,
    ordering: RunOrdering,
}

impl WsState {
    /// Create new WebSocket state.
    #[must_use]
    pub fn new(
        slot: Arc<dyn DocumentSlot>,
        executor: Arc<dyn Executor>,
        ordering: RunOrdering,
    ) -> Self {
        Self {
            slot,
            executor,
            ordering,
        }
    }

    /// Start a session whose downloads go to `tx`.
    #[must_use]
    pub fn open_session(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            Arc::clone(&self.slot),
            Arc::clone(&self.executor),
            Arc::new(DownloadSink { tx }),
            self.ordering,
        ))
    }
}

/// Delivers exports to the browser as download messages.
struct DownloadSink {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ArtifactSink for DownloadSink {
    fn deliver(&self, artifact: ExportArtifact) -> Result<(), TransferError> {
        self.tx
            .send(ServerMessage::download(artifact))
            .map_err(|_| TransferError::ChannelClosed)
    }
}

/// WebSocket upgrade handler.
///
/// Use this as an Axum route handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();
    let ws_id = Uuid::new_v4();

    // Channel for sending messages to the client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let manager = state.open_session(tx.clone());
    let mut updates = manager.subscribe();
    let _ = tx.send(ServerMessage::Snapshot(manager.snapshot().await));

    // Spawn task to push session changes to the client
    let update_tx = tx.clone();
    let update_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(snapshot) => {
                    if update_tx.send(ServerMessage::Snapshot(snapshot)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Snapshot listener lagged by {skipped}");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tracing::info!("WebSocket {ws_id} connected");

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t.as_str().to_owned(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid client message: {e}");
                let _ = tx.send(ServerMessage::Error {
                    message: format!("Invalid message: {e}"),
                });
                continue;
            }
        };

        handle_client_message(&manager, client_msg, &tx).await;
    }

    // In-flight runs keep the manager alive until they finish.
    update_task.abort();
    send_task.abort();

    tracing::info!("WebSocket {ws_id} disconnected");
}

/// Apply one client message to the session.
///
/// Runs are spawned so that a second run can start while the first is still
/// in flight.
pub async fn handle_client_message(
    manager: &Arc<SessionManager>,
    msg: ClientMessage,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    match msg {
        ClientMessage::Edit { text } => manager.on_edit(text).await,
        ClientMessage::InputEdit { text } => manager.on_input_edit(text).await,
        ClientMessage::Run => {
            let manager = Arc::clone(manager);
            tokio::spawn(async move { manager.on_run().await });
        }
        ClientMessage::ToggleTheme => manager.on_toggle_theme().await,
        ClientMessage::Export => manager.on_export().await,
        ClientMessage::Import { file } => {
            let uploaded = file.and_then(|payload| {
                let decoded = payload.decode();
                if decoded.is_none() {
                    tracing::warn!("Discarding undecodable upload '{}'", payload.name);
                }
                decoded
            });
            manager
                .on_import_selected(uploaded.as_ref().map(|f| f as &dyn FileSource))
                .await;
        }
        ClientMessage::Reset => manager.on_reset().await,
        ClientMessage::Ping => {
            let _ = tx.send(ServerMessage::Pong);
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use runpad_core::{DEFAULT_DOCUMENT, ExecutionResult, ExecutorError, RunRequest};
    use runpad_session::storage::MemoryStorage;

    use super::*;
    use crate::protocol::FilePayload;

    struct EchoExecutor;

    #[async_trait]
    impl Executor for EchoExecutor {
        async fn run(&self, request: &RunRequest) -> Result<ExecutionResult, ExecutorError> {
            Ok(ExecutionResult::success(request.input.clone()))
        }
    }

    fn session() -> (
        Arc<SessionManager>,
        mpsc::UnboundedReceiver<ServerMessage>,
        mpsc::UnboundedSender<ServerMessage>,
    ) {
        let state = WsState::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(EchoExecutor),
            RunOrdering::default(),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        (state.open_session(tx.clone()), rx, tx)
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let (manager, mut rx, tx) = session();
        handle_client_message(&manager, ClientMessage::Ping, &tx).await;
        assert_eq!(rx.recv().await, Some(ServerMessage::Pong));
    }

    #[tokio::test]
    async fn test_export_sends_download() {
        let (manager, mut rx, tx) = session();
        handle_client_message(&manager, ClientMessage::Export, &tx).await;

        let Some(ServerMessage::Download { file_name, data, .. }) = rx.recv().await else {
            panic!("expected download message");
        };
        assert_eq!(file_name, "code.py");
        assert_eq!(BASE64.decode(data).unwrap(), DEFAULT_DOCUMENT.as_bytes());
    }

    #[tokio::test]
    async fn test_run_is_spawned_and_applied() {
        let (manager, _rx, tx) = session();
        let mut updates = manager.subscribe();
        handle_client_message(&manager, ClientMessage::InputEdit { text: "42".into() }, &tx)
            .await;
        handle_client_message(&manager, ClientMessage::Run, &tx).await;

        // input edit, run requested, run completed
        let mut last = None;
        for _ in 0..3 {
            last = Some(updates.recv().await.unwrap());
        }
        assert_eq!(last.unwrap().output, "42");
    }

    #[tokio::test]
    async fn test_import_payload_and_cancel() {
        let (manager, _rx, tx) = session();

        let file = FilePayload::new("a.py", "print('a')".as_bytes());
        handle_client_message(&manager, ClientMessage::Import { file: Some(file) }, &tx).await;
        assert_eq!(manager.snapshot().await.document, "print('a')");

        handle_client_message(&manager, ClientMessage::Import { file: None }, &tx).await;
        let broken = FilePayload {
            name: "b.py".into(),
            data: "***".into(),
        };
        handle_client_message(&manager, ClientMessage::Import { file: Some(broken) }, &tx).await;
        assert_eq!(manager.snapshot().await.document, "print('a')");
    }

    #[tokio::test]
    async fn test_reset_after_edit() {
        let (manager, _rx, tx) = session();
        handle_client_message(&manager, ClientMessage::Edit { text: "x".into() }, &tx).await;
        handle_client_message(&manager, ClientMessage::Reset, &tx).await;
        assert_eq!(manager.snapshot().await.document, DEFAULT_DOCUMENT);
    }
}
