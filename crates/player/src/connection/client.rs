//! Desktop engine client over tokio-tungstenite

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use uuid::Uuid;

use tableforge_protocol::{
    ClientMessage, RequestError, RequestPayload, ResponseResult, ServerMessage,
};

use super::core::{BackoffState, PendingRequests};
use super::port::{request_timeout_ms, GameConnectionPort};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Invalid engine URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Gave up connecting after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// A live connection to an engine.
///
/// Responses are correlated back to their requests by id; every other server
/// message (state syncs, transfer prompts, roster changes) is forwarded to
/// the event channel handed to `connect`.
pub struct EngineClient {
    writer: Mutex<WsSink>,
    pending: Arc<StdMutex<PendingRequests>>,
    reader: tokio::task::JoinHandle<()>,
}

impl EngineClient {
    /// Connect to an engine and spawn the read loop.
    pub async fn connect(
        url: &str,
        events: mpsc::Sender<ServerMessage>,
    ) -> Result<Self, ConnectError> {
        let url = Url::parse(url)?;
        let (stream, _) = connect_async(url.as_str()).await?;
        let (writer, mut read_half) = stream.split();

        let pending: Arc<StdMutex<PendingRequests>> =
            Arc::new(StdMutex::new(PendingRequests::default()));
        let pending_for_reader = pending.clone();

        let reader = tokio::spawn(async move {
            while let Some(message) = read_half.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(error = %e, "Engine connection read error");
                        break;
                    }
                };
                let Ok(text) = message.to_text() else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }
                let server_message: ServerMessage = match serde_json::from_str(text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::warn!(error = %e, "Malformed server message");
                        continue;
                    }
                };
                match server_message {
                    ServerMessage::Response { request_id, result } => {
                        let resolved = pending_for_reader
                            .lock()
                            .map(|mut p| p.resolve(&request_id, result))
                            .unwrap_or(false);
                        if !resolved {
                            tracing::debug!(request_id, "Response with no pending request");
                        }
                    }
                    other => {
                        if events.send(other).await.is_err() {
                            break;
                        }
                    }
                }
            }
            // Connection is gone: pending callers observe cancellation.
            if let Ok(mut pending) = pending_for_reader.lock() {
                let dropped = pending.clear();
                if dropped > 0 {
                    tracing::debug!(dropped, "Dropped pending requests on disconnect");
                }
            }
        });

        Ok(Self {
            writer: Mutex::new(writer),
            pending,
            reader,
        })
    }

    /// Connect with exponential backoff.
    pub async fn connect_with_backoff(
        url: &str,
        events: mpsc::Sender<ServerMessage>,
    ) -> Result<Self, ConnectError> {
        let mut backoff = BackoffState::default();
        loop {
            let Some(delay_ms) = backoff.next_delay_and_advance() else {
                return Err(ConnectError::Exhausted {
                    attempts: backoff.attempts(),
                });
            };
            if backoff.attempts() > 1 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            match Self::connect(url, events.clone()).await {
                Ok(client) => return Ok(client),
                Err(ConnectError::InvalidUrl(e)) => return Err(ConnectError::InvalidUrl(e)),
                Err(e) => {
                    tracing::warn!(error = %e, attempt = backoff.attempts(), "Connect attempt failed");
                }
            }
        }
    }

    /// Send a fire-and-forget client message (join, leave, heartbeat).
    pub async fn send(&self, message: ClientMessage) -> Result<(), RequestError> {
        let text = serde_json::to_string(&message)
            .map_err(|e| RequestError::SerializationError(e.to_string()))?;
        let mut writer = self.writer.lock().await;
        writer
            .send(Message::Text(text))
            .await
            .map_err(|e| RequestError::SendFailed(e.to_string()))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait::async_trait]
impl GameConnectionPort for EngineClient {
    async fn request(&self, payload: RequestPayload) -> Result<ResponseResult, RequestError> {
        self.request_with_timeout(payload, request_timeout_ms())
            .await
    }

    async fn request_with_timeout(
        &self,
        payload: RequestPayload,
        timeout_ms: u64,
    ) -> Result<ResponseResult, RequestError> {
        let request_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| RequestError::Cancelled)?;
            pending.insert(
                request_id.clone(),
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
        }

        let send_result = self
            .send(ClientMessage::Request {
                request_id: request_id.clone(),
                payload,
            })
            .await;
        if let Err(e) = send_result {
            if let Ok(mut pending) = self.pending.lock() {
                pending.remove(&request_id);
            }
            return Err(e);
        }

        match tokio::time::timeout(Duration::from_millis(timeout_ms), rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(RequestError::Cancelled),
            Err(_) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.remove(&request_id);
                }
                Err(RequestError::Timeout)
            }
        }
    }
}
