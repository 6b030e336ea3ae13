//! CDP WebSocket connection implementation
//!
//! This module provides WebSocket-based connection to Chrome DevTools Protocol.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;

/// CDP timeout configuration
#[derive(Debug, Clone)]
struct CdpTimeoutConfig {
    /// Default timeout for most commands
    default_timeout: Duration,
    /// Timeout for page navigation commands
    navigation_timeout: Duration,
    /// Timeout for JavaScript execution
    execution_timeout: Duration,
}

impl Default for CdpTimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(60),
            execution_timeout: Duration::from_secs(30),
        }
    }
}

impl CdpTimeoutConfig {
    /// Get timeout duration for a specific command method
    fn timeout_for(&self, method: &str) -> Duration {
        match method {
            "Page.navigate" => self.navigation_timeout,
            "Runtime.evaluate" | "Runtime.callFunctionOn" => self.execution_timeout,
            _ => self.default_timeout,
        }
    }
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
///
/// The read half is owned by a background task that routes responses to
/// their waiters by id; the write half sits behind a lock so commands can be
/// issued from any task.
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Write half of the WebSocket
    sink: Mutex<SplitSink<WsStream, Message>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Timeout configuration
    timeout_config: CdpTimeoutConfig,
}

impl CdpWebSocketConnection {
    /// Create a new CDP WebSocket connection
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://127.0.0.1:9222/devtools/page/ABC123")
    pub async fn new<S: Into<String>>(url: S) -> Result<Arc<Self>, Error> {
        Self::with_navigation_timeout(url, CdpTimeoutConfig::default().navigation_timeout).await
    }

    /// Create a connection whose `Page.navigate` commands use the given timeout
    pub async fn with_navigation_timeout<S: Into<String>>(
        url: S,
        navigation_timeout: Duration,
    ) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("CdpWebSocketConnection::new: connecting to {}", url);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::websocket(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, stream) = ws_stream.split();
        let pending_commands: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let is_active = Arc::new(AtomicBool::new(true));

        tokio::spawn(Self::message_loop(
            stream,
            Arc::clone(&pending_commands),
            Arc::clone(&is_active),
        ));

        info!("CdpWebSocketConnection::new: connection established");

        Ok(Arc::new(Self {
            url,
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending_commands,
            is_active,
            timeout_config: CdpTimeoutConfig {
                navigation_timeout,
                ..CdpTimeoutConfig::default()
            },
        }))
    }

    /// WebSocket URL of this connection
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Message processing loop, runs until the socket closes
    async fn message_loop(
        mut stream: SplitStream<WsStream>,
        pending_commands: PendingMap,
        is_active: Arc<AtomicBool>,
    ) {
        debug!("CDP message loop started");

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    Self::handle_message(&text, &pending_commands).await;
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket read error, deactivating connection: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Waiters see a closed channel instead of hanging until their timeout
        pending_commands.lock().await.clear();

        debug!("CDP message loop exited");
    }

    /// Handle incoming WebSocket message
    async fn handle_message(text: &str, pending_commands: &PendingMap) {
        if let Ok(response) = serde_json::from_str::<CdpRpcResponse>(text) {
            Self::handle_response(response, pending_commands).await;
            return;
        }

        match serde_json::from_str::<CdpNotification>(text) {
            Ok(notification) => debug!("Ignoring event: {}", notification.method),
            Err(_) => warn!("Unknown message format: {}", text),
        }
    }

    /// Handle CDP response
    async fn handle_response(response: CdpRpcResponse, pending_commands: &PendingMap) {
        let pending = pending_commands.lock().await.remove(&response.id);

        match pending {
            Some(pending_cmd) => {
                debug!("Received response for command {}: {}", response.id, pending_cmd.method);

                let cdp_response = CdpResponse {
                    id: response.id,
                    result: Some(response.result),
                    error: response.error.map(|e| CdpErrorResponse {
                        code: e.code,
                        message: e.message,
                        data: e.data,
                    }),
                };

                let _ = pending_cmd.sender.send(cdp_response);
            }
            None => warn!("Received response for unknown command ID: {}", response.id),
        }
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };

        let json = serde_json::to_string(&request)
            .map_err(|e| Error::cdp(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = oneshot::channel();
        self.pending_commands.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        let sent = self.sink.lock().await.send(Message::Text(json)).await;
        if let Err(e) = sent {
            self.pending_commands.lock().await.remove(&id);
            return Err(Error::websocket(format!("Failed to send message: {}", e)));
        }

        let timeout_duration = self.timeout_config.timeout_for(method);

        match tokio::time::timeout(timeout_duration, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::websocket(format!(
                "Connection closed while waiting for {}",
                method
            ))),
            Err(_) => {
                self.pending_commands.lock().await.remove(&id);
                Err(Error::timeout(format!(
                    "Command {} ({}) timed out after {:?}",
                    id, method, timeout_duration
                )))
            }
        }
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        debug!("Closing CDP WebSocket connection to {}", self.url);

        if let Err(e) = self.sink.lock().await.close().await {
            error!("Failed to close WebSocket {}: {}", self.url, e);
            return Err(Error::websocket(format!("Failed to close WebSocket: {}", e)));
        }

        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
