//! Asynchronous socket seam and its tokio-tungstenite implementation.
//!
//! A [`Socket`] is created, connected, written to and dropped only on the
//! I/O context. It reports traffic back through a [`SocketListener`], whose
//! callbacks also fire only on the I/O context.
//!
//! # Event Loop
//!
//! [`TungsteniteSocket::connect`] spawns one tokio task on the I/O runtime
//! that handles:
//!
//! - The WebSocket handshake, reported through the connect callback
//! - Incoming text frames, forwarded to [`SocketListener::on_message`]
//! - Outgoing frames queued by [`Socket::send`]
//! - Close, error and end-of-stream, reported as [`SocketListener::on_close`]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Completion callback for [`Socket::connect`].
///
/// Invoked at most once, on the I/O context.
pub type ConnectCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Connected WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Traits
// ============================================================================

/// Sink for socket traffic.
pub trait SocketListener: Send + Sync {
    /// Called for every text message received.
    fn on_message(&self, message: &str);

    /// Called once when the connection is closed by the remote end or fails.
    fn on_close(&self);
}

/// An asynchronous, callback-driven WebSocket.
///
/// Not safe to touch outside the I/O context.
pub trait Socket: Send {
    /// Starts connecting; `on_complete` reports the outcome.
    fn connect(&mut self, on_complete: ConnectCallback);

    /// Queues a text message. Returns `false` if the socket cannot send.
    fn send(&mut self, message: &str) -> bool;
}

/// Creates sockets bound to a listener.
pub trait SocketFactory: Send + Sync {
    /// Creates an unconnected socket for `url`.
    fn create(&self, url: &Url, listener: Arc<dyn SocketListener>) -> Box<dyn Socket>;
}

// ============================================================================
// TungsteniteSocketFactory
// ============================================================================

/// Factory for [`TungsteniteSocket`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteSocketFactory;

impl SocketFactory for TungsteniteSocketFactory {
    fn create(&self, url: &Url, listener: Arc<dyn SocketListener>) -> Box<dyn Socket> {
        Box::new(TungsteniteSocket::new(url.clone(), listener))
    }
}

// ============================================================================
// TungsteniteSocket
// ============================================================================

/// WebSocket client built on `tokio-tungstenite`.
///
/// Must be connected from within the I/O context's runtime.
pub struct TungsteniteSocket {
    /// DevTools endpoint.
    url: Url,
    /// Receiver of incoming traffic.
    listener: Arc<dyn SocketListener>,
    /// Queue feeding the event loop's writer half.
    outgoing_tx: Option<mpsc::UnboundedSender<String>>,
    /// Event loop task.
    task: Option<JoinHandle<()>>,
}

impl TungsteniteSocket {
    /// Creates an unconnected socket.
    #[must_use]
    pub fn new(url: Url, listener: Arc<dyn SocketListener>) -> Self {
        Self {
            url,
            listener,
            outgoing_tx: None,
            task: None,
        }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut outgoing_rx: mpsc::UnboundedReceiver<String>,
        listener: Arc<dyn SocketListener>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from DevTools
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(len = text.len(), "Message received");
                            listener.on_message(&text);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Messages queued by Socket::send
                outgoing = outgoing_rx.recv() => {
                    match outgoing {
                        Some(text) => {
                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                warn!(error = %e, "Failed to send message");
                                break;
                            }
                        }

                        None => {
                            // Socket dropped; its owner no longer listens.
                            let _ = ws_write.close().await;
                            debug!("Socket released, event loop terminated");
                            return;
                        }
                    }
                }
            }
        }

        listener.on_close();
        debug!("Event loop terminated");
    }
}

impl Socket for TungsteniteSocket {
    fn connect(&mut self, on_complete: ConnectCallback) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        self.outgoing_tx = Some(outgoing_tx);

        let url = self.url.clone();
        let listener = Arc::clone(&self.listener);

        self.task = Some(tokio::spawn(async move {
            match connect_async(url.as_str()).await {
                Ok((ws_stream, _)) => {
                    debug!(%url, "WebSocket connected");
                    on_complete(Ok(()));
                    Self::run_event_loop(ws_stream, outgoing_rx, listener).await;
                }
                Err(e) => {
                    debug!(%url, error = %e, "WebSocket connect failed");
                    on_complete(Err(Error::WebSocket(e)));
                }
            }
        }));
    }

    fn send(&mut self, message: &str) -> bool {
        match &self.outgoing_tx {
            Some(tx) => tx.send(message.to_owned()).is_ok(),
            None => false,
        }
    }
}

impl Drop for TungsteniteSocket {
    fn drop(&mut self) {
        self.outgoing_tx = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
