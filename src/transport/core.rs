//! Blocking core of the synchronous WebSocket.
//!
//! Bridges caller threads to the I/O context:
//!
//! - `connect` and `send` post a task to the I/O context, then block on a
//!   single-slot channel owned by that one call
//! - `receive_next_message` blocks on the queue's condition variable, which
//!   is notified on every received message and on close
//!
//! Messages queued before a close are still returned as messages; a receive
//! reports `Disconnected` only once the queue is empty, not as soon as the
//! connection flag drops.
//!
//! The socket itself lives in `socket` and is only touched from tasks
//! running on the I/O context.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::mpsc::{RecvTimeoutError, SyncSender, sync_channel};
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Result;
use crate::timeout::Timeout;

use super::io_context::IoContext;
use super::options::SyncWebSocketOptions;
use super::socket::{Socket, SocketFactory, SocketListener};
use super::sync_websocket::Received;

// ============================================================================
// ConnectionState
// ============================================================================

/// Connection lifecycle.
///
/// Written only on the I/O context; read anywhere under the queue lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No usable connection.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Handshake completed and no close seen since.
    Connected,
}

// ============================================================================
// MessageQueue
// ============================================================================

/// Received messages and connection state, guarded by one lock.
#[derive(Debug, Default)]
struct MessageQueue {
    /// FIFO of received messages.
    received: VecDeque<String>,
    /// Current connection state.
    state: ConnectionState,
    /// Bumped for every socket created; callbacks from older sockets are ignored.
    generation: u64,
}

// ============================================================================
// Core
// ============================================================================

/// Shared state behind [`SyncWebSocketImpl`](super::SyncWebSocketImpl).
///
/// Must be dropped on the I/O context; the façade holds it in an
/// [`IoBound`](super::IoBound).
pub(crate) struct Core {
    /// I/O context owning the socket.
    io: IoContext,
    /// Creates a socket per connect attempt.
    factory: Arc<dyn SocketFactory>,
    /// Retry policy.
    options: SyncWebSocketOptions,
    /// Received messages and connection state.
    queue: Mutex<MessageQueue>,
    /// Notified on every push and on close.
    on_update: Condvar,
    /// Current socket. I/O context only.
    socket: Mutex<Option<Box<dyn Socket>>>,
}

impl Core {
    /// Creates a disconnected core.
    pub(crate) fn new(
        io: IoContext,
        factory: Arc<dyn SocketFactory>,
        options: SyncWebSocketOptions,
    ) -> Self {
        Self {
            io,
            factory,
            options,
            queue: Mutex::new(MessageQueue::default()),
            on_update: Condvar::new(),
            socket: Mutex::new(None),
        }
    }

    /// Returns the I/O context this core is bound to.
    #[inline]
    pub(crate) fn io(&self) -> &IoContext {
        &self.io
    }

    // ========================================================================
    // Caller-side operations
    // ========================================================================

    /// Returns `true` while connected.
    pub(crate) fn is_connected(&self) -> bool {
        self.queue.lock().state == ConnectionState::Connected
    }

    /// Returns the current connection state.
    pub(crate) fn state(&self) -> ConnectionState {
        self.queue.lock().state
    }

    /// Connects to `url`, retrying on timeout.
    ///
    /// Returns the outcome of the first attempt that completes within its
    /// budget, or `false` once every attempt has timed out.
    pub(crate) fn connect(self: &Arc<Self>, url: &Url) -> bool {
        let attempts = self.options.connect_attempts.max(1);

        for attempt in 1..=attempts {
            // One slot per attempt; a late completion of an earlier attempt
            // writes into its own channel, never into this one.
            let (done_tx, done_rx) = sync_channel(1);

            let core = Arc::clone(self);
            let task_url = url.clone();
            if self
                .io
                .post(move || core.connect_on_io(&task_url, done_tx))
                .is_err()
            {
                warn!(%url, "I/O context closed, cannot connect");
                return false;
            }

            match done_rx.recv_timeout(self.options.connect_timeout) {
                Ok(success) => return success,

                // The task finished without reporting: an earlier attempt
                // connected in the meantime, or the socket dropped its callback.
                Err(RecvTimeoutError::Disconnected) => {
                    if self.is_connected() {
                        debug!(attempt, "Connected by an earlier attempt");
                        return true;
                    }
                }

                Err(RecvTimeoutError::Timeout) => {}
            }

            if attempt < attempts {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    "Timed out connecting to DevTools, retrying"
                );
            } else {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    "Timed out connecting to DevTools, giving up"
                );
            }
        }

        let core = Arc::clone(self);
        if self.io.post(move || core.abandon_connect_on_io()).is_err() {
            debug!("I/O context closed, abandoned attempt left as is");
        }
        false
    }

    /// Sends `message`, blocking until the I/O context has handed it to the socket.
    pub(crate) fn send(self: &Arc<Self>, message: &str) -> bool {
        let (done_tx, done_rx) = sync_channel(1);

        let core = Arc::clone(self);
        let message = message.to_owned();
        if self
            .io
            .post(move || core.send_on_io(&message, done_tx))
            .is_err()
        {
            warn!("I/O context closed, cannot send");
            return false;
        }

        done_rx.recv().unwrap_or(false)
    }

    /// Pops the next message, waiting up to `timeout` for one to arrive.
    ///
    /// Messages queued before a close are still delivered; `Disconnected`
    /// is reported once the queue is empty.
    pub(crate) fn receive_next_message(&self, timeout: &Timeout) -> Received {
        let mut queue = self.queue.lock();

        while queue.received.is_empty() && queue.state == ConnectionState::Connected {
            if timeout.is_expired() {
                return Received::Timeout;
            }
            match timeout.deadline() {
                Some(deadline) => {
                    self.on_update.wait_until(&mut queue, deadline);
                }
                None => self.on_update.wait(&mut queue),
            }
        }

        match queue.received.pop_front() {
            Some(message) => Received::Message(message),
            None => Received::Disconnected,
        }
    }

    /// Returns `true` if a message is waiting.
    pub(crate) fn has_next_message(&self) -> bool {
        !self.queue.lock().received.is_empty()
    }

    // ========================================================================
    // I/O context tasks
    // ========================================================================

    /// Creates and connects a fresh socket.
    fn connect_on_io(self: &Arc<Self>, url: &Url, done_tx: SyncSender<bool>) {
        let generation = {
            let mut queue = self.queue.lock();
            queue.received.clear();

            // A retry may find that an earlier attempt completed after its
            // caller stopped waiting. Return without reporting; `done_tx` is
            // dropped and the caller re-checks the state.
            if queue.state == ConnectionState::Connected && self.socket.lock().is_some() {
                return;
            }

            queue.generation += 1;
            queue.state = ConnectionState::Connecting;
            queue.generation
        };

        // Release the previous socket before its replacement exists.
        let previous = self.socket.lock().take();
        drop(previous);

        debug!(%url, generation, "Connecting");

        let listener: Arc<dyn SocketListener> = Arc::new(CoreListener {
            core: Arc::downgrade(self),
            generation,
        });
        let mut socket = self.factory.create(url, listener);

        let core = Arc::downgrade(self);
        socket.connect(Box::new(move |result| {
            if let Some(core) = core.upgrade() {
                core.on_connect_completed(generation, result, done_tx);
            }
        }));

        *self.socket.lock() = Some(socket);
    }

    /// Discards an attempt still in flight after the caller gave up.
    ///
    /// Runs after every connect task of the call, so no newer attempt exists.
    fn abandon_connect_on_io(&self) {
        {
            let mut queue = self.queue.lock();
            if queue.state != ConnectionState::Connecting {
                return;
            }
            // Late callbacks of the abandoned socket no longer match.
            queue.generation += 1;
            queue.state = ConnectionState::Disconnected;
            self.on_update.notify_all();
        }

        let abandoned = self.socket.lock().take();
        drop(abandoned);
        debug!("Abandoned connect attempt");
    }

    /// Records the handshake outcome and wakes the caller of this attempt.
    fn on_connect_completed(&self, generation: u64, result: Result<()>, done_tx: SyncSender<bool>) {
        let success = result.is_ok();

        let current = {
            let mut queue = self.queue.lock();
            let current = queue.generation == generation;
            if current {
                queue.state = if success {
                    ConnectionState::Connected
                } else {
                    ConnectionState::Disconnected
                };
            }
            self.on_update.notify_all();
            current
        };

        match result {
            Ok(()) if current => info!(generation, "DevTools WebSocket connected"),
            Err(e) if current => {
                warn!(generation, error = %e, "DevTools WebSocket connect failed");
            }
            _ => debug!(generation, success, "Ignoring completion of a replaced socket"),
        }

        // Fails harmlessly when the attempt's caller already gave up.
        let _ = done_tx.try_send(success);
    }

    /// Hands `message` to the current socket.
    fn send_on_io(&self, message: &str, done_tx: SyncSender<bool>) {
        let success = match self.socket.lock().as_mut() {
            Some(socket) => socket.send(message),
            None => {
                warn!("Send requested with no socket");
                false
            }
        };
        let _ = done_tx.try_send(success);
    }

    // ========================================================================
    // Socket callbacks (I/O context)
    // ========================================================================

    /// Queues a received message and wakes waiters.
    fn on_message_received(&self, generation: u64, message: &str) {
        let mut queue = self.queue.lock();
        if queue.generation != generation {
            return;
        }
        queue.received.push_back(message.to_owned());
        self.on_update.notify_all();
    }

    /// Marks the connection closed and wakes waiters.
    fn on_close(&self, generation: u64) {
        let mut queue = self.queue.lock();
        if queue.generation != generation {
            debug!(generation, "Ignoring close from a replaced socket");
            return;
        }
        queue.state = ConnectionState::Disconnected;
        self.on_update.notify_all();
        debug!(generation, "DevTools WebSocket closed");
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        debug!(
            on_io = self.io.belongs_to_current_thread(),
            "Releasing WebSocket core"
        );
    }
}

// ============================================================================
// CoreListener
// ============================================================================

/// Routes callbacks of one socket back to the core.
///
/// Holds a weak reference: the core owns the socket, which owns this.
struct CoreListener {
    core: Weak<Core>,
    generation: u64,
}

impl SocketListener for CoreListener {
    fn on_message(&self, message: &str) {
        if let Some(core) = self.core.upgrade() {
            core.on_message_received(self.generation, message);
        }
    }

    fn on_close(&self) {
        if let Some(core) = self.core.upgrade() {
            core.on_close(self.generation);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
