//! Synchronous WebSocket façade.
//!
//! [`SyncWebSocketImpl`] gives callers a plain blocking call/response channel
//! over an asynchronous DevTools WebSocket. All socket work runs on an
//! [`IoContext`]; the façade only posts tasks and waits.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use devtools_sync::{IoContext, Received, SyncWebSocket, SyncWebSocketImpl, Timeout};
//! use url::Url;
//!
//! # fn example() -> devtools_sync::Result<()> {
//! let io = IoContext::new()?;
//! let socket = SyncWebSocketImpl::new(io);
//!
//! let url = Url::parse("ws://127.0.0.1:9222/devtools/page/1").unwrap();
//! if socket.connect(&url) && socket.send(r#"{"id":1,"method":"Page.enable"}"#) {
//!     match socket.receive_next_message(&Timeout::new(Duration::from_secs(5))) {
//!         Received::Message(text) => println!("{text}"),
//!         Received::Timeout => println!("no reply yet"),
//!         Received::Disconnected => println!("connection lost"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::timeout::Timeout;

use super::core::{ConnectionState, Core};
use super::io_context::{IoBound, IoContext};
use super::options::SyncWebSocketOptions;
use super::socket::{SocketFactory, TungsteniteSocketFactory};

// ============================================================================
// StatusCode / Received
// ============================================================================

/// Outcome class of a receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// A message was returned.
    Ok,
    /// The connection is gone and no message is queued.
    Disconnected,
    /// The budget ran out before a message arrived.
    Timeout,
}

/// Result of [`SyncWebSocket::receive_next_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// The next message, in arrival order.
    Message(String),
    /// The budget ran out before a message arrived.
    Timeout,
    /// The connection is gone and no message is queued.
    Disconnected,
}

impl Received {
    /// Returns the status code of this outcome.
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Message(_) => StatusCode::Ok,
            Self::Timeout => StatusCode::Timeout,
            Self::Disconnected => StatusCode::Disconnected,
        }
    }

    /// Returns the message, if one was received.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// SyncWebSocket
// ============================================================================

/// Blocking DevTools message channel.
///
/// Implemented by the live [`SyncWebSocketImpl`] and by
/// [`ReplaySocket`](crate::replay::ReplaySocket) for recorded traffic.
pub trait SyncWebSocket: Send {
    /// Returns `true` while connected.
    fn is_connected(&self) -> bool;

    /// Connects to `url`. Returns `false` once every attempt has failed.
    fn connect(&self, url: &Url) -> bool;

    /// Sends one text message. Returns `false` if it could not be sent.
    fn send(&self, message: &str) -> bool;

    /// Returns the next message, waiting at most until `timeout` expires.
    fn receive_next_message(&self, timeout: &Timeout) -> Received;

    /// Returns `true` if a message can be received without waiting.
    fn has_next_message(&self) -> bool;
}

// ============================================================================
// SyncWebSocketImpl
// ============================================================================

/// Live synchronous WebSocket.
///
/// # Thread Safety
///
/// Any thread except the I/O context's own may call these methods; calling
/// `connect` or `send` from a task on the I/O context would deadlock.
/// Dropping the façade releases the core on the I/O context.
pub struct SyncWebSocketImpl {
    core: IoBound<Core>,
}

impl fmt::Debug for SyncWebSocketImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncWebSocketImpl")
            .field("state", &self.core.state())
            .field("has_next_message", &self.core.has_next_message())
            .finish_non_exhaustive()
    }
}

impl SyncWebSocketImpl {
    /// Creates a disconnected socket using `tokio-tungstenite` and default options.
    #[must_use]
    pub fn new(io: IoContext) -> Self {
        Self::with_options(io, SyncWebSocketOptions::default())
    }

    /// Creates a disconnected socket using `tokio-tungstenite`.
    #[must_use]
    pub fn with_options(io: IoContext, options: SyncWebSocketOptions) -> Self {
        Self::with_factory(io, Arc::new(TungsteniteSocketFactory), options)
    }

    /// Creates a disconnected socket backed by sockets from `factory`.
    #[must_use]
    pub fn with_factory(
        io: IoContext,
        factory: Arc<dyn SocketFactory>,
        options: SyncWebSocketOptions,
    ) -> Self {
        let core = Core::new(io.clone(), factory, options);
        Self {
            core: IoBound::new(core, io),
        }
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.core.state()
    }
}

impl SyncWebSocket for SyncWebSocketImpl {
    fn is_connected(&self) -> bool {
        self.core.is_connected()
    }

    fn connect(&self, url: &Url) -> bool {
        self.core.as_arc().connect(url)
    }

    fn send(&self, message: &str) -> bool {
        self.core.as_arc().send(message)
    }

    fn receive_next_message(&self, timeout: &Timeout) -> Received {
        self.core.receive_next_message(timeout)
    }

    fn has_next_message(&self) -> bool {
        self.core.has_next_message()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::transport::core::tests::{Behavior, FakeFactory, run_on_io};

    const WAIT: Duration = Duration::from_secs(5);

    fn url() -> Url {
        Url::parse("ws://127.0.0.1:9222/devtools/browser").unwrap()
    }

    #[test]
    fn test_received_status() {
        assert_eq!(Received::Message("x".into()).status(), StatusCode::Ok);
        assert_eq!(Received::Timeout.status(), StatusCode::Timeout);
        assert_eq!(Received::Disconnected.status(), StatusCode::Disconnected);
        assert_eq!(Received::Message("x".into()).into_message(), Some("x".into()));
        assert_eq!(Received::Timeout.into_message(), None);
    }

    #[test]
    fn test_facade_round_trip() {
        let io = IoContext::new().expect("io context");
        let factory = FakeFactory::new([Behavior::Complete(true)]);
        let socket: Box<dyn SyncWebSocket> = Box::new(SyncWebSocketImpl::with_factory(
            io.clone(),
            factory.clone(),
            SyncWebSocketOptions::default(),
        ));

        assert!(!socket.is_connected());
        assert!(socket.connect(&url()));
        assert!(socket.is_connected());
        assert!(socket.send(r#"{"id":1,"method":"Target.getTargets"}"#));

        let listener = factory.last_listener();
        run_on_io(&io, move || listener.on_message(r#"{"id":1,"result":{}}"#));

        assert!(socket.has_next_message());
        let reply = socket.receive_next_message(&Timeout::new(WAIT));
        assert_eq!(reply.into_message().as_deref(), Some(r#"{"id":1,"result":{}}"#));
        assert!(!socket.has_next_message());
    }

    #[test]
    fn test_connect_failure_reports_false() {
        let io = IoContext::new().expect("io context");
        let factory = FakeFactory::new([Behavior::Never]);
        let options = SyncWebSocketOptions::new()
            .with_connect_attempts(2)
            .with_connect_timeout(Duration::from_millis(30));
        let socket = SyncWebSocketImpl::with_factory(io.clone(), factory.clone(), options);

        assert!(!socket.connect(&url()));
        assert_eq!(factory.created(), 2);

        run_on_io(&io, || {});
        assert_eq!(socket.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_drop_from_caller_thread() {
        let io = IoContext::new().expect("io context");
        let factory = FakeFactory::new([Behavior::Complete(true)]);
        let socket = SyncWebSocketImpl::with_factory(
            io.clone(),
            factory,
            SyncWebSocketOptions::default(),
        );
        assert!(socket.connect(&url()));
        drop(socket);

        // The release was queued behind earlier work and the context still runs.
        run_on_io(&io, || {});
    }
}
