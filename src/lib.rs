//! DevTools Sync - Blocking DevTools transport and recorded-traffic replay.
//!
//! This library lets a test-automation driver talk to a browser's
//! asynchronous remote-debugging protocol as if it were a simple blocking
//! call/response channel, or run against previously recorded traffic.
//!
//! # Architecture
//!
//! - **Transport**: [`SyncWebSocketImpl`] wraps a callback-driven WebSocket.
//!   All socket work runs on one [`IoContext`] thread; callers post tasks and
//!   block on per-call completion slots or on the received-message queue.
//! - **Replay**: [`DevToolsLogReader`] turns a free-form driver log back into
//!   [`LogEntry`] values; [`ReplaySocket`] serves them through the same
//!   [`SyncWebSocket`] trait.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use devtools_sync::{IoContext, SyncWebSocket, SyncWebSocketImpl, Timeout, Result};
//! use url::Url;
//!
//! fn main() -> Result<()> {
//!     let socket = SyncWebSocketImpl::new(IoContext::new()?);
//!     let url = Url::parse("ws://127.0.0.1:9222/devtools/browser").unwrap();
//!
//!     if socket.connect(&url) {
//!         socket.send(r#"{"id":1,"method":"Browser.getVersion"}"#);
//!         let reply = socket.receive_next_message(&Timeout::new(Duration::from_secs(10)));
//!         println!("{reply:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`replay`] | Log parsing and [`ReplaySocket`] |
//! | [`timeout`] | [`Timeout`] budgets |
//! | [`transport`] | Synchronous WebSocket and I/O context |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Recorded DevTools traffic: parsing and replay.
pub mod replay;

/// Remaining-time budgets for blocking operations.
pub mod timeout;

/// Synchronous WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Replay types
pub use replay::{DevToolsLogReader, EventType, LogEntry, Protocol, ReplaySocket};

// Timeout
pub use timeout::Timeout;

// Transport types
pub use transport::{
    ConnectionState, IoContext, Received, StatusCode, SyncWebSocket, SyncWebSocketImpl,
    SyncWebSocketOptions,
};
