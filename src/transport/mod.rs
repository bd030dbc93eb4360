//! Synchronous WebSocket transport layer.
//!
//! This module turns the callback-driven DevTools WebSocket into a blocking
//! call/response channel for test drivers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   post(task)    ┌──────────────────────────┐
//! │  Caller thread   │ ──────────────► │  I/O context thread      │
//! │                  │                 │                          │
//! │ SyncWebSocketImpl│  one-shot slot  │  Socket (tungstenite)    │
//! │   connect/send   │ ◄────────────── │   connect / send         │
//! │                  │                 │                          │
//! │   receive  ◄─────┼── queue+condvar ┼── on_message / on_close  │
//! └──────────────────┘                 └──────────────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `IoContext::new` - Spawn the I/O thread
//! 2. `SyncWebSocketImpl::new` - Create the façade, bound to that context
//! 3. `connect` - Up to 3 attempts, 10s each
//! 4. `send` / `receive_next_message` - Blocking traffic
//! 5. Drop - Core released on the I/O context
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Message queue, connection state and blocking logic |
//! | `io_context` | I/O thread and context-bound ownership |
//! | `options` | Connect retry policy |
//! | `socket` | Socket seam and tokio-tungstenite implementation |
//! | `sync_websocket` | Public façade and `SyncWebSocket` trait |

// ============================================================================
// Submodules
// ============================================================================

/// Message queue, connection state and blocking logic.
mod core;

/// I/O thread and context-bound ownership.
pub mod io_context;

/// Connect retry policy.
pub mod options;

/// Socket seam and tokio-tungstenite implementation.
pub mod socket;

/// Public façade and `SyncWebSocket` trait.
pub mod sync_websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::ConnectionState;
pub use io_context::{IoBound, IoContext};
pub use options::SyncWebSocketOptions;
pub use socket::{
    ConnectCallback, Socket, SocketFactory, SocketListener, TungsteniteSocket,
    TungsteniteSocketFactory,
};
pub use sync_websocket::{Received, StatusCode, SyncWebSocket, SyncWebSocketImpl};
