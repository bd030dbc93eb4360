//! Recorded DevTools traffic: parsing and replay.
//!
//! Drivers log every DevTools message they exchange. This module reads those
//! logs back as structured entries and can serve them through the
//! [`SyncWebSocket`](crate::transport::SyncWebSocket) interface.
//!
//! # Log Format
//!
//! ```text
//! [1531428669.535][DEBUG]: DevTools HTTP Response: {
//!    "Browser": "Chrome/67.0.3396.99"
//! }
//! [1531428669.540][DEBUG]: DevTools WebSocket Command: Page.enable (id=1) {
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `header` | Header recognition and decoding |
//! | `log_entry` | [`LogEntry`] model |
//! | `payload` | Quote-aware payload extraction |
//! | `reader` | [`DevToolsLogReader`] |
//! | `socket` | [`ReplaySocket`] |

// ============================================================================
// Submodules
// ============================================================================

/// Header recognition and decoding.
pub mod header;

/// Parsed log entry model.
pub mod log_entry;

/// Quote-aware payload extraction.
pub mod payload;

/// Sequential log reader.
pub mod reader;

/// Recorded-traffic socket.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

pub use header::{HeaderCursor, is_header, parse_header};
pub use log_entry::{EventType, LogEntry, Protocol};
pub use payload::{count_delimiters, extract_payload};
pub use reader::{DevToolsLogReader, LineCursor, LogEntries};
pub use socket::ReplaySocket;
