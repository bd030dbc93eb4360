//! Error types for the DevTools sync layer.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Internal fallible operations return [`Result<T>`] which uses [`Error`].
//! The public transport and replay surfaces fold these into the boolean,
//! status or `Option` results their callers expect, logging the detail:
//!
//! ```ignore
//! use devtools_sync::{DevToolsLogReader, Protocol, Result};
//!
//! fn first_event(path: &str) -> Result<()> {
//!     let mut reader = DevToolsLogReader::open(path)?;
//!     let entry = reader.try_next(Protocol::WebSocket)?;
//!     println!("{entry:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::IoContextClosed`] |
//! | Log replay | [`Error::LogHeader`], [`Error::Payload`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when the socket cannot reach the DevTools endpoint.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The I/O context thread is no longer accepting tasks.
    #[error("I/O context closed")]
    IoContextClosed,

    // ========================================================================
    // Log Replay Errors
    // ========================================================================
    /// A DevTools log header could not be decoded.
    ///
    /// The log stream is considered desynchronized after this.
    #[error("Could not read {field} from log entry header")]
    LogHeader {
        /// Header field that failed to decode.
        field: &'static str,
    },

    /// The payload following a log header could not be extracted.
    #[error("Problem parsing JSON from log file: {message}")]
    Payload {
        /// Description of the extraction failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a log header error for the field that failed to decode.
    #[inline]
    pub fn log_header(field: &'static str) -> Self {
        Self::LogHeader { field }
    }

    /// Creates a payload extraction error.
    #[inline]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::IoContextClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error came from decoding a recorded log.
    #[inline]
    #[must_use]
    pub fn is_log_error(&self) -> bool {
        matches!(self, Self::LogHeader { .. } | Self::Payload { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
