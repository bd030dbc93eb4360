//! Connection options for the synchronous WebSocket.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use devtools_sync::SyncWebSocketOptions;
//!
//! let options = SyncWebSocketOptions::new()
//!     .with_connect_attempts(5)
//!     .with_connect_timeout(Duration::from_secs(2));
//!
//! assert_eq!(options.connect_attempts, 5);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default number of connect attempts.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Default wait per connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SyncWebSocketOptions
// ============================================================================

/// Connect retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWebSocketOptions {
    /// Total connect attempts before giving up (at least one is made).
    pub connect_attempts: u32,

    /// How long each attempt waits for the handshake to complete.
    pub connect_timeout: Duration,
}

// ============================================================================
// Constructors
// ============================================================================

impl SyncWebSocketOptions {
    /// Creates options with the default policy: 3 attempts of 10s each.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for SyncWebSocketOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SyncWebSocketOptions {
    /// Sets the number of connect attempts.
    #[inline]
    #[must_use]
    pub const fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    /// Sets the wait per connect attempt.
    #[inline]
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
