//! Remaining-time budgets for blocking operations.
//!
//! A [`Timeout`] is created once by the caller of a blocking operation and
//! queried on every wakeup to decide whether to keep waiting.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use devtools_sync::Timeout;
//!
//! let budget = Timeout::new(Duration::from_secs(5));
//! let step = budget.derive(Duration::from_secs(1));
//! assert!(step.remaining() <= Duration::from_secs(1));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

// ============================================================================
// Timeout
// ============================================================================

/// An absolute deadline, or no deadline at all.
///
/// Never mutated after creation; narrower budgets are made with
/// [`Timeout::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    /// Creates a budget expiring `duration` from now.
    #[inline]
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(duration),
        }
    }

    /// Creates a budget expiring at `deadline`.
    #[inline]
    #[must_use]
    pub const fn at(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Creates a budget that never expires.
    #[inline]
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { deadline: None }
    }

    /// Returns the deadline, if any.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline.
    ///
    /// Zero once expired, [`Duration::MAX`] when unbounded.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }

    /// Returns `true` once the remaining budget is zero.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Returns the shorter of this budget and one of `duration` from now.
    #[must_use]
    pub fn derive(&self, duration: Duration) -> Self {
        let child = Self::new(duration);
        match (self.deadline, child.deadline) {
            (Some(parent), Some(child)) => Self::at(parent.min(child)),
            (Some(parent), None) => Self::at(parent),
            (None, _) => child,
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::unbounded()
    }
}

// ============================================================================
// Tests
// ============================================================================
