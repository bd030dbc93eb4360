//! Single-threaded I/O context.
//!
//! All socket construction, connect/send initiation and socket callbacks
//! run on one dedicated thread. Callers hand work over with
//! [`IoContext::post`] and never touch socket state directly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     post(task)      ┌─────────────────────────────┐
//! │ Caller thread│ ──────────────────► │ devtools-io thread          │
//! │              │   unbounded mpsc    │  current_thread runtime     │
//! │              │                     │  task loop + socket tasks   │
//! └──────────────┘                     └─────────────────────────────┘
//! ```
//!
//! The thread exits once every [`IoContext`] handle has been dropped.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// A unit of work executed on the I/O context.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// Name given to the I/O thread.
const IO_THREAD_NAME: &str = "devtools-io";

// ============================================================================
// IoContext
// ============================================================================

/// Handle to the I/O thread.
///
/// Cheap to clone. Tasks run in posting order on the I/O thread, inside a
/// tokio runtime, so they may `tokio::spawn` socket event loops.
#[derive(Clone)]
pub struct IoContext {
    /// Channel feeding the task loop.
    task_tx: mpsc::UnboundedSender<Task>,
    /// Identity of the I/O thread.
    thread_id: ThreadId,
}

impl fmt::Debug for IoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoContext")
            .field("thread_id", &self.thread_id)
            .field("closed", &self.task_tx.is_closed())
            .finish()
    }
}

impl IoContext {
    /// Spawns the I/O thread and its runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the runtime or thread cannot be created.
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let (task_tx, task_rx) = mpsc::unbounded_channel();

        let handle = thread::Builder::new()
            .name(IO_THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(Self::run_task_loop(task_rx));
                debug!("I/O context terminated");
            })?;

        let thread_id = handle.thread().id();
        debug!(?thread_id, "I/O context started");

        Ok(Self { task_tx, thread_id })
    }

    /// Posts a task to run on the I/O thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoContextClosed`] if the I/O thread has exited.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.task_tx
            .send(Box::new(task))
            .map_err(|_| Error::IoContextClosed)
    }

    /// Returns `true` when called from the I/O thread.
    #[inline]
    #[must_use]
    pub fn belongs_to_current_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Runs posted tasks until every handle is gone.
    async fn run_task_loop(mut task_rx: mpsc::UnboundedReceiver<Task>) {
        while let Some(task) = task_rx.recv().await {
            task();
            // Let socket tasks spawned by this task make progress.
            tokio::task::yield_now().await;
        }
    }
}

// ============================================================================
// IoBound
// ============================================================================

/// Shared ownership of a value that must be destroyed on the I/O context.
///
/// Dropping the handle on the I/O thread finalizes immediately; dropping
/// it anywhere else posts the final release to the I/O thread instead.
pub struct IoBound<T: Send + Sync + 'static> {
    value: Option<Arc<T>>,
    io: IoContext,
}

impl<T: Send + Sync + 'static> IoBound<T> {
    /// Wraps `value`, binding its destruction to `io`.
    pub fn new(value: T, io: IoContext) -> Self {
        Self {
            value: Some(Arc::new(value)),
            io,
        }
    }

    /// Returns the shared reference, for cloning into posted tasks.
    #[must_use]
    pub fn as_arc(&self) -> &Arc<T> {
        match &self.value {
            Some(value) => value,
            None => unreachable!("IoBound value is only taken on drop"),
        }
    }
}

impl<T: Send + Sync + 'static> Deref for IoBound<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.value {
            Some(value) => &**value,
            None => unreachable!("IoBound value is only taken on drop"),
        }
    }
}

impl<T: Send + Sync + 'static> Drop for IoBound<T> {
    fn drop(&mut self) {
        let Some(value) = self.value.take() else {
            return;
        };

        if self.io.belongs_to_current_thread() {
            drop(value);
            return;
        }

        if self.io.post(move || drop(value)).is_err() {
            // The task (and the value with it) was dropped here.
            warn!("I/O context closed, released value on foreign thread");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_post_runs_on_io_thread() {
        let io = IoContext::new().expect("io context");
        let (tx, rx) = std_mpsc::channel();

        let probe = io.clone();
        io.post(move || {
            let _ = tx.send(probe.belongs_to_current_thread());
        })
        .expect("post");

        assert!(rx.recv_timeout(WAIT).expect("task ran"));
        assert!(!io.belongs_to_current_thread());
    }

    #[test]
    fn test_tasks_run_in_order() {
        let io = IoContext::new().expect("io context");
        let (tx, rx) = std_mpsc::channel();

        for i in 0..10 {
            let tx = tx.clone();
            io.post(move || {
                let _ = tx.send(i);
            })
            .expect("post");
        }

        let order: Vec<i32> = (0..10).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    struct DropProbe {
        tx: std_mpsc::Sender<ThreadId>,
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            let _ = self.tx.send(thread::current().id());
        }
    }

    #[test]
    fn test_io_bound_drops_on_io_thread() {
        let io = IoContext::new().expect("io context");
        let (tx, rx) = std_mpsc::channel();

        let (id_tx, id_rx) = std_mpsc::channel();
        let probe = io.clone();
        io.post(move || {
            let _ = id_tx.send(probe.belongs_to_current_thread().then(|| thread::current().id()));
        })
        .expect("post");
        let io_thread = id_rx.recv_timeout(WAIT).unwrap().expect("on io thread");

        let bound = IoBound::new(DropProbe { tx }, io);
        drop(bound);

        let dropped_on = rx.recv_timeout(WAIT).expect("value dropped");
        assert_eq!(dropped_on, io_thread);
        assert_ne!(dropped_on, thread::current().id());
    }

    #[test]
    fn test_io_bound_waits_for_outstanding_tasks() {
        let io = IoContext::new().expect("io context");
        let (tx, rx) = std_mpsc::channel();

        let bound = IoBound::new(DropProbe { tx }, io.clone());
        let shared = Arc::clone(bound.as_arc());
        drop(bound);

        // Still alive through `shared`.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        io.post(move || drop(shared)).expect("post");
        assert!(rx.recv_timeout(WAIT).is_ok());
    }
}
