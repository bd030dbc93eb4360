//! Recorded-traffic stand-in for the live WebSocket.
//!
//! [`ReplaySocket`] serves the WebSocket traffic of a DevTools log through
//! the [`SyncWebSocket`] interface, so a driver can run against a recording
//! instead of a browser.
//!
//! # Replay Rules
//!
//! | Recorded entry | Behavior |
//! |----------------|----------|
//! | `Command:` | Skipped; the driver sends its own |
//! | `Response:` with id ≤ highest sent id | Delivered as `{"id":..,"result":..}` |
//! | `Response:` with id > highest sent id | Held back; receive reports `Timeout` |
//! | `Event:` | Delivered as `{"method":..,"params":..}` |
//! | End of log | `Disconnected` |

// ============================================================================
// Imports
// ============================================================================

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use parking_lot::Mutex;
use serde_json::{Value, from_str, json};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::Result;
use crate::timeout::Timeout;
use crate::transport::{Received, SyncWebSocket};

use super::log_entry::{EventType, LogEntry, Protocol};
use super::reader::DevToolsLogReader;

// ============================================================================
// ReplayState
// ============================================================================

#[derive(Debug)]
struct ReplayState<R> {
    reader: DevToolsLogReader<R>,
    connected: bool,
    /// Highest command id sent by the driver.
    max_sent_id: i64,
    /// Next non-command entry, read ahead.
    held: Option<LogEntry>,
}

impl<R: BufRead> ReplayState<R> {
    /// Reads ahead to the next response or event. Returns `false` at end of log.
    fn fill(&mut self) -> bool {
        while self.held.is_none() {
            let Some(entry) = self.reader.get_next(Protocol::WebSocket) else {
                return false;
            };
            if entry.event_type == EventType::Request {
                trace!(id = entry.id, command = %entry.command_name, "Skipping recorded command");
                continue;
            }
            self.held = Some(entry);
        }
        true
    }

    fn is_deliverable(&self, entry: &LogEntry) -> bool {
        entry.event_type != EventType::Response || entry.id <= self.max_sent_id
    }
}

// ============================================================================
// ReplaySocket
// ============================================================================

/// [`SyncWebSocket`] backed by a recorded DevTools log.
///
/// Never blocks: a response the driver has not asked for yet yields
/// `Timeout` immediately.
#[derive(Debug)]
pub struct ReplaySocket<R = BufReader<File>> {
    state: Mutex<ReplayState<R>>,
}

impl ReplaySocket<BufReader<File>> {
    /// Opens the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(DevToolsLogReader::open(path)?))
    }
}

impl<R: BufRead> ReplaySocket<R> {
    /// Replays entries from `reader`.
    pub fn new(reader: DevToolsLogReader<R>) -> Self {
        Self {
            state: Mutex::new(ReplayState {
                reader,
                connected: false,
                max_sent_id: 0,
                held: None,
            }),
        }
    }

    /// Renders a recorded response or event as the browser sent it.
    fn render(entry: &LogEntry) -> Result<String> {
        let payload: Value = from_str(&entry.payload)?;
        let message = match entry.event_type {
            EventType::Response => json!({ "id": entry.id, "result": payload }),
            _ => json!({ "method": entry.command_name, "params": payload }),
        };
        Ok(message.to_string())
    }
}

impl<R: BufRead + Send> SyncWebSocket for ReplaySocket<R> {
    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn connect(&self, url: &Url) -> bool {
        self.state.lock().connected = true;
        info!(%url, "Replaying DevTools log");
        true
    }

    fn send(&self, message: &str) -> bool {
        let mut state = self.state.lock();
        if !state.connected {
            return false;
        }

        let id = from_str::<Value>(message)
            .ok()
            .and_then(|command| command.get("id").and_then(Value::as_i64));
        let Some(id) = id else {
            warn!(command = message, "Outgoing command has no integer id");
            return false;
        };

        state.max_sent_id = state.max_sent_id.max(id);
        trace!(id, "Command sent to replay");
        true
    }

    fn receive_next_message(&self, _timeout: &Timeout) -> Received {
        let mut state = self.state.lock();
        if !state.connected {
            return Received::Disconnected;
        }

        if !state.fill() {
            debug!("Replay log exhausted");
            state.connected = false;
            return Received::Disconnected;
        }

        let max_sent_id = state.max_sent_id;
        let Some(entry) = state
            .held
            .take_if(|entry| entry.event_type != EventType::Response || entry.id <= max_sent_id)
        else {
            return Received::Timeout;
        };

        match Self::render(&entry) {
            Ok(message) => Received::Message(message),
            Err(e) => {
                error!(id = entry.id, error = %e, "Recorded payload is not valid JSON");
                state.connected = false;
                Received::Disconnected
            }
        }
    }

    fn has_next_message(&self) -> bool {
        let mut state = self.state.lock();
        if !state.connected {
            return false;
        }
        if !state.fill() {
            debug!("Replay log exhausted");
            state.connected = false;
            return false;
        }
        state
            .held
            .as_ref()
            .is_some_and(|entry| state.is_deliverable(entry))
    }
}

// ============================================================================
// Tests
// ============================================================================
