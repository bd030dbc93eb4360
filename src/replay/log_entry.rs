//! Parsed DevTools log entries.
//!
//! A [`LogEntry`] is one recorded protocol event: the decoded header plus
//! the raw JSON payload that followed it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// Protocol
// ============================================================================

/// Transport a recorded DevTools message travelled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Protocol {
    /// DevTools HTTP endpoints (`/json/version`, `/json/list`, ...).
    #[serde(rename = "HTTP")]
    Http,
    /// The DevTools WebSocket.
    WebSocket,
}

impl Protocol {
    /// Returns the token used for this protocol in log headers.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::WebSocket => "WebSocket",
        }
    }

    /// Decodes a header token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP" => Some(Self::Http),
            "WebSocket" => Some(Self::WebSocket),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EventType
// ============================================================================

/// Direction and kind of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    /// A command sent to the browser (`Command:` or `Request:`).
    Request,
    /// A reply from the browser (`Response:`).
    Response,
    /// An unsolicited notification (`Event:`).
    Event,
}

impl EventType {
    /// Decodes a header token, including its trailing colon.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Response:" => Some(Self::Response),
            "Command:" | "Request:" => Some(Self::Request),
            "Event:" => Some(Self::Event),
            _ => None,
        }
    }

    /// Returns the header token this event type is logged with.
    ///
    /// Requests are logged as `Request:` over HTTP and `Command:` otherwise.
    #[must_use]
    pub const fn token(&self, protocol: Protocol) -> &'static str {
        match (self, protocol) {
            (Self::Request, Protocol::Http) => "Request:",
            (Self::Request, Protocol::WebSocket) => "Command:",
            (Self::Response, _) => "Response:",
            (Self::Event, _) => "Event:",
        }
    }
}

// ============================================================================
// LogEntry
// ============================================================================

/// One recorded DevTools message.
///
/// # Header Shape
///
/// | Protocol | Event | Command name | Id |
/// |----------|-------|--------------|----|
/// | `HTTP` | `Response:` | - | - |
/// | `HTTP` | `Request:` / `Command:` / `Event:` | yes | - |
/// | `WebSocket` | any | yes | yes |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Transport of the message.
    pub protocol_type: Protocol,

    /// Kind of message.
    pub event_type: EventType,

    /// DevTools method, event name, or HTTP URL. Empty for HTTP responses.
    pub command_name: String,

    /// Sequence id of WebSocket messages. `0` means absent.
    pub id: i64,

    /// Raw JSON text following the header. Empty for HTTP requests.
    pub payload: String,
}

impl LogEntry {
    /// Creates an entry with no payload yet.
    #[must_use]
    pub fn new(
        protocol_type: Protocol,
        event_type: EventType,
        command_name: impl Into<String>,
        id: i64,
    ) -> Self {
        Self {
            protocol_type,
            event_type,
            command_name: command_name.into(),
            id,
            payload: String::new(),
        }
    }

    /// Returns the sequence id, treating `0` as absent.
    #[inline]
    #[must_use]
    pub fn sequence_id(&self) -> Option<i64> {
        (self.id != 0).then_some(self.id)
    }

    /// Returns `true` if a payload follows this entry's header.
    #[inline]
    #[must_use]
    pub fn expects_payload(&self) -> bool {
        !(self.protocol_type == Protocol::Http && self.event_type == EventType::Request)
    }

    /// Returns `true` if the header carries a command name.
    #[inline]
    #[must_use]
    pub fn has_command_name(&self) -> bool {
        !(self.protocol_type == Protocol::Http && self.event_type == EventType::Response)
    }
}

/// Renders the header fields as they appear after `DevTools` in a log.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.protocol_type,
            self.event_type.token(self.protocol_type)
        )?;
        if self.has_command_name() {
            write!(f, " {}", self.command_name)?;
            if self.protocol_type != Protocol::Http {
                write!(f, " (id={})", self.id)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_tokens() {
        assert_eq!(Protocol::from_token("HTTP"), Some(Protocol::Http));
        assert_eq!(Protocol::from_token("WebSocket"), Some(Protocol::WebSocket));
        assert_eq!(Protocol::from_token("websocket"), None);
        assert_eq!(Protocol::WebSocket.to_string(), "WebSocket");
    }

    #[test]
    fn test_event_tokens() {
        assert_eq!(EventType::from_token("Command:"), Some(EventType::Request));
        assert_eq!(EventType::from_token("Request:"), Some(EventType::Request));
        assert_eq!(EventType::from_token("Response:"), Some(EventType::Response));
        assert_eq!(EventType::from_token("Event:"), Some(EventType::Event));
        assert_eq!(EventType::from_token("Event"), None);
    }

    #[test]
    fn test_display_websocket_event() {
        let entry = LogEntry::new(
            Protocol::WebSocket,
            EventType::Event,
            "Page.loadEventFired",
            7,
        );
        assert_eq!(
            entry.to_string(),
            "WebSocket Event: Page.loadEventFired (id=7)"
        );
    }

    #[test]
    fn test_display_http_response() {
        let entry = LogEntry::new(Protocol::Http, EventType::Response, "", 0);
        assert_eq!(entry.to_string(), "HTTP Response:");
        assert!(entry.expects_payload());
        assert!(!entry.has_command_name());
    }

    #[test]
    fn test_http_request_has_no_payload() {
        let entry = LogEntry::new(
            Protocol::Http,
            EventType::Request,
            "http://localhost:9222/json/version",
            0,
        );
        assert!(!entry.expects_payload());
        assert_eq!(entry.sequence_id(), None);
    }

    #[test]
    fn test_serialize() {
        let mut entry = LogEntry::new(Protocol::WebSocket, EventType::Response, "Page.navigate", 3);
        entry.payload = r#"{"frameId":"F"}"#.into();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["protocol_type"], "WebSocket");
        assert_eq!(json["event_type"], "Response");
        assert_eq!(json["id"], 3);
    }
}
