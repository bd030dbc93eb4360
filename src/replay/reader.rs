//! Sequential reader over a recorded DevTools log.
//!
//! # Example
//!
//! ```no_run
//! use devtools_sync::{DevToolsLogReader, Protocol};
//!
//! # fn example() -> devtools_sync::Result<()> {
//! let mut reader = DevToolsLogReader::open("chromedriver.log")?;
//! while let Some(entry) = reader.get_next(Protocol::WebSocket) {
//!     println!("{entry} {}", entry.payload);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, error, trace};

use crate::error::Result;

use super::header::{HeaderCursor, is_header, parse_header};
use super::log_entry::{LogEntry, Protocol};
use super::payload::extract_payload;

// ============================================================================
// LineCursor
// ============================================================================

/// Forward-only line source with a position.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    line_number: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineCursor<R> {
    /// Starts before the first line of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: Vec::new(),
        }
    }

    /// Reads the next line without its terminator, or `None` at end of input.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the underlying read fails.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.buf.ends_with(b"\n") {
            self.buf.pop();
            if self.buf.ends_with(b"\r") {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    /// Returns the number of lines read so far.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

// ============================================================================
// DevToolsLogReader
// ============================================================================

/// Yields [`LogEntry`] values from a log, one header (plus payload) at a time.
///
/// Lines that are not DevTools headers are skipped. A malformed header or
/// payload stops the read: the stream is assumed desynchronized.
#[derive(Debug)]
pub struct DevToolsLogReader<R = BufReader<File>> {
    lines: LineCursor<R>,
}

impl DevToolsLogReader<BufReader<File>> {
    /// Opens the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "Opened DevTools log");
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> DevToolsLogReader<R> {
    /// Reads from any buffered source.
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: LineCursor::new(reader),
        }
    }

    /// Returns the next entry of `protocol`, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// - [`Error::LogHeader`](crate::Error::LogHeader) for a malformed header
    /// - [`Error::Payload`](crate::Error::Payload) for a missing or unbalanced payload
    /// - [`Error::Io`](crate::Error::Io) if reading fails
    pub fn try_next(&mut self, protocol: Protocol) -> Result<Option<LogEntry>> {
        while let Some(line) = self.lines.next_line()? {
            let mut cursor = HeaderCursor::new(&line);
            if !is_header(&mut cursor) {
                continue;
            }

            let mut entry = parse_header(&mut cursor)?;
            if entry.protocol_type != protocol {
                trace!(line = self.lines.line_number(), protocol = %entry.protocol_type, "Skipping entry");
                continue;
            }

            if entry.expects_payload() {
                entry.payload = extract_payload(cursor.remainder(), &mut self.lines)?;
            }

            return Ok(Some(entry));
        }

        Ok(None)
    }

    /// Returns the next entry of `protocol`.
    ///
    /// Returns `None` at end of input and after any read error, which is
    /// logged.
    pub fn get_next(&mut self, protocol: Protocol) -> Option<LogEntry> {
        match self.try_next(protocol) {
            Ok(entry) => entry,
            Err(e) => {
                error!(line = self.lines.line_number(), error = %e, "Failed to read DevTools log entry");
                None
            }
        }
    }

    /// Iterates over the remaining entries of `protocol`.
    pub fn entries(&mut self, protocol: Protocol) -> LogEntries<'_, R> {
        LogEntries {
            reader: self,
            protocol,
        }
    }

    /// Returns the number of lines consumed so far.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.lines.line_number()
    }
}

// ============================================================================
// LogEntries
// ============================================================================

/// Iterator returned by [`DevToolsLogReader::entries`].
///
/// Ends at end of input or at the first read error.
pub struct LogEntries<'a, R> {
    reader: &'a mut DevToolsLogReader<R>,
    protocol: Protocol,
}

impl<R: BufRead> Iterator for LogEntries<'_, R> {
    type Item = LogEntry;

    fn next(&mut self) -> Option<LogEntry> {
        self.reader.get_next(self.protocol)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Cursor, Write};

    use crate::replay::EventType;

    fn reader(log: &str) -> DevToolsLogReader<Cursor<Vec<u8>>> {
        DevToolsLogReader::from_reader(Cursor::new(log.as_bytes().to_vec()))
    }

    const MIXED_LOG: &str = r#"[1531428669.520][INFO]: Launching chrome: chrome --remote-debugging-port=0
[1531428669.530][DEBUG]: DevTools HTTP Request: http://localhost:12345/json/version
[1531428669.535][DEBUG]: DevTools HTTP Response: {
   "Browser": "Chrome/67.0.3396.99",
   "Protocol-Version": "1.3"
}
[1531428669.540][DEBUG]: DevTools WebSocket Command: Page.enable (id=1) {

}
[1531428669.541][DEBUG]: DevTools WebSocket Response: Page.enable (id=1) {

}
[1531428669.550][DEBUG]: DevTools HTTP Request: http://localhost:12345/json
[1531428669.560][DEBUG]: DevTools WebSocket Event: Page.frameNavigated (id=3) {
   "frame": {
      "id": "F1",
      "url": "about:blank#}"
   }
}
[1531428669.570][INFO]: Done waiting for pending navigations
"#;

    #[test]
    fn test_filters_websocket_in_order() {
        let mut reader = reader(MIXED_LOG);
        let entries: Vec<_> = reader.entries(Protocol::WebSocket).collect();

        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.event_type, e.command_name.as_str(), e.id))
            .collect();
        assert_eq!(
            summary,
            [
                (EventType::Request, "Page.enable", 1),
                (EventType::Response, "Page.enable", 1),
                (EventType::Event, "Page.frameNavigated", 3),
            ]
        );
        assert_eq!(entries[0].payload, "{}");
        assert_eq!(
            entries[2].payload,
            r#"{   "frame": {      "id": "F1",      "url": "about:blank#}"   }}"#
        );
    }

    #[test]
    fn test_filters_http_in_order() {
        let mut reader = reader(MIXED_LOG);

        let first = reader.get_next(Protocol::Http).unwrap();
        assert_eq!(first.event_type, EventType::Request);
        assert_eq!(first.command_name, "http://localhost:12345/json/version");
        assert!(first.payload.is_empty());

        let second = reader.get_next(Protocol::Http).unwrap();
        assert_eq!(second.event_type, EventType::Response);
        assert!(second.command_name.is_empty());
        assert!(second.payload.contains("Chrome/67.0.3396.99"));

        let third = reader.get_next(Protocol::Http).unwrap();
        assert_eq!(third.command_name, "http://localhost:12345/json");

        assert!(reader.get_next(Protocol::Http).is_none());
    }

    #[test]
    fn test_prose_lines_are_skipped() {
        let log = "Starting ChromeDriver on port 9515\n\
                   Only local connections are allowed.\n\
                   [1531428669.560][DEBUG]: DevTools WebSocket Event: Page.loadEventFired (id=7) {\"timestamp\":1.0}\n";
        let entry = reader(log).get_next(Protocol::WebSocket).unwrap();

        assert_eq!(entry.protocol_type, Protocol::WebSocket);
        assert_eq!(entry.event_type, EventType::Event);
        assert_eq!(entry.command_name, "Page.loadEventFired");
        assert_eq!(entry.id, 7);
        assert_eq!(entry.payload, r#"{"timestamp":1.0}"#);
    }

    #[test]
    fn test_http_command_takes_no_payload() {
        let log = "[1531428669.530][DEBUG]: DevTools HTTP Command: Page.navigate\n\
                   {\"url\":\"http://x\"}\n";
        let mut reader = reader(log);
        let entry = reader.get_next(Protocol::Http).unwrap();

        assert_eq!(entry.event_type, EventType::Request);
        assert_eq!(entry.command_name, "Page.navigate");
        assert_eq!(entry.id, 0);
        assert!(entry.payload.is_empty());
        // The body line is not a header and is skipped.
        assert!(reader.get_next(Protocol::Http).is_none());
    }

    #[test]
    fn test_malformed_header_stops_reading() {
        let log = "[1531428669.530][DEBUG]: DevTools WebSocket Command: Page.enable {}\n\
                   [1531428669.560][DEBUG]: DevTools WebSocket Event: Page.loadEventFired (id=7) {}\n";
        let mut reader = reader(log);

        let err = reader.try_next(Protocol::WebSocket).unwrap_err();
        assert!(err.is_log_error());
        assert_eq!(reader.line_number(), 1);
    }

    #[test]
    fn test_malformed_header_of_other_protocol_still_stops() {
        let log = "[1531428669.530][DEBUG]: DevTools Pipe Command: Page.enable (id=1) {}\n";
        assert!(reader(log).get_next(Protocol::Http).is_none());
    }

    #[test]
    fn test_truncated_payload() {
        let log = "[1531428669.560][DEBUG]: DevTools WebSocket Event: Page.loadEventFired (id=7) {\n\
                   \"timestamp\": 1.0\n";
        let mut reader = reader(log);
        assert!(matches!(
            reader.try_next(Protocol::WebSocket),
            Err(crate::Error::Payload { .. })
        ));
    }

    #[test]
    fn test_crlf_lines() {
        let log = "[1531428669.541][DEBUG]: DevTools WebSocket Response: Page.enable (id=1) {\r\n}\r\n";
        let entry = reader(log).get_next(Protocol::WebSocket).unwrap();
        assert_eq!(entry.payload, "{}");
    }

    #[test]
    fn test_empty_input() {
        assert!(reader("").get_next(Protocol::WebSocket).is_none());
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MIXED_LOG.as_bytes()).unwrap();

        let mut reader = DevToolsLogReader::open(file.path()).unwrap();
        assert_eq!(reader.entries(Protocol::WebSocket).count(), 3);
    }

    #[test]
    fn test_open_missing_file() {
        let err = DevToolsLogReader::open("/nonexistent/chromedriver.log").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
