//! DevTools log header recognition and decoding.
//!
//! A header line looks like:
//!
//! ```text
//! [1531428669.535][DEBUG]: DevTools WebSocket Command: Page.navigate (id=4) {
//! ```
//!
//! [`is_header`] checks the timestamp preamble and the `DevTools` marker;
//! [`parse_header`] decodes the rest into a [`LogEntry`] without payload.
//! Both advance a [`HeaderCursor`], which is then left at the start of the
//! payload text.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

use super::log_entry::{EventType, LogEntry, Protocol};

// ============================================================================
// Constants
// ============================================================================

/// `[??????????.???][DEBUG]:` where `?` is any single character.
static PREAMBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[.{10}\..{3}\]\[DEBUG\]:$").expect("PREAMBLE_RE should compile")
});

/// Marker token following the preamble.
const DEVTOOLS_MARKER: &str = "DevTools";

/// Characters between a command name and its id: ` (id=`.
const ID_PREFIX_LEN: usize = 5;

/// Characters closing the id: `)`.
const ID_SUFFIX_LEN: usize = 1;

// ============================================================================
// HeaderCursor
// ============================================================================

/// Forward-only, whitespace-tokenizing view of one log line.
#[derive(Debug, Clone, Copy)]
pub struct HeaderCursor<'a> {
    rest: &'a str,
}

impl<'a> HeaderCursor<'a> {
    /// Starts at the beginning of `line`.
    #[inline]
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Skips whitespace and returns the next token (empty at end of line).
    pub fn next_token(&mut self) -> &'a str {
        let trimmed = self.rest.trim_start_matches(is_space);
        let end = trimmed.find(is_space).unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        token
    }

    /// Skips up to `count` characters, whitespace included.
    pub fn skip(&mut self, count: usize) {
        let offset = self
            .rest
            .char_indices()
            .nth(count)
            .map_or(self.rest.len(), |(i, _)| i);
        self.rest = &self.rest[offset..];
    }

    /// Skips whitespace and reads a signed decimal integer.
    ///
    /// Returns `None` without consuming digits when none are present.
    pub fn read_int(&mut self) -> Option<i64> {
        let trimmed = self.rest.trim_start_matches(is_space);
        let sign_len = usize::from(trimmed.starts_with(['+', '-']));
        let digits_len = trimmed[sign_len..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len() - sign_len);
        if digits_len == 0 {
            self.rest = trimmed;
            return None;
        }

        let (number, rest) = trimmed.split_at(sign_len + digits_len);
        self.rest = rest;
        number.parse().ok()
    }

    /// Returns the unread remainder of the line.
    #[inline]
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

/// Whitespace as understood by stream extraction.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

// ============================================================================
// Header Recognition
// ============================================================================

/// Returns `true` if the cursor's line starts with a DevTools header preamble.
///
/// Consumes the preamble and marker tokens.
pub fn is_header(cursor: &mut HeaderCursor<'_>) -> bool {
    let preamble = cursor.next_token();
    if !PREAMBLE_RE.is_match(preamble) {
        return false;
    }
    cursor.next_token() == DEVTOOLS_MARKER
}

// ============================================================================
// Header Decoding
// ============================================================================

/// Decodes protocol, event type, command name and id.
///
/// HTTP responses carry neither command name nor id; HTTP requests and
/// events carry a command name only; WebSocket entries carry both.
///
/// # Errors
///
/// Returns [`Error::LogHeader`] naming the first field that could not be read.
pub fn parse_header(cursor: &mut HeaderCursor<'_>) -> Result<LogEntry> {
    let protocol_type =
        Protocol::from_token(cursor.next_token()).ok_or_else(|| Error::log_header("protocol"))?;

    let event_type = EventType::from_token(cursor.next_token())
        .ok_or_else(|| Error::log_header("event type"))?;

    let mut entry = LogEntry::new(protocol_type, event_type, String::new(), 0);
    if !entry.has_command_name() {
        return Ok(entry);
    }

    let command_name = cursor.next_token();
    if command_name.is_empty() {
        return Err(Error::log_header("command name"));
    }
    entry.command_name = command_name.to_owned();

    if protocol_type != Protocol::Http {
        entry.id = read_id(cursor);
        if entry.id == 0 {
            return Err(Error::log_header("sequential id"));
        }
    }

    Ok(entry)
}

/// Reads ` (id=N)`, returning `0` when no number is present.
fn read_id(cursor: &mut HeaderCursor<'_>) -> i64 {
    cursor.skip(ID_PREFIX_LEN);
    let id = cursor.read_int().unwrap_or(0);
    cursor.skip(ID_SUFFIX_LEN);
    id
}

// ============================================================================
// Tests
// ============================================================================
