//! Payload extraction with quote-aware bracket balancing.
//!
//! The payload starts on the header line, one separator character after the
//! header fields, and may continue over any number of following lines. Its
//! first character picks the delimiter pair (`{}` or `[]`); lines are
//! appended until the delimiters balance. Delimiters inside JSON strings do
//! not count.

// ============================================================================
// Imports
// ============================================================================

use std::io::BufRead;

use crate::error::{Error, Result};

use super::reader::LineCursor;

// ============================================================================
// Extraction
// ============================================================================

/// Assembles the payload that begins in `header_rest`.
///
/// Lines are concatenated without separators.
///
/// # Errors
///
/// - [`Error::Payload`] if the payload does not start with `{` or `[`
/// - [`Error::Payload`] if input ends before the delimiters balance
/// - [`Error::Io`] if reading a following line fails
pub fn extract_payload<R: BufRead>(header_rest: &str, lines: &mut LineCursor<R>) -> Result<String> {
    let mut chars = header_rest.chars();
    if chars.next().is_none() {
        return Err(Error::payload("no payload after header"));
    }
    let first_line = chars.as_str();

    let (opening, closing) = match first_line.chars().next() {
        Some('{') => ('{', '}'),
        Some('[') => ('[', ']'),
        other => {
            return Err(Error::payload(format!(
                "payload starts with {other:?}, expected '{{' or '['"
            )));
        }
    };

    let mut json = String::from(first_line);
    let mut balance = count_delimiters(first_line, opening, closing);

    while balance != 0 {
        let Some(line) = lines.next_line()? else {
            return Err(Error::payload("log ended inside payload"));
        };
        balance += count_delimiters(&line, opening, closing);
        json.push_str(&line);
    }

    Ok(json)
}

/// Net count of `opening` minus `closing` outside double-quoted strings.
///
/// A quote preceded by a backslash does not toggle the in-string state.
#[must_use]
pub fn count_delimiters(line: &str, opening: char, closing: char) -> i64 {
    let mut in_quote = false;
    let mut previous = None;
    let mut total = 0;

    for c in line.chars() {
        if !in_quote && c == opening {
            total += 1;
        }
        if !in_quote && c == closing {
            total -= 1;
        }
        if c == '"' && previous != Some('\\') {
            in_quote = !in_quote;
        }
        previous = Some(c);
    }

    total
}

// ============================================================================
// Tests
// ============================================================================
