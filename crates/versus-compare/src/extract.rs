//! Locating JSON embedded in model prose.
//!
//! Models asked for "JSON only" still wrap answers in code fences or a
//! sentence of preamble. [`parse_embedded`] walks balanced `{...}` / `[...]`
//! spans left to right and returns the first one that parses. The scanner is
//! string-aware: brackets inside JSON string literals do not count.

use serde::de::DeserializeOwned;

/// Iterates over top-level balanced spans delimited by `open`/`close`, left
/// to right. After a balanced span, scanning resumes past its closing byte,
/// so spans nested inside it are never yielded. An opening byte with no
/// matching close is skipped and scanning resumes just past it.
pub(crate) fn balanced_spans(text: &str, open: u8, close: u8) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut cursor = 0usize;
    std::iter::from_fn(move || {
        while cursor < bytes.len() {
            let start = cursor + bytes[cursor..].iter().position(|&b| b == open)?;
            match span_end(bytes, start, open, close) {
                Some(end) => {
                    cursor = end + 1;
                    return Some(&text[start..=end]);
                }
                None => cursor = start + 1,
            }
        }
        None
    })
}

/// Returns the index of the byte closing the span that opens at `start`.
fn span_end(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}

/// Parses the first balanced span that deserializes as `T`.
///
/// When the text has no balanced span at all, the whole (trimmed) text is
/// parsed instead. When spans exist but none parse, the error from the first
/// span is returned.
pub(crate) fn parse_embedded<T: DeserializeOwned>(
    text: &str,
    open: u8,
    close: u8,
) -> Result<T, serde_json::Error> {
    let mut first_err = None;
    for span in balanced_spans(text, open, close) {
        match serde_json::from_str::<T>(span) {
            Ok(value) => return Ok(value),
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => serde_json::from_str::<T>(text.trim()),
    }
}
