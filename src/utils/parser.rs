//! Delimiter-aware scanning primitives for argument lists.
//!
//! Everything here works on raw source text and tracks two things while
//! walking it byte by byte: nesting depth across `()`, `[]` and `{}`, and
//! whether the cursor sits inside a single- or double-quoted string. A
//! backslash inside a string escapes the following character.
//!
//! Comments are not recognized. A quote character inside a `#` comment
//! between the parentheses of a call will desynchronize the scan; callers
//! treat a failed scan as "not a match".

/// Incremental quote and nesting tracker shared by the scanners below.
#[derive(Debug, Default)]
struct Cursor {
    depth: usize,
    quote: Option<u8>,
    escaped: bool,
}

#[derive(Debug, PartialEq)]
enum Step {
    /// Byte is inside a string literal (including its quotes).
    Quoted,
    Open,
    Close,
    Comma,
    Other,
}

impl Cursor {
    fn step(&mut self, byte: u8) -> Step {
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == quote {
                self.quote = None;
            }
            return Step::Quoted;
        }

        match byte {
            b'\'' | b'"' => {
                self.quote = Some(byte);
                Step::Quoted
            }
            b'(' | b'[' | b'{' => {
                self.depth += 1;
                Step::Open
            }
            b')' | b']' | b'}' => {
                self.depth = self.depth.saturating_sub(1);
                Step::Close
            }
            b',' => Step::Comma,
            _ => Step::Other,
        }
    }
}

/// Byte offsets of every comma at nesting depth zero, outside quotes.
pub fn top_level_commas(text: &str) -> Vec<usize> {
    let mut cursor = Cursor::default();
    let mut commas = Vec::new();

    for (idx, byte) in text.bytes().enumerate() {
        let depth_before = cursor.depth;
        if cursor.step(byte) == Step::Comma && depth_before == 0 {
            commas.push(idx);
        }
    }

    commas
}

/// Split a comma-separated argument list into trimmed top-level items.
///
/// ```ignore
/// let items = split_args("a, f(b, c), 'd, e'");
/// assert_eq!(items, vec!["a", "f(b, c)", "'d, e'"]);
/// ```
///
/// Empty (or whitespace-only) input yields no items. A trailing comma
/// yields a trailing empty item, so `f(a,)` reports two arguments.
pub fn split_args(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut start = 0;
    for comma in top_level_commas(text) {
        items.push(text[start..comma].trim().to_string());
        start = comma + 1;
    }
    items.push(text[start..].trim().to_string());

    items
}

/// Find the delimiter closing the group opened at `open`.
///
/// `open` must index an opening bracket; the returned offset points at the
/// bracket that brings depth back to zero. Returns `None` when the group
/// never closes or `open` is not an opening bracket.
pub fn find_closing(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !matches!(bytes.get(open), Some(b'(' | b'[' | b'{')) {
        return None;
    }

    let mut cursor = Cursor::default();
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        if cursor.step(byte) == Step::Close && cursor.depth == 0 {
            return Some(idx);
        }
    }

    None
}
