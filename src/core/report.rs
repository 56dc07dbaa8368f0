//! Records for constructs that were recognized but cannot be rewritten.
//!
//! `report` is the only way the conversion signals "a person has to fix
//! this". It never fails; records accumulate in the registry and are
//! summarized at the end of a run.

use serde::Serialize;
use std::ops::Range;

use crate::registry::Registry;

/// Inclusive, one-based line range of a construct in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceSpan {
    /// Lines are clamped to 1 and ordered so `start_line <= end_line`.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        let start_line = start_line.max(1);
        let end_line = end_line.max(1);
        Self {
            start_line: start_line.min(end_line),
            end_line: start_line.max(end_line),
        }
    }

    /// Span covering `range` (byte offsets) of a text that starts at `first_line`.
    pub fn from_offsets(text: &str, range: &Range<usize>, first_line: usize) -> Self {
        let line_at = |offset: usize| {
            let offset = offset.min(text.len());
            first_line + text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count()
        };
        let last = if range.end > range.start { range.end - 1 } else { range.start };
        Self::new(line_at(range.start), line_at(last))
    }
}

/// A construct the converter could not fix. Rows are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ErrorRecord {
    pub row: usize,
    pub row_to: usize,
    pub reason: String,
}

impl ErrorRecord {
    pub fn new(span: SourceSpan, reason: impl Into<String>) -> Self {
        Self {
            row: span.start_line - 1,
            row_to: span.end_line - 1,
            reason: reason.into(),
        }
    }
}

/// Build a record for `span` and file it into the registry's errors.
///
/// Filing the same `(row, row_to, reason)` twice leaves a single entry.
pub fn report(registry: &mut Registry, span: SourceSpan, reason: impl Into<String>) -> ErrorRecord {
    let record = ErrorRecord::new(span, reason);
    registry.add_error(record.clone());
    record
}
