//! Byte-offset ranges within the input source.

use serde::{Deserialize, Serialize};

/// A byte offset range within the single input file.
///
/// `start` is inclusive and `end` is exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new span with the given byte range.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Produces a span covering both spans.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Computes the 1-based line and column of the span start within `source`.
    pub fn line_col(&self, source: &str) -> (u32, u32) {
        let offset = (self.start as usize).min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let col = match before.rfind('\n') {
            Some(pos) => (offset - pos) as u32,
            None => offset as u32 + 1,
        };
        (line, col)
    }
}
