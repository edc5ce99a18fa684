//! Source location tracking for resolution results and registration errors.
//!
//! Provides [`Span`] to record where a declaration or expression occurs in
//! source. Imported symbols carry no span; source-declared symbols always do.

use std::fmt;

/// A span of source code, identified by the position where it starts.
///
/// Tracks the line:column where a construct begins plus its byte length,
/// in the style of compiler diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub const fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub const fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span covers no source text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span to also cover `other`.
    ///
    /// Spans on different lines keep the earlier start and give up on a
    /// precise length.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start = self.col.min(other.col);
            let end = (self.col + self.len).max(other.col + other.len);
            Span {
                line: self.line,
                col: start,
                len: end - start,
            }
        } else if self.line < other.line {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}:{}+{})", self.line, self.col, self.len)
    }
}
