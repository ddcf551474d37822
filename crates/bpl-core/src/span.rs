//! Source location tracking for diagnostics.
//!
//! Provides [`Span`], the start/end position every syntax node carries.

use std::fmt;

/// A range of source code from a start position to an end position.
///
/// Lines and columns are 1-indexed. A span produced by the checker for
/// builtin declarations is all zeros.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start line (1-indexed).
    pub line: u32,
    /// Start column (1-indexed).
    pub col: u32,
    /// End line (inclusive).
    pub end_line: u32,
    /// End column (exclusive).
    pub end_col: u32,
}

impl Span {
    /// Create a span covering `line:col` to `end_line:end_col`.
    #[inline]
    pub fn new(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// Create a zero-width span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// The span used for compiler-provided declarations.
    #[inline]
    pub fn internal() -> Self {
        Self::default()
    }

    /// Whether this span covers no source text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line == self.end_line && self.col == self.end_col
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        let (line, col) = (self.line, self.col).min((other.line, other.col));
        let (end_line, end_col) = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span {
            line,
            col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.line, self.col, self.end_line, self.end_col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
