//! Source location tracking
//!
//! Spans are byte ranges into a single document's text. Line/column positions are only
//! computed on demand (for rendering diagnostics) through [`LineIndex`].

use std::fmt;

use serde::Serialize;

/// Human-readable position (line, column, and byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
    /// Byte offset from start of the document
    pub offset: usize,
}

impl Position {
    /// Create a new position with offset
    #[inline]
    pub fn with_offset(
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range `[start, end)` inside one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: usize,
        end: usize,
    ) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    /// Span covering both `self` and `other`
    #[inline]
    pub fn to(
        self,
        other: Span,
    ) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Get the source text length
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` lies inside the span, end inclusive.
    ///
    /// End-inclusive matches caret semantics: a caret right after `foo` is "in" `foo`.
    #[inline]
    pub fn touches(
        &self,
        offset: usize,
    ) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Shift the span left by `delta` bytes, saturating at zero
    #[inline]
    pub fn shift_back(
        self,
        delta: usize,
    ) -> Span {
        Span {
            start: self.start.saturating_sub(delta),
            end: self.end.saturating_sub(delta),
        }
    }

    /// Text covered by the span, if it is a valid range of `source`
    pub fn slice<'a>(
        &self,
        source: &'a str,
    ) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line start table for offset -> position conversion
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts
    line_offsets: Vec<usize>,
}

impl LineIndex {
    /// Build the index for `content`
    pub fn new(content: &str) -> Self {
        let mut line_offsets = vec![0];
        line_offsets.extend(
            content
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_offsets }
    }

    /// Get position from byte offset
    pub fn position(
        &self,
        content: &str,
        offset: usize,
    ) -> Position {
        let offset = offset.min(content.len());
        let line = self.line_offsets.partition_point(|&o| o <= offset);
        let line_start = self.line_offsets[line.saturating_sub(1)];
        let column = content
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Position::with_offset(line, column + 1, offset)
    }

    /// Number of lines in the indexed content
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }
}
