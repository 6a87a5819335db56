//! Caret tracking over the canonical text and its rendered spans.
//!
//! All math is char-offset arithmetic over the plain text. The rendered
//! view is a flat list of [`StyledSpan`]s, so locating the caret inside it
//! is a walk over span lengths rather than over any display tree.

use std::fmt;

use crate::highlight::StyledSpan;
use crate::line_index::LineIndex;

/// A 1-indexed display coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for LineColumn {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ln {}, Col {}", self.line, self.column)
    }
}

/// A caret as a linear offset plus its derived display coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretPosition {
    /// Zero-based char offset, never past the end of the text.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl CaretPosition {
    /// Derives the caret position for `offset` using a prebuilt line index.
    pub fn from_index(index: &LineIndex, offset: usize) -> Self {
        let offset = offset.min(index.len_chars());
        let LineColumn { line, column } = line_column_in(index, offset);
        Self {
            offset,
            line,
            column,
        }
    }

    /// Returns the display coordinate of this caret.
    pub fn line_column(&self) -> LineColumn {
        LineColumn::new(self.line, self.column)
    }
}

/// Maps `offset` to a 1-indexed line and column.
///
/// Offsets past the end of `text` are treated as the end of the document.
/// An offset right after a line break is column 1 of the next line.
pub fn offset_to_line_column(text: &str, offset: usize) -> LineColumn {
    line_column_in(&LineIndex::build(text), offset)
}

/// Maps a 1-indexed line and column back to a char offset.
///
/// Line and column 0 are read as 1. A line past the last one clamps to the
/// last line, and a column past the end of its line clamps to end-of-line.
pub fn line_column_to_offset(text: &str, line: usize, column: usize) -> usize {
    offset_in(&LineIndex::build(text), line, column)
}

/// Same as [`offset_to_line_column`], reusing an existing index.
pub fn line_column_in(index: &LineIndex, offset: usize) -> LineColumn {
    let offset = offset.min(index.len_chars());
    let line = index.line_of_offset(offset);
    let start = index.line_start(line).unwrap_or(0);
    LineColumn::new(line + 1, offset - start + 1)
}

/// Same as [`line_column_to_offset`], reusing an existing index.
pub fn offset_in(index: &LineIndex, line: usize, column: usize) -> usize {
    let line = (line.max(1) - 1).min(index.line_count() - 1);
    let start = index.line_start(line).unwrap_or(0);
    let len = index.line_len(line).unwrap_or(0);
    start + (column.max(1) - 1).min(len)
}

/// Returns the caret offset to restore after the view is re-rendered.
///
/// Re-highlighting never changes the text, so the logical position is the
/// same linear offset, clamped in case the text shrank under it.
pub fn preserve_caret_across_rerender(text: &str, old_offset: usize) -> usize {
    old_offset.min(text.chars().count())
}

/// A caret located inside a rendered span list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanCursor {
    /// Index of the span holding the caret.
    pub span: usize,
    /// Char offset within that span.
    pub offset_in_span: usize,
}

/// Locates `offset` inside `spans`.
///
/// An offset on the boundary between two spans belongs to the start of the
/// following span. At the very end of the text the caret sits after the last
/// char of the last span.
pub fn locate_in_spans(spans: &[StyledSpan], offset: usize) -> SpanCursor {
    let mut acc = 0;
    let mut last_nonempty = None;
    for (i, span) in spans.iter().enumerate() {
        let len = span.len_chars();
        if offset < acc + len {
            return SpanCursor {
                span: i,
                offset_in_span: offset - acc,
            };
        }
        if len > 0 {
            last_nonempty = Some((i, len));
        }
        acc += len;
    }
    match last_nonempty {
        Some((span, len)) => SpanCursor {
            span,
            offset_in_span: len,
        },
        None => SpanCursor::default(),
    }
}

/// Measures the linear offset of a caret located inside `spans`.
///
/// A cursor past the last span, or past the end of its span, is clamped.
pub fn offset_in_spans(spans: &[StyledSpan], cursor: SpanCursor) -> usize {
    let before: usize = spans
        .iter()
        .take(cursor.span)
        .map(StyledSpan::len_chars)
        .sum();
    let within = spans
        .get(cursor.span)
        .map_or(0, |span| cursor.offset_in_span.min(span.len_chars()));
    before + within
}

/// Moves a caret measured in `old_spans` into `new_spans`.
///
/// The caret keeps its linear offset, clamped to the new text length.
pub fn rehome_caret(
    old_spans: &[StyledSpan],
    cursor: SpanCursor,
    new_spans: &[StyledSpan],
) -> SpanCursor {
    let total: usize = new_spans.iter().map(StyledSpan::len_chars).sum();
    let offset = offset_in_spans(old_spans, cursor).min(total);
    locate_in_spans(new_spans, offset)
}
