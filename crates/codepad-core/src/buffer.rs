/// Buffer model: canonical text storage and edit descriptors.
use std::fmt;

use ropey::Rope;

use crate::error::EditorError;

/// A single change to the canonical text. Offsets are char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Inserts `text` before the char at `at`.
    Insert { at: usize, text: String },
    /// Removes the char range `[start..end)`.
    Delete { start: usize, end: usize },
    /// Replaces the char range `[start..end)` with `text`.
    Replace {
        start: usize,
        end: usize,
        text: String,
    },
    /// Replaces the whole text.
    ReplaceAll(String),
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            at,
            text: text.into(),
        }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self::Delete { start, end }
    }

    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self::Replace {
            start,
            end,
            text: text.into(),
        }
    }

    /// Returns the caret offset left behind once this edit has been applied.
    ///
    /// An edit touching the caret leaves it after the new text, or at the
    /// start of a deleted range. An edit wholly before the caret shifts it by
    /// the length change; one wholly after it leaves it alone. A full
    /// replacement keeps the old caret, clamped to the new length.
    pub fn caret_after(&self, old_caret: usize) -> usize {
        match self {
            Self::Insert { at, text } => {
                if old_caret < *at {
                    old_caret
                } else {
                    old_caret + text.chars().count()
                }
            }
            Self::Delete { start, end } => {
                if old_caret <= *start {
                    old_caret
                } else if old_caret >= *end {
                    old_caret - (end - start)
                } else {
                    *start
                }
            }
            Self::Replace { start, end, text } => {
                let len = text.chars().count();
                if old_caret < *start {
                    old_caret
                } else if old_caret > *end {
                    old_caret - (end - start) + len
                } else {
                    start + len
                }
            }
            Self::ReplaceAll(text) => old_caret.min(text.chars().count()),
        }
    }

    /// Returns a copy of this edit with its inserted text passed through `f`.
    pub(crate) fn map_text(&self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::Insert { at, text } => Self::Insert {
                at: *at,
                text: f(text),
            },
            Self::Delete { start, end } => Self::Delete {
                start: *start,
                end: *end,
            },
            Self::Replace { start, end, text } => Self::Replace {
                start: *start,
                end: *end,
                text: f(text),
            },
            Self::ReplaceAll(text) => Self::ReplaceAll(f(text)),
        }
    }
}

/// Converts `\r\n` and lone `\r` to `\n`, the only line break the buffer keeps.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Applies `edit` to `text` and returns the new text.
///
/// Pure: `text` is not touched, and an invalid edit returns an error without
/// producing partial output.
pub fn apply_edit(text: &str, edit: &Edit) -> Result<String, EditorError> {
    let mut buffer = TextBuffer::from(text);
    buffer.apply(edit)?;
    Ok(buffer.to_string())
}

/// A text buffer backed by a rope for cheap mid-text edits.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EditorError> {
        let len = self.rope.len_chars();
        if start > end || end > len {
            return Err(EditorError::InvalidEdit { start, end, len });
        }
        Ok(())
    }

    /// Inserts text at the given char index.
    ///
    /// # Errors
    ///
    /// Returns an error if the char index is past the end of the buffer.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<(), EditorError> {
        self.check_range(char_idx, char_idx)?;
        if !text.is_empty() {
            self.rope.insert(char_idx, text);
        }
        Ok(())
    }

    /// Removes the character range `[start..end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<(), EditorError> {
        self.check_range(start, end)?;
        if start < end {
            self.rope.remove(start..end);
        }
        Ok(())
    }

    /// Replaces the character range `[start..end)` with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<(), EditorError> {
        self.check_range(start, end)?;
        self.remove(start, end)?;
        self.insert(start, text)
    }

    /// Returns the text in the char range `[start..end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Result<String, EditorError> {
        self.check_range(start, end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Applies an edit descriptor in place.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidEdit`] if the edit's range does not fit
    /// the buffer; the buffer is left unchanged.
    pub fn apply(&mut self, edit: &Edit) -> Result<(), EditorError> {
        match edit {
            Edit::Insert { at, text } => self.insert(*at, text),
            Edit::Delete { start, end } => self.remove(*start, *end),
            Edit::Replace { start, end, text } => self.replace(*start, *end, text),
            Edit::ReplaceAll(text) => {
                self.rope = Rope::from_str(text);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_middle() {
        let mut buf = TextBuffer::from("helo");
        buf.insert(3, "l").unwrap();
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_insert_at_end() {
        let mut buf = TextBuffer::from("hello");
        buf.insert(5, " world").unwrap();
        assert_eq!(buf.to_string(), "hello world");
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut buf = TextBuffer::from("hello");
        let err = buf.insert(6, "x").unwrap_err();
        assert_eq!(
            err,
            EditorError::InvalidEdit {
                start: 6,
                end: 6,
                len: 5
            }
        );
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_remove_across_lines() {
        let mut buf = TextBuffer::from("hello\nworld\nfoo");
        buf.remove(3, 9).unwrap();
        assert_eq!(buf.to_string(), "helld\nfoo");
    }

    #[test]
    fn test_remove_inverted_range() {
        let mut buf = TextBuffer::from("hello");
        assert!(buf.remove(3, 1).is_err());
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_remove_empty_range() {
        let mut buf = TextBuffer::from("hello");
        buf.remove(2, 2).unwrap();
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_replace_crossing_line_boundary() {
        let mut buf = TextBuffer::from("ab\ncd\nef");
        buf.replace(1, 4, "X\nY").unwrap();
        assert_eq!(buf.to_string(), "aX\nYd\nef");
    }

    #[test]
    fn test_replace_out_of_bounds_leaves_text() {
        let mut buf = TextBuffer::from("hello");
        assert!(buf.replace(0, 100, "x").is_err());
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_slice_multibyte() {
        let buf = TextBuffer::from("héllo wörld");
        assert_eq!(buf.slice(1, 4).unwrap(), "éll");
        assert_eq!(buf.slice(7, 8).unwrap(), "ö");
    }

    #[test]
    fn test_apply_edit_is_pure() {
        let text = "fn main() {}";
        let out = apply_edit(text, &Edit::insert(11, " ")).unwrap();
        assert_eq!(out, "fn main() { }");
        assert_eq!(text, "fn main() {}");
    }

    #[test]
    fn test_apply_edit_zero_length_insert_everywhere() {
        let text = "ab\ncd\n";
        for at in 0..=text.chars().count() {
            assert_eq!(apply_edit(text, &Edit::insert(at, "")).unwrap(), text);
        }
    }

    #[test]
    fn test_apply_edit_replace_all() {
        let out = apply_edit("old", &Edit::ReplaceAll("new\ntext".to_string())).unwrap();
        assert_eq!(out, "new\ntext");
    }

    #[test]
    fn test_apply_edit_keeps_chars_outside_range() {
        let text = "0123456789";
        let out = apply_edit(text, &Edit::replace(3, 6, "abc")).unwrap();
        assert_eq!(&out[..3], "012");
        assert_eq!(&out[6..], "6789");
    }

    #[test]
    fn test_caret_after_edit_away_from_caret() {
        // before the caret: shift by the length change
        assert_eq!(Edit::delete(0, 2).caret_after(9), 7);
        assert_eq!(Edit::insert(0, "ab").caret_after(9), 11);
        assert_eq!(Edit::replace(0, 3, "x").caret_after(9), 7);
        // after the caret: untouched
        assert_eq!(Edit::insert(2, "héllo").caret_after(0), 0);
        assert_eq!(Edit::delete(4, 6).caret_after(1), 1);
        assert_eq!(Edit::replace(5, 6, "zz").caret_after(3), 3);
    }

    #[test]
    fn test_caret_after() {
        assert_eq!(Edit::insert(2, "héllo").caret_after(2), 7);
        assert_eq!(Edit::delete(3, 8).caret_after(8), 3);
        assert_eq!(Edit::delete(3, 8).caret_after(5), 3);
        assert_eq!(Edit::replace(1, 4, "xy").caret_after(4), 3);
        assert_eq!(Edit::replace(1, 4, "xy").caret_after(1), 3);
        assert_eq!(Edit::ReplaceAll("abc".to_string()).caret_after(10), 3);
        assert_eq!(Edit::ReplaceAll("abcdef".to_string()).caret_after(2), 2);
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    #[test]
    fn test_map_text_only_touches_inserted_text() {
        let edit = Edit::replace(1, 2, "a\r\nb").map_text(normalize_line_endings);
        assert_eq!(edit, Edit::replace(1, 2, "a\nb"));
        let edit = Edit::delete(1, 2).map_text(|_| "ignored".to_string());
        assert_eq!(edit, Edit::delete(1, 2));
    }
}
