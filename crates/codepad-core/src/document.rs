//! The single mutable document cell a widget owns.
//!
//! A `Document` holds the canonical text, the active language, the caret
//! offset and the display flags. Everything rendered from it (line index,
//! styled spans, caret line/column) is derived and recomputed on demand.

use std::cell::OnceCell;

use crate::buffer::{normalize_line_endings, Edit, TextBuffer};
use crate::caret::CaretPosition;
use crate::error::EditorError;
use crate::indent::{detect_indent, IndentStyle};
use crate::language::Language;
use crate::line_index::LineIndex;

/// View toggles. None of them touch the text or the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    pub dark_mode: bool,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            dark_mode: false,
            word_wrap: false,
            show_line_numbers: true,
        }
    }
}

impl DisplayFlags {
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn toggle_word_wrap(&mut self) -> bool {
        self.word_wrap = !self.word_wrap;
        self.word_wrap
    }

    pub fn toggle_line_numbers(&mut self) -> bool {
        self.show_line_numbers = !self.show_line_numbers;
        self.show_line_numbers
    }
}

#[derive(Debug, Default)]
pub struct Document {
    buffer: TextBuffer,
    language: Language,
    /// View toggles.
    pub display: DisplayFlags,
    /// Caret as a char offset, always `<= buffer.len_chars()`.
    caret: usize,
    indent: IndentStyle,
    /// Bumped on every buffer mutation.
    content_version: u64,
    /// Built on first use after each mutation.
    line_index: OnceCell<LineIndex>,
}

impl Document {
    /// Creates an empty JavaScript document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document seeded with `text`, caret at the start.
    ///
    /// Line endings are normalized and the indent style is detected from the
    /// content, keeping the default when nothing is indented.
    pub fn from_seed(text: &str, language: Language) -> Self {
        let text = normalize_line_endings(text);
        Self {
            buffer: TextBuffer::from(text.as_str()),
            language,
            indent: detect_indent(&text).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Overrides the indent inserted by [`Document::insert_indent`].
    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    /// Returns the canonical text.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn indent(&self) -> IndentStyle {
        self.indent
    }

    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Returns the caret offset.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Returns the caret with its derived line and column.
    pub fn caret_position(&self) -> CaretPosition {
        CaretPosition::from_index(self.line_index(), self.caret)
    }

    /// Moves the caret, clamping it to the text. Returns the new offset.
    pub fn set_caret(&mut self, offset: usize) -> usize {
        self.caret = offset.min(self.buffer.len_chars());
        self.caret
    }

    /// Returns the line index for the current text.
    pub fn line_index(&self) -> &LineIndex {
        self.line_index
            .get_or_init(|| LineIndex::build(&self.buffer.to_string()))
    }

    /// Applies an edit and moves the caret to where the edit leaves it.
    ///
    /// Inserted text has its line endings normalized first. Returns whether
    /// the text changed; no-op edits leave text and caret alone.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidEdit`] if the edit does not fit the
    /// text. The document is unchanged in that case.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<bool, EditorError> {
        let edit = edit.map_text(normalize_line_endings);
        let noop = match &edit {
            Edit::Insert { text, .. } => text.is_empty(),
            Edit::Delete { start, end } => start == end,
            Edit::Replace { start, end, text } => start == end && text.is_empty(),
            Edit::ReplaceAll(text) => *text == self.buffer.to_string(),
        };

        self.buffer.apply(&edit)?;
        if noop {
            return Ok(false);
        }

        self.caret = edit.caret_after(self.caret).min(self.buffer.len_chars());
        self.content_version += 1;
        self.line_index = OnceCell::new();
        Ok(true)
    }

    /// Inserts `text` at the caret.
    ///
    /// # Errors
    ///
    /// Never fails in practice since the caret is kept in bounds; the
    /// result mirrors [`Document::apply_edit`].
    pub fn insert_at_caret(&mut self, text: &str) -> Result<bool, EditorError> {
        self.apply_edit(&Edit::insert(self.caret, text))
    }

    /// Inserts one indent level at the caret (the Tab key).
    ///
    /// # Errors
    ///
    /// See [`Document::insert_at_caret`].
    pub fn insert_indent(&mut self) -> Result<bool, EditorError> {
        let indent = self.indent.indent_text();
        self.insert_at_caret(&indent)
    }

    /// Switches to the language named by `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnsupportedLanguage`] and keeps the current
    /// language if `tag` is not supported.
    pub fn set_language(&mut self, tag: &str) -> Result<Language, EditorError> {
        self.language = tag.parse()?;
        Ok(self.language)
    }

    /// Switches to the language named by `tag`, or JavaScript if it is not
    /// supported.
    pub fn set_language_or_default(&mut self, tag: &str) -> Language {
        self.language = Language::resolve(tag);
        self.language
    }
}
