//! Input events a host feeds the widget, and the change notices it emits.

use codepad_core::{DisplayFlags, Edit, Language};

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A raw buffer edit, e.g. from an IME or a host-side command.
    Edit(Edit),
    /// Text typed at the caret.
    Type(String),
    /// Clipboard text pasted at the caret. Pasted markup stays literal text.
    Paste(String),
    /// The Tab key: insert one indent level.
    Tab,
    /// Move the caret to a char offset.
    MoveCaret(usize),
    /// Move the caret to a 1-based line and column.
    MoveCaretTo { line: usize, column: usize },
    /// Pick a language from the popover.
    SetLanguage(String),
    ToggleDarkMode,
    ToggleWordWrap,
    ToggleLineNumbers,
    /// Copy the whole text to the clipboard.
    Copy,
    TogglePopover,
    DismissPopover,
}

/// What changed after an event, for the host's `on_change` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    /// The new full text.
    Text(String),
    Language(Language),
    Display(DisplayFlags),
}
