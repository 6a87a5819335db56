//! Text/highlight synchronization engine for the codepad widget.
//!
//! The pipeline is pure: an edit goes through the buffer model, the new text
//! is projected into styled spans, and the caret is re-derived from its
//! linear offset. The only long-lived state is the [`Document`] owned by the host.
pub mod buffer;
pub mod caret;
pub mod document;
pub mod error;
pub mod highlight;
pub mod indent;
pub mod language;
pub mod line_index;
pub mod markup;

pub use buffer::{apply_edit, normalize_line_endings, Edit, TextBuffer};
pub use caret::{CaretPosition, LineColumn, SpanCursor};
pub use document::{DisplayFlags, Document};
pub use error::EditorError;
pub use highlight::{Highlight, HighlightProjector, PlainHighlighter, StyledSpan};
pub use indent::IndentStyle;
pub use language::Language;
pub use line_index::LineIndex;
