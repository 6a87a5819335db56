/// Error taxonomy for the editing pipeline and its collaborators.
///
/// None of these are fatal to an editing session: callers recover locally
/// (default language, unstyled projection, transient notice, in-memory state).
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The requested language tag is not in the supported set.
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// An edit descriptor referenced offsets outside the buffer.
    #[error("invalid edit: range {start}..{end} (buffer has {len} chars)")]
    InvalidEdit { start: usize, end: usize, len: usize },

    /// The highlighting function failed or produced unusable markup.
    #[error("highlight failed: {0}")]
    HighlightFailure(String),

    /// Writing to the clipboard failed.
    #[error("clipboard unavailable: {0}")]
    ClipboardFailure(String),

    /// Loading from or saving to the session store failed.
    #[error("session store failed: {0}")]
    PersistenceFailure(String),
}

impl EditorError {
    /// Wraps a highlighter error, keeping the full context chain.
    pub fn highlight(err: &anyhow::Error) -> Self {
        Self::HighlightFailure(format!("{err:#}"))
    }

    /// Wraps a clipboard error, keeping the full context chain.
    pub fn clipboard(err: &anyhow::Error) -> Self {
        Self::ClipboardFailure(format!("{err:#}"))
    }

    /// Wraps a session store error, keeping the full context chain.
    pub fn persistence(err: &anyhow::Error) -> Self {
        Self::PersistenceFailure(format!("{err:#}"))
    }
}
