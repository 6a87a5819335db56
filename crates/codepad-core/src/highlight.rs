//! Highlight projection: canonical text to styled spans.
//!
//! The highlighting function itself is a collaborator behind the
//! [`Highlight`] trait. The projector guarantees that whatever it returns
//! concatenates back to the exact input text, falling back to a single
//! unstyled span when the collaborator fails.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::EditorError;
use crate::language::Language;
use crate::markup::{escape_markup, parse_markup};

/// A literal run of text and the style class it is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledSpan {
    pub text: String,
    /// Style class, or `None` for unstyled text.
    pub class: Option<String>,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, class: Option<String>) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }

    /// Creates an unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Returns the span length in chars.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_styled(&self) -> bool {
        self.class.is_some()
    }
}

/// Concatenates the literal text of `spans`.
pub fn spans_text(spans: &[StyledSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// An external highlighting function.
///
/// Returns the text as markup: escaped text wrapped in
/// `<span class="...">` tags, as understood by [`parse_markup`].
pub trait Highlight {
    /// # Errors
    ///
    /// Returns an error if the text cannot be highlighted for `language`.
    fn highlight(&self, text: &str, language: Language) -> anyhow::Result<String>;
}

impl<H: Highlight + ?Sized> Highlight for Box<H> {
    fn highlight(&self, text: &str, language: Language) -> anyhow::Result<String> {
        (**self).highlight(text, language)
    }
}

impl<H: Highlight + ?Sized> Highlight for &H {
    fn highlight(&self, text: &str, language: Language) -> anyhow::Result<String> {
        (**self).highlight(text, language)
    }
}

/// A highlighter that styles nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlight for PlainHighlighter {
    fn highlight(&self, text: &str, _language: Language) -> anyhow::Result<String> {
        Ok(escape_markup(text))
    }
}

/// Turns text into styled spans through a [`Highlight`] collaborator.
#[derive(Debug)]
pub struct HighlightProjector<H> {
    highlighter: H,
    fallbacks: AtomicU64,
}

impl<H: Highlight> HighlightProjector<H> {
    pub fn new(highlighter: H) -> Self {
        Self {
            highlighter,
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Returns how many projections fell back to unstyled text.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Projects `text` into styled spans, never failing.
    ///
    /// On any highlighter failure the whole text comes back as one
    /// unstyled span.
    pub fn project(&self, text: &str, language: Language) -> Vec<StyledSpan> {
        match self.try_project(text, language) {
            Ok(spans) => spans,
            Err(e) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("{e}; rendering {language} text unstyled");
                vec![StyledSpan::plain(text)]
            }
        }
    }

    /// Projects `text`, reporting why highlighting failed instead of
    /// falling back.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::HighlightFailure`] if the highlighter errors or
    /// panics, its markup is malformed, or the markup does not decode back
    /// to `text`.
    pub fn try_project(&self, text: &str, language: Language) -> Result<Vec<StyledSpan>, EditorError> {
        let markup = panic::catch_unwind(AssertUnwindSafe(|| {
            self.highlighter.highlight(text, language)
        }))
        .map_err(|_| EditorError::HighlightFailure("highlighter panicked".to_string()))?
        .map_err(|e| EditorError::highlight(&e))?;

        let spans = parse_markup(&markup)?;
        if spans_text(&spans) != text {
            return Err(EditorError::HighlightFailure(
                "highlighted text does not match the document".to_string(),
            ));
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMarkup(&'static str);

    impl Highlight for FixedMarkup {
        fn highlight(&self, _text: &str, _language: Language) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl Highlight for Failing {
        fn highlight(&self, _text: &str, language: Language) -> anyhow::Result<String> {
            anyhow::bail!("no grammar for {language}")
        }
    }

    struct Panicking;

    impl Highlight for Panicking {
        fn highlight(&self, _text: &str, _language: Language) -> anyhow::Result<String> {
            panic!("grammar exploded")
        }
    }

    /// Wraps every word in a `w` span.
    struct Words;

    impl Highlight for Words {
        fn highlight(&self, text: &str, _language: Language) -> anyhow::Result<String> {
            let mut out = String::new();
            for (i, word) in text.split(' ').enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                if !word.is_empty() {
                    out.push_str(&format!("<span class=\"w\">{}</span>", escape_markup(word)));
                }
            }
            Ok(out)
        }
    }

    #[test]
    fn test_plain_projection_is_single_span() {
        let projector = HighlightProjector::new(PlainHighlighter);
        let spans = projector.project("a < b\n", Language::Python);
        assert_eq!(spans, vec![StyledSpan::plain("a < b\n")]);
    }

    #[test]
    fn test_projection_reconstructs_text() {
        let projector = HighlightProjector::new(Words);
        for text in ["", "one", "one two  three", " lead & trail ", "x\ny z\n"] {
            let spans = projector.project(text, Language::JavaScript);
            assert_eq!(spans_text(&spans), text);
        }
        assert_eq!(projector.fallback_count(), 0);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let projector = HighlightProjector::new(Words);
        let first = projector.project("let a = b", Language::TypeScript);
        let second = projector.project("let a = b", Language::TypeScript);
        assert_eq!(first, second);
        assert!(first.iter().any(StyledSpan::is_styled));
    }

    #[test]
    fn test_failing_highlighter_falls_back() {
        let projector = HighlightProjector::new(Failing);
        let spans = projector.project("SELECT 1;", Language::Sql);
        assert_eq!(spans, vec![StyledSpan::plain("SELECT 1;")]);
        assert_eq!(projector.fallback_count(), 1);

        let err = projector.try_project("SELECT 1;", Language::Sql).unwrap_err();
        assert_eq!(err, EditorError::HighlightFailure("no grammar for sql".to_string()));
    }

    #[test]
    fn test_panicking_highlighter_falls_back() {
        let projector = HighlightProjector::new(Panicking);
        let spans = projector.project("def f(): pass", Language::Python);
        assert_eq!(spans_text(&spans), "def f(): pass");
        assert_eq!(projector.fallback_count(), 1);
    }

    #[test]
    fn test_lossy_markup_falls_back() {
        // drops the trailing newline
        let projector = HighlightProjector::new(FixedMarkup("<span class=\"k\">fn</span>"));
        assert!(projector.try_project("fn\n", Language::Cpp).is_err());
        assert_eq!(projector.project("fn\n", Language::Cpp), vec![StyledSpan::plain("fn\n")]);
    }

    #[test]
    fn test_malformed_markup_falls_back() {
        let projector = HighlightProjector::new(FixedMarkup("<span class=\"k\">fn"));
        assert_eq!(projector.project("fn", Language::Cpp), vec![StyledSpan::plain("fn")]);
    }

    #[test]
    fn test_boxed_highlighter() {
        let boxed: Box<dyn Highlight> = Box::new(Words);
        let projector = HighlightProjector::new(boxed);
        assert_eq!(spans_text(&projector.project("a b", Language::Ruby)), "a b");
    }
}
