//! Supported language tags.
//!
//! The widget highlights a fixed set of languages. Tags outside the set are
//! rejected by [`FromStr`] and mapped to the default by [`Language::resolve`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::EditorError;

/// A language the highlighter is asked to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    JavaScript,
    TypeScript,
    Html,
    Css,
    Python,
    Java,
    Cpp,
    Ruby,
    Php,
    Sql,
}

impl Language {
    /// Returns every supported language, in picker order.
    pub fn all() -> &'static [Language] {
        &[
            Language::JavaScript,
            Language::TypeScript,
            Language::Html,
            Language::Css,
            Language::Python,
            Language::Java,
            Language::Cpp,
            Language::Ruby,
            Language::Php,
            Language::Sql,
        ]
    }

    /// Returns the canonical tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Sql => "sql",
        }
    }

    /// Returns the label shown in the language picker.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Cpp => "C++",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Sql => "SQL",
        }
    }

    /// Parses `tag`, falling back to JavaScript when it is not supported.
    pub fn resolve(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|e: EditorError| {
            tracing::warn!("{e}, falling back to {}", Self::default().tag());
            Self::default()
        })
    }

    /// Detects the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Self::TypeScript,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "py" | "pyw" | "pyi" => Self::Python,
            "java" => Self::Java,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" | "h" => Self::Cpp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "sql" => Self::Sql,
            _ => return None,
        };
        Some(lang)
    }

    /// Detects the language from a file path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl FromStr for Language {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|lang| lang.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EditorError::UnsupportedLanguage(wanted.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
