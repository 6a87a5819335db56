/// Syntax highlighting integration using syntect.
use anyhow::{Context, Result};
use codepad_core::{Highlight, Language};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Scope classes are prefixed so they cannot clash with the page's own CSS.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const DARK_THEME: &str = "base16-ocean.dark";
const LIGHT_THEME: &str = "InspiredGitHub";

/// Highlights text into classed `<span>` markup with syntect's bundled grammars.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter")
            .field("syntaxes", &self.syntax_set.syntaxes().len())
            .finish_non_exhaustive()
    }
}

impl SyntectHighlighter {
    /// Creates a highlighter with the default syntax definitions and themes.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Finds the grammar for `language`.
    ///
    /// TypeScript falls back to the JavaScript grammar when no TypeScript
    /// grammar is bundled.
    pub fn syntax_for(&self, language: Language) -> Result<&SyntaxReference> {
        let tokens: &[&str] = match language {
            Language::JavaScript => &["js"],
            Language::TypeScript => &["ts", "js"],
            Language::Html => &["html"],
            Language::Css => &["css"],
            Language::Python => &["py"],
            Language::Java => &["java"],
            Language::Cpp => &["cpp"],
            Language::Ruby => &["rb"],
            Language::Php => &["php"],
            Language::Sql => &["sql"],
        };
        tokens
            .iter()
            .find_map(|token| self.syntax_set.find_syntax_by_token(token))
            .with_context(|| format!("no grammar bundled for {language}"))
    }

    /// Returns the CSS for the dark or light theme, matching the span classes
    /// this highlighter emits.
    pub fn stylesheet(&self, dark_mode: bool) -> Result<String> {
        let name = if dark_mode { DARK_THEME } else { LIGHT_THEME };
        let theme = self
            .theme_set
            .themes
            .get(name)
            .with_context(|| format!("theme '{name}' is not bundled"))?;
        css_for_theme_with_class_style(theme, CLASS_STYLE)
            .with_context(|| format!("Failed to generate CSS for theme '{name}'"))
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, text: &str, language: Language) -> Result<String> {
        let syntax = self.syntax_for(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for (idx, line) in LinesWithEndings::from(text).enumerate() {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .with_context(|| format!("Failed to highlight line {}", idx + 1))?;
        }
        Ok(generator.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::highlight::spans_text;
    use codepad_core::HighlightProjector;

    #[test]
    fn syntax_for_every_language() {
        let hl = SyntectHighlighter::new();
        for lang in Language::all() {
            assert!(hl.syntax_for(*lang).is_ok(), "no grammar for {lang}");
        }
        assert_eq!(hl.syntax_for(Language::Python).unwrap().name, "Python");
        assert_eq!(hl.syntax_for(Language::JavaScript).unwrap().name, "JavaScript");
    }

    #[test]
    fn highlight_emits_prefixed_classes() {
        let hl = SyntectHighlighter::new();
        let markup = hl.highlight("def f():\n    return 1\n", Language::Python).unwrap();
        assert!(markup.contains("class=\"hl-"));
    }

    #[test]
    fn highlight_empty_text() {
        let hl = SyntectHighlighter::new();
        let projector = HighlightProjector::new(hl);
        assert!(projector.project("", Language::Css).is_empty());
    }

    #[test]
    fn projection_is_lossless_for_every_language() {
        let projector = HighlightProjector::new(SyntectHighlighter::new());
        let text = "<div class=\"x\">a && b</div>\n\tconst s = 'it''s';\n// done";
        for lang in Language::all() {
            let spans = projector.project(text, *lang);
            assert_eq!(spans_text(&spans), text, "lossy projection for {lang}");
            assert!(spans.iter().any(|s| s.is_styled()), "no styling for {lang}");
        }
        assert_eq!(projector.fallback_count(), 0);
    }

    #[test]
    fn keywords_get_their_own_span() {
        let projector = HighlightProjector::new(SyntectHighlighter::new());
        let spans = projector.project("const x = 1;", Language::JavaScript);
        let keyword = spans.iter().find(|s| s.text == "const").unwrap();
        let number = spans.iter().find(|s| s.text == "1").unwrap();
        assert!(keyword.is_styled());
        assert_ne!(keyword.class, number.class);
    }

    #[test]
    fn stylesheets_differ_by_mode() {
        let hl = SyntectHighlighter::new();
        let dark = hl.stylesheet(true).unwrap();
        let light = hl.stylesheet(false).unwrap();
        assert!(dark.contains(".hl-"));
        assert_ne!(dark, light);
    }
}
