/// Indentation inserted by the Tab key, and detection from seeded content.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    /// Use N spaces per indent level.
    Spaces(usize),
    /// Use a tab character per indent level.
    Tabs,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self::Spaces(2)
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spaces(n) => write!(f, "Spaces: {n}"),
            Self::Tabs => write!(f, "Tabs"),
        }
    }
}

impl IndentStyle {
    /// Returns the text inserted for one indent level.
    pub fn indent_text(&self) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(*n),
            Self::Tabs => "\t".to_string(),
        }
    }
}

/// Detects the indentation used by `text`, if it has any.
///
/// Tab-led lines win when they outnumber space-led ones. Otherwise the
/// widest of 8, 4 and 2 that divides every observed space indent is picked.
pub fn detect_indent(text: &str) -> Option<IndentStyle> {
    let mut tab_lines = 0usize;
    let mut widths = Vec::new();

    for line in text.lines().take(200).filter(|l| !l.trim().is_empty()) {
        match line.chars().next() {
            Some('\t') => tab_lines += 1,
            Some(' ') => widths.push(line.chars().take_while(|c| *c == ' ').count()),
            _ => {}
        }
    }

    if tab_lines == 0 && widths.is_empty() {
        return None;
    }
    if tab_lines > widths.len() {
        return Some(IndentStyle::Tabs);
    }
    [8usize, 4, 2]
        .into_iter()
        .find(|w| widths.iter().all(|n| n % w == 0))
        .map(IndentStyle::Spaces)
}
