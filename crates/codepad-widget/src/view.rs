//! The rendered state of a widget after one pass.

use std::fmt::Write as _;

use codepad_core::caret::locate_in_spans;
use codepad_core::markup::escape_markup;
use codepad_core::{CaretPosition, DisplayFlags, Language, SpanCursor, StyledSpan};

use crate::notifications::Notice;

/// One visual line of the code area, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// 1-based line number shown in the gutter.
    pub number: usize,
    pub spans: Vec<StyledSpan>,
}

impl RenderedLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Everything a host needs to paint the widget.
#[derive(Debug, Clone)]
pub struct RenderedView {
    pub language: Language,
    pub lines: Vec<RenderedLine>,
    pub caret: CaretPosition,
    /// The caret located inside the flat span list it was rendered from.
    pub caret_in_spans: SpanCursor,
    pub flags: DisplayFlags,
    pub notices: Vec<Notice>,
    pub popover_open: bool,
    /// Status bar text, e.g. "Ln 2, Col 5".
    pub status: String,
}

impl RenderedView {
    /// Builds a view from the projected spans of the whole text.
    pub fn build(
        language: Language,
        spans: &[StyledSpan],
        caret: CaretPosition,
        flags: DisplayFlags,
        notices: Vec<Notice>,
        popover_open: bool,
    ) -> Self {
        Self {
            language,
            lines: split_lines(spans),
            caret,
            caret_in_spans: locate_in_spans(spans, caret.offset),
            flags,
            notices,
            popover_open,
            status: caret.line_column().to_string(),
        }
    }

    /// Returns the text the view shows, lines joined with `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the widget as an HTML fragment.
    ///
    /// Span classes come straight from the highlighter; pair the output with
    /// the matching stylesheet.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut root = vec![
            "codepad",
            if self.flags.dark_mode {
                "codepad-dark"
            } else {
                "codepad-light"
            },
        ];
        if self.flags.word_wrap {
            root.push("codepad-wrap");
        }
        if self.flags.show_line_numbers {
            root.push("codepad-numbered");
        }
        let _ = writeln!(
            out,
            "<div class=\"{}\" data-language=\"{}\">",
            root.join(" "),
            self.language.tag()
        );

        let _ = writeln!(
            out,
            "<div class=\"codepad-toolbar\"><button class=\"codepad-language\">{}</button></div>",
            escape_markup(self.language.display_name())
        );
        if self.popover_open {
            out.push_str(&self.popover_html());
        }

        out.push_str("<pre class=\"codepad-code\">");
        for line in &self.lines {
            out.push_str("<div class=\"codepad-line\">");
            if self.flags.show_line_numbers {
                let _ = write!(out, "<span class=\"codepad-gutter\">{}</span>", line.number);
            }
            for span in &line.spans {
                let text = escape_markup(&span.text);
                match &span.class {
                    Some(class) => {
                        let _ = write!(out, "<span class=\"{}\">{text}</span>", escape_markup(class));
                    }
                    None => out.push_str(&text),
                }
            }
            out.push_str("</div>");
        }
        out.push_str("</pre>\n");

        let _ = writeln!(
            out,
            "<div class=\"codepad-status\">{}</div>",
            escape_markup(&self.status)
        );
        for notice in &self.notices {
            let _ = writeln!(
                out,
                "<div class=\"codepad-notice codepad-notice-{}\">{}</div>",
                notice.kind.css_class(),
                escape_markup(&notice.message)
            );
        }
        out.push_str("</div>\n");
        out
    }

    fn popover_html(&self) -> String {
        let mut out = String::from("<ul class=\"codepad-popover\">");
        for lang in Language::all() {
            let selected = if *lang == self.language {
                " class=\"selected\""
            } else {
                ""
            };
            let _ = write!(
                out,
                "<li data-language=\"{}\"{selected}>{}</li>",
                lang.tag(),
                escape_markup(lang.display_name())
            );
        }
        out.push_str("</ul>\n");
        out
    }
}

/// Splits a flat span list at each `\n`, keeping classes on both halves.
fn split_lines(spans: &[StyledSpan]) -> Vec<RenderedLine> {
    let mut lines = vec![RenderedLine {
        number: 1,
        spans: Vec::new(),
    }];
    for span in spans {
        let mut parts = span.text.split('\n');
        if let Some(first) = parts.next() {
            push_part(&mut lines, first, &span.class);
        }
        for part in parts {
            let number = lines.len() + 1;
            lines.push(RenderedLine {
                number,
                spans: Vec::new(),
            });
            push_part(&mut lines, part, &span.class);
        }
    }
    lines
}

fn push_part(lines: &mut [RenderedLine], text: &str, class: &Option<String>) {
    if text.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.spans.push(StyledSpan::new(text, class.clone()));
    }
}
