//! Decoding of highlighter markup into styled spans.
//!
//! Highlighters emit text wrapped in (possibly nested)
//! `<span class="...">` tags with HTML entities escaped. Anything else is
//! treated as malformed output.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EditorError;
use crate::highlight::StyledSpan;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([^<>]*)>").expect("valid tag regex"));

static CLASS_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:class="([^"<>]*)")?\s*$"#).expect("valid class regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9A-Fa-f]{1,6}|#[0-9]{1,7}|[A-Za-z]+);").expect("valid entity regex")
});

fn malformed(reason: impl Into<String>) -> EditorError {
    EditorError::HighlightFailure(reason.into())
}

/// Escapes text so it can be embedded in markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decodes the entities in one run of markup text.
///
/// # Errors
///
/// Returns [`EditorError::HighlightFailure`] on a stray `&`, `<` or `>`, an
/// unknown named entity, or a numeric entity that is not a valid char.
pub fn decode_entities(raw: &str) -> Result<String, EditorError> {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in ENTITY.captures_iter(raw) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut out, &raw[last..whole.start()])?;
        let name = &caps[1];
        let ch = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = name.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => None,
            }
        };
        out.push(ch.ok_or_else(|| malformed(format!("unknown entity &{name};")))?);
        last = whole.end();
    }
    push_literal(&mut out, &raw[last..])?;
    Ok(out)
}

fn push_literal(out: &mut String, literal: &str) -> Result<(), EditorError> {
    if let Some(bad) = literal.chars().find(|c| matches!(c, '&' | '<' | '>')) {
        return Err(malformed(format!("stray '{bad}' in markup")));
    }
    out.push_str(literal);
    Ok(())
}

/// Parses highlighter markup into styled spans.
///
/// The innermost enclosing class styles a run of text; a class-less span
/// inherits its parent's class. Adjacent runs with the same class are
/// merged and empty runs dropped.
///
/// # Errors
///
/// Returns [`EditorError::HighlightFailure`] for tags other than `span`,
/// attributes other than `class`, unbalanced tags, or bad entities.
pub fn parse_markup(markup: &str) -> Result<Vec<StyledSpan>, EditorError> {
    let mut spans: Vec<StyledSpan> = Vec::new();
    let mut stack: Vec<Option<String>> = Vec::new();
    let mut last = 0;

    for caps in TAG.captures_iter(markup) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let text = decode_entities(&markup[last..whole.start()])?;
        push_span(&mut spans, text, current_class(&stack));
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = &caps[2];
        let attrs = &caps[3];
        if !name.eq_ignore_ascii_case("span") {
            return Err(malformed(format!("unexpected <{name}> tag")));
        }
        if closing {
            if !attrs.trim().is_empty() {
                return Err(malformed("attributes on closing tag"));
            }
            if stack.pop().is_none() {
                return Err(malformed("unbalanced </span>"));
            }
        } else {
            let class = CLASS_ATTR
                .captures(attrs)
                .ok_or_else(|| malformed(format!("unsupported span attributes '{}'", attrs.trim())))?
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|c| !c.is_empty());
            stack.push(class);
        }
    }

    let text = decode_entities(&markup[last..])?;
    push_span(&mut spans, text, current_class(&stack));

    if !stack.is_empty() {
        return Err(malformed(format!("{} unclosed span(s)", stack.len())));
    }
    Ok(spans)
}

fn current_class(stack: &[Option<String>]) -> Option<&str> {
    stack.iter().rev().find_map(|c| c.as_deref())
}

fn push_span(spans: &mut Vec<StyledSpan>, text: String, class: Option<&str>) {
    if text.is_empty() {
        return;
    }
    if let Some(prev) = spans.last_mut() {
        if prev.class.as_deref() == class {
            prev.text.push_str(&text);
            return;
        }
    }
    spans.push(StyledSpan::new(text, class.map(str::to_string)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(spans: &[StyledSpan]) -> Vec<(&str, Option<&str>)> {
        spans
            .iter()
            .map(|s| (s.text.as_str(), s.class.as_deref()))
            .collect()
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup(r#"if (a < b && c > "d") {'e'}"#),
            "if (a &lt; b &amp;&amp; c &gt; &quot;d&quot;) {&#39;e&#39;}"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp; &#39;&#x41;&quot;").unwrap(), "a <b> & 'A\"");
    }

    #[test]
    fn test_decode_rejects_stray_ampersand() {
        assert!(decode_entities("a & b").is_err());
        assert!(decode_entities("&bogus;").is_err());
        assert!(decode_entities("&#xD800;").is_err());
    }

    #[test]
    fn test_parse_flat_spans() {
        let spans = parse_markup(r#"<span class="kw">let</span> x = <span class="num">1</span>;"#).unwrap();
        assert_eq!(
            pairs(&spans),
            vec![
                ("let", Some("kw")),
                (" x = ", None),
                ("1", Some("num")),
                (";", None)
            ]
        );
    }

    #[test]
    fn test_parse_nested_innermost_wins() {
        let markup = r#"<span class="source js"><span class="kw">if</span> (a &lt; b)<span>!</span></span>"#;
        let spans = parse_markup(markup).unwrap();
        assert_eq!(
            pairs(&spans),
            vec![("if", Some("kw")), (" (a < b)!", Some("source js"))]
        );
    }

    #[test]
    fn test_parse_keeps_whitespace_and_newlines() {
        let spans = parse_markup("<span class=\"c\">a\n\t</span>\n\n").unwrap();
        assert_eq!(pairs(&spans), vec![("a\n\t", Some("c")), ("\n\n", None)]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_markup("").unwrap().is_empty());
        assert!(parse_markup("<span class=\"x\"></span>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_markup("<span class=\"a\">open").is_err());
        assert!(parse_markup("close</span>").is_err());
        assert!(parse_markup("<b>bold</b>").is_err());
        assert!(parse_markup("<span style=\"x\">a</span>").is_err());
        assert!(parse_markup("a < b").is_err());
    }

    #[test]
    fn test_escape_then_parse_is_lossless() {
        let text = "<div class=\"a\">&nbsp;'x'</div>\n";
        let spans = parse_markup(&escape_markup(text)).unwrap();
        assert_eq!(pairs(&spans), vec![(text, None)]);
    }
}
