//! Inline emphasis: `**bold**` and `*italic*`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*").expect("valid emphasis regex"));

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }
}

/// Split `text` into emphasis spans. Unmatched markers stay literal.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in EMPHASIS_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        if let Some(bold) = caps.get(1) {
            spans.push(Span::bold(bold.as_str()));
        } else if let Some(italic) = caps.get(2) {
            spans.push(Span::italic(italic.as_str()));
        }
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}

/// Text with the emphasis markers removed.
pub fn strip_markers(text: &str) -> String {
    parse_spans(text).into_iter().map(|s| s.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_span() {
        assert_eq!(parse_spans("hello world"), vec![Span::plain("hello world")]);
    }

    #[test]
    fn test_bold_and_italic() {
        let spans = parse_spans("a **b** c *d* e");
        assert_eq!(
            spans,
            vec![
                Span::plain("a "),
                Span::bold("b"),
                Span::plain(" c "),
                Span::italic("d"),
                Span::plain(" e"),
            ]
        );
    }

    #[test]
    fn test_leading_emphasis() {
        let spans = parse_spans("**Total:** 42");
        assert_eq!(spans, vec![Span::bold("Total:"), Span::plain(" 42")]);
    }

    #[test]
    fn test_unmatched_marker_is_literal() {
        assert_eq!(parse_spans("5 * 3 = 15"), vec![Span::plain("5 * 3 = 15")]);
        assert_eq!(parse_spans("**open"), vec![Span::plain("**open")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_spans("").is_empty());
    }

    #[test]
    fn test_strip_markers() {
        assert_eq!(strip_markers("**Q3** *draft* notes"), "Q3 draft notes");
    }
}
