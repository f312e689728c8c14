//! Single-line classification.
//!
//! Every input line maps to exactly one [`Line`]. Rules are checked in a
//! fixed priority order, so `"* item"` is a bullet and `"***"` is a rule.

use serde::{Deserialize, Serialize};

/// Which horizontal-rule marker a divider line used.
///
/// Renderers decide what a mark means: the PDF writer draws a rule for the
/// first three and breaks the page for `===`, the Word writer breaks the page
/// for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMark {
    Dashes,
    Asterisks,
    Underscores,
    Equals,
}

impl RuleMark {
    fn from_trimmed(s: &str) -> Option<Self> {
        match s {
            "---" => Some(Self::Dashes),
            "***" => Some(Self::Asterisks),
            "___" => Some(Self::Underscores),
            "===" => Some(Self::Equals),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashes => "---",
            Self::Asterisks => "***",
            Self::Underscores => "___",
            Self::Equals => "===",
        }
    }
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Heading { level: u8, text: String },
    Bullet(String),
    /// `number` is the value the author wrote, e.g. 3 for `"3. step"`.
    Numbered { number: u32, text: String },
    TableRow(Vec<String>),
    /// `|---|---|` style row; continues a table but carries no data.
    TableSeparator,
    Rule(RuleMark),
    Paragraph(String),
    Blank,
}

impl Line {
    /// Short lowercase name, used in logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Bullet(_) => "bullet",
            Self::Numbered { .. } => "numbered",
            Self::TableRow(_) => "table_row",
            Self::TableSeparator => "table_separator",
            Self::Rule(_) => "rule",
            Self::Paragraph(_) => "paragraph",
            Self::Blank => "blank",
        }
    }
}

const HEADING_PREFIXES: [(&str, u8); 3] = [("# ", 1), ("## ", 2), ("### ", 3)];

/// Classify one line of markup.
pub fn classify(line: &str) -> Line {
    for (prefix, level) in HEADING_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Line::Heading {
                level,
                text: rest.trim().to_string(),
            };
        }
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Line::Bullet(rest.trim().to_string());
    }

    if let Some((number, rest)) = split_number_marker(line) {
        return Line::Numbered {
            number,
            text: rest.trim().to_string(),
        };
    }

    if line.starts_with('|') {
        let cells = split_table_row(line);
        if is_separator_row(&cells) {
            return Line::TableSeparator;
        }
        return Line::TableRow(cells);
    }

    let trimmed = line.trim();
    if let Some(mark) = RuleMark::from_trimmed(trimmed) {
        return Line::Rule(mark);
    }

    if trimmed.is_empty() {
        Line::Blank
    } else {
        Line::Paragraph(trimmed.to_string())
    }
}

/// `"12. text"` / `"3) text"` -> `Some((12, "text"))`. Numbers too large
/// for `u32` saturate.
fn split_number_marker(line: &str) -> Option<(u32, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some('.' | ')'), Some(' ')) => {
            let number = line[..digits].parse().unwrap_or(u32::MAX);
            Some((number, &rest[2..]))
        }
        _ => None,
    }
}

/// Split a pipe-delimited row into trimmed cells, dropping the outer pipes.
pub fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// True when every cell is made only of dashes, colons, pipes and spaces.
pub fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| c.chars().all(|ch| matches!(ch, '-' | ':' | '|' | ' ')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_by_level() {
        assert_eq!(
            classify("# Title "),
            Line::Heading {
                level: 1,
                text: "Title".into()
            }
        );
        assert_eq!(
            classify("## Sub"),
            Line::Heading {
                level: 2,
                text: "Sub".into()
            }
        );
        assert_eq!(
            classify("### Deep"),
            Line::Heading {
                level: 3,
                text: "Deep".into()
            }
        );
    }

    #[test]
    fn test_fourth_level_heading_is_paragraph() {
        assert_eq!(classify("#### Four"), Line::Paragraph("#### Four".into()));
        assert_eq!(classify("#hashtag"), Line::Paragraph("#hashtag".into()));
    }

    #[test]
    fn test_bullets() {
        assert_eq!(classify("- one"), Line::Bullet("one".into()));
        assert_eq!(classify("* two "), Line::Bullet("two".into()));
        assert_eq!(classify("-no space"), Line::Paragraph("-no space".into()));
    }

    #[test]
    fn test_numbered_items() {
        let numbered = |number, text: &str| Line::Numbered {
            number,
            text: text.into(),
        };
        assert_eq!(classify("1. first"), numbered(1, "first"));
        assert_eq!(classify("2) second"), numbered(2, "second"));
        assert_eq!(classify("10. tenth"), numbered(10, "tenth"));
        assert_eq!(classify("007. bond"), numbered(7, "bond"));
        assert_eq!(classify("99999999999. huge"), numbered(u32::MAX, "huge"));
        assert_eq!(classify("1.5 million"), Line::Paragraph("1.5 million".into()));
        assert_eq!(classify("2024 was good"), Line::Paragraph("2024 was good".into()));
    }

    #[test]
    fn test_table_rows_and_separators() {
        assert_eq!(
            classify("| A | B |"),
            Line::TableRow(vec!["A".into(), "B".into()])
        );
        assert_eq!(classify("|---|---|"), Line::TableSeparator);
        assert_eq!(classify("| :--- | ---: |"), Line::TableSeparator);
        assert_eq!(classify("| | |"), Line::TableSeparator);
        assert_eq!(
            classify("| x | |"),
            Line::TableRow(vec!["x".into(), "".into()])
        );
    }

    #[test]
    fn test_rules() {
        assert_eq!(classify("---"), Line::Rule(RuleMark::Dashes));
        assert_eq!(classify("  *** "), Line::Rule(RuleMark::Asterisks));
        assert_eq!(classify("___"), Line::Rule(RuleMark::Underscores));
        assert_eq!(classify("==="), Line::Rule(RuleMark::Equals));
        assert_eq!(classify("----"), Line::Paragraph("----".into()));
    }

    #[test]
    fn test_bold_paragraph_is_not_bullet() {
        assert_eq!(
            classify("**Note:** read this"),
            Line::Paragraph("**Note:** read this".into())
        );
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(classify(""), Line::Blank);
        assert_eq!(classify("   \t"), Line::Blank);
    }

    #[test]
    fn test_split_table_row_without_trailing_pipe() {
        assert_eq!(split_table_row("| a | b"), vec!["a", "b"]);
    }
}
