//! Markup-to-block parser.
//!
//! A small state machine with two pending slots: list items and table rows.
//! At most one slot is filled at a time. [`Parser::flush`] emits whichever is
//! pending; it runs whenever the next line does not extend the block being
//! accumulated, on blank lines, and once at end of input.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::line::{Line, RuleMark, classify};

/// Bullet or numbered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// A rectangular table. The first row is the header.
///
/// Deserialization goes through [`TableBlock::from_rows`], so decoded tables
/// are padded like parsed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTable")]
pub struct TableBlock {
    rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct RawTable {
    rows: Vec<Vec<String>>,
}

impl From<RawTable> for TableBlock {
    fn from(raw: RawTable) -> Self {
        Self::from_rows(raw.rows)
    }
}

impl TableBlock {
    /// Pad every row with empty cells up to the widest row.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One structural element of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    /// `start` is the number of the first item; always 1 for bullets.
    List {
        kind: ListKind,
        start: u32,
        items: Vec<String>,
    },
    Table(TableBlock),
    Rule { mark: RuleMark },
    Paragraph { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accumulating {
    List(ListKind),
    Table,
}

#[derive(Debug)]
struct PendingList {
    kind: ListKind,
    start: u32,
    items: Vec<String>,
}

/// Incremental parser; feed lines, then call [`Parser::finish`].
#[derive(Debug, Default)]
pub struct Parser {
    blocks: Vec<Block>,
    pending_list: Option<PendingList>,
    pending_table: Option<Vec<Vec<String>>>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) {
        self.push(classify(line));
    }

    pub fn push(&mut self, line: Line) {
        let target = match &line {
            Line::Bullet(_) => Some(Accumulating::List(ListKind::Bullet)),
            Line::Numbered { .. } => Some(Accumulating::List(ListKind::Numbered)),
            Line::TableRow(_) | Line::TableSeparator => Some(Accumulating::Table),
            _ => None,
        };
        if target.is_none() || target != self.accumulating() {
            self.flush();
        }

        match line {
            Line::Heading { level, text } => self.blocks.push(Block::Heading { level, text }),
            Line::Bullet(item) => self.push_item(ListKind::Bullet, 1, item),
            Line::Numbered { number, text } => self.push_item(ListKind::Numbered, number, text),
            Line::TableRow(cells) => self.pending_table.get_or_insert_with(Vec::new).push(cells),
            Line::TableSeparator => {
                self.pending_table.get_or_insert_with(Vec::new);
            }
            Line::Rule(mark) => self.blocks.push(Block::Rule { mark }),
            Line::Paragraph(text) => self.blocks.push(Block::Paragraph { text }),
            Line::Blank => {}
        }
    }

    /// Emit the pending list or table, if any, and clear the slot.
    pub fn flush(&mut self) {
        if let Some(PendingList { kind, start, items }) = self.pending_list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List { kind, start, items });
            }
        }
        if let Some(rows) = self.pending_table.take() {
            if !rows.is_empty() {
                self.blocks.push(Block::Table(TableBlock::from_rows(rows)));
            }
        }
    }

    pub fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }

    fn accumulating(&self) -> Option<Accumulating> {
        if let Some(list) = &self.pending_list {
            Some(Accumulating::List(list.kind))
        } else if self.pending_table.is_some() {
            Some(Accumulating::Table)
        } else {
            None
        }
    }

    /// The first item of a list fixes its start number.
    fn push_item(&mut self, kind: ListKind, number: u32, item: String) {
        self.pending_list
            .get_or_insert_with(|| PendingList {
                kind,
                start: number,
                items: Vec::new(),
            })
            .items
            .push(item);
    }
}

/// Parse a whole markup document.
pub fn parse(content: &str) -> Vec<Block> {
    let mut parser = Parser::new();
    for line in content.lines() {
        parser.push_line(line);
    }
    let blocks = parser.finish();
    debug!(blocks = blocks.len(), "parsed markup");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullets(items: &[&str]) -> Block {
        Block::List {
            kind: ListKind::Bullet,
            start: 1,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn numbered(start: u32, items: &[&str]) -> Block {
        Block::List {
            kind: ListKind::Numbered,
            start,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn table(rows: &[&[&str]]) -> Block {
        Block::Table(TableBlock::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        ))
    }

    /// Count the source lines each block accounts for.
    fn records(blocks: &[Block]) -> usize {
        blocks
            .iter()
            .map(|b| match b {
                Block::List { items, .. } => items.len(),
                Block::Table(t) => t.rows().len(),
                _ => 1,
            })
            .sum()
    }

    #[test]
    fn test_heading_list_table_sequence() {
        let blocks = parse("# Title\n- item one\n- item two\n| A | B |\n| 1 | 2 |");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".into()
                },
                bullets(&["item one", "item two"]),
                table(&[&["A", "B"], &["1", "2"]]),
            ]
        );
    }

    #[test]
    fn test_separator_rows_are_dropped() {
        let blocks = parse("| Name | Qty |\n|------|-----|\n| Bolt | 4 |");
        assert_eq!(blocks, vec![table(&[&["Name", "Qty"], &["Bolt", "4"]])]);
    }

    #[test]
    fn test_table_is_rectangular() {
        let blocks = parse("| a | b | c |\n| 1 |\n| x | y |");
        let Block::Table(t) = &blocks[0] else {
            panic!("expected table, got {blocks:?}");
        };
        assert_eq!(t.width(), 3);
        assert!(t.rows().iter().all(|r| r.len() == 3));
        assert_eq!(t.rows()[1], vec!["1", "", ""]);
        assert_eq!(t.rows()[2], vec!["x", "y", ""]);
    }

    #[test]
    fn test_header_and_body() {
        let t = TableBlock::from_rows(vec![vec!["h".into()], vec!["b".into()]]);
        assert_eq!(t.header(), Some(&["h".to_string()][..]));
        assert_eq!(t.body().len(), 1);
        assert!(TableBlock::from_rows(vec![]).body().is_empty());
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let blocks = parse("- a\n- b\n\n- c");
        assert_eq!(blocks, vec![bullets(&["a", "b"]), bullets(&["c"])]);
    }

    #[test]
    fn test_blank_line_splits_tables() {
        let blocks = parse("| a |\n| 1 |\n\n| b |\n| 2 |");
        assert_eq!(
            blocks,
            vec![table(&[&["a"], &["1"]]), table(&[&["b"], &["2"]])]
        );
    }

    #[test]
    fn test_table_after_bullets_flushes_list() {
        let blocks = parse("- a\n| x |\n- b");
        assert_eq!(blocks, vec![bullets(&["a"]), table(&[&["x"]]), bullets(&["b"])]);
    }

    #[test]
    fn test_bullet_to_numbered_switch_flushes() {
        let blocks = parse("- a\n1. one\n2. two");
        assert_eq!(
            blocks,
            vec![bullets(&["a"]), numbered(1, &["one", "two"])]
        );
    }

    #[test]
    fn test_numbered_list_keeps_written_start() {
        let blocks = parse("Intro\n3. third step\n\n4. fourth step\n5. fifth step");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph {
                    text: "Intro".into()
                },
                numbered(3, &["third step"]),
                numbered(4, &["fourth step", "fifth step"]),
            ]
        );
    }

    #[test]
    fn test_table_deserialization_pads_rows() {
        let block: Block =
            serde_json::from_str(r#"{"type":"table","rows":[["a","b","c"],["1"]]}"#).unwrap();
        let Block::Table(t) = block else {
            panic!("expected table");
        };
        assert_eq!(t.width(), 3);
        assert_eq!(t.rows()[1], vec!["1", "", ""]);
    }

    #[test]
    fn test_table_serialization_roundtrips() {
        let original = table(&[&["h1", "h2"], &["x", ""]]);
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_paragraph_and_rules_flush() {
        let blocks = parse("- a\nText **bold**\n---\n===");
        assert_eq!(
            blocks,
            vec![
                bullets(&["a"]),
                Block::Paragraph {
                    text: "Text **bold**".into()
                },
                Block::Rule {
                    mark: RuleMark::Dashes
                },
                Block::Rule {
                    mark: RuleMark::Equals
                },
            ]
        );
    }

    #[test]
    fn test_lone_separator_emits_nothing() {
        assert!(parse("|---|---|").is_empty());
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
    }

    #[test]
    fn test_every_content_line_is_accounted_for() {
        let content = "\
# Report
Intro with *emphasis*.

## Numbers
| Item | Cost |
|------|------|
| A | $5 |
| B | $7 |
- first
- second
1. step
2) step
---
### Closing
***
Bye
===
";
        let expected = content
            .lines()
            .map(classify)
            .filter(|l| !matches!(l, Line::Blank | Line::TableSeparator))
            .count();
        let blocks = parse(content);
        assert_eq!(records(&blocks), expected);
    }

    #[test]
    fn test_crlf_input() {
        let blocks = parse("# T\r\n- a\r\n- b\r\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], bullets(&["a", "b"]));
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let json = serde_json::to_value(Block::Heading {
            level: 2,
            text: "x".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
    }
}
