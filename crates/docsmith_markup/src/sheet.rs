//! Spreadsheet input: `===SHEET:Name===` blocks of delimited rows.
//!
//! ```text
//! ===SHEET:Sales===
//! Month|Revenue|Expenses
//! January|50000|30000
//! ===SHEET:Summary===
//! Category,Value
//! Total,105000
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MarkupError;
use crate::line::{is_separator_row, split_table_row};

const SHEET_MARKER: &str = "===SHEET:";

/// Spreadsheet tabs are limited to 31 characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// One worksheet worth of rows. `rows[0]` is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetBlock {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetBlock {
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

/// Split sheet text into named blocks.
///
/// Text with no marker at all is read as a single sheet named `Sheet1`.
/// Blocks without data lines are skipped; an input with no usable block is
/// an error.
pub fn parse_sheets(text: &str) -> Result<Vec<SheetBlock>, MarkupError> {
    let mut sheets = Vec::new();

    if !text.contains(SHEET_MARKER) {
        if let Some(rows) = parse_rows(text.lines()) {
            sheets.push(SheetBlock {
                name: "Sheet1".to_string(),
                rows,
            });
        }
    } else {
        let mut names: Vec<String> = Vec::new();
        for (index, chunk) in text.split(SHEET_MARKER).skip(1).enumerate() {
            let mut lines = chunk.trim().lines();
            let raw_name = lines.next().unwrap_or_default();
            let Some(rows) = parse_rows(lines) else {
                debug!(sheet = raw_name, "skipping sheet without rows");
                continue;
            };
            let name = unique_sheet_name(&sheet_name(raw_name, index), &names);
            names.push(name.clone());
            sheets.push(SheetBlock { name, rows });
        }
    }

    if sheets.is_empty() {
        return Err(MarkupError::NoSheets);
    }
    Ok(sheets)
}

/// `name` itself when no entry of `taken` matches it case-insensitively,
/// otherwise `name` with the smallest free numeric suffix (`Data1`,
/// `Data2`, ...), shortened to stay within [`MAX_SHEET_NAME_LEN`].
pub fn unique_sheet_name(name: &str, taken: &[String]) -> String {
    let is_taken = |candidate: &str| {
        let candidate = candidate.to_lowercase();
        taken.iter().any(|t| t.to_lowercase() == candidate)
    };
    if !is_taken(name) {
        return name.to_string();
    }
    (1u32..)
        .map(|n| {
            let suffix = n.to_string();
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
            let base: String = name.chars().take(keep).collect();
            format!("{base}{suffix}")
        })
        .find(|candidate| !is_taken(candidate.as_str()))
        .unwrap_or_else(|| name.to_string())
}

fn sheet_name(raw: &str, index: usize) -> String {
    let name: String = raw
        .replace("===", "")
        .trim()
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if name.is_empty() {
        format!("Sheet{}", index + 1)
    } else {
        name
    }
}

fn parse_rows<'a>(lines: impl Iterator<Item = &'a str>) -> Option<Vec<Vec<String>>> {
    let data: Vec<&str> = lines.filter(|l| !l.trim().is_empty()).collect();
    let first = data.first()?;

    let rows: Vec<Vec<String>> = if first.contains('|') {
        data.iter()
            .map(|l| split_table_row(l))
            .filter(|cells| !is_separator_row(cells))
            .collect()
    } else {
        data.iter()
            .map(|l| l.split(',').map(|c| c.trim().to_string()).collect())
            .collect()
    };

    if rows.is_empty() { None } else { Some(rows) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sheets_with_different_delimiters() {
        let text = "===SHEET:Sales===\nMonth|Revenue\nJanuary|50000\n===SHEET:Summary===\nCategory,Value\nTotal,105000\n";
        let sheets = parse_sheets(text).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Sales");
        assert_eq!(sheets[0].headers(), &["Month", "Revenue"]);
        assert_eq!(sheets[0].data_rows(), &[vec!["January", "50000"]]);
        assert_eq!(sheets[1].name, "Summary");
        assert_eq!(sheets[1].data_rows()[0], vec!["Total", "105000"]);
    }

    #[test]
    fn test_pipe_delimiter_keeps_thousands_commas() {
        let sheets = parse_sheets("===SHEET:S===\nItem|Cost\nRoof|1,000").unwrap();
        assert_eq!(sheets[0].data_rows()[0], vec!["Roof", "1,000"]);
    }

    #[test]
    fn test_markdown_table_rows() {
        let text = "===SHEET:T===\n| A | B |\n|---|---|\n| 1 | 2 |";
        let sheets = parse_sheets(text).unwrap();
        assert_eq!(sheets[0].rows, vec![vec!["A", "B"], vec!["1", "2"]]);
    }

    #[test]
    fn test_no_marker_is_single_sheet() {
        let sheets = parse_sheets("a,b\n1,2").unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Sheet1");
        assert_eq!(sheets[0].rows.len(), 2);
    }

    #[test]
    fn test_long_name_truncated() {
        let name = "A".repeat(40);
        let sheets = parse_sheets(&format!("===SHEET:{name}===\nx\n1")).unwrap();
        assert_eq!(sheets[0].name.chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_empty_name_gets_default() {
        let sheets = parse_sheets("===SHEET:===\nx\n1\n===SHEET:===\ny\n2").unwrap();
        assert_eq!(sheets[0].name, "Sheet1");
        assert_eq!(sheets[1].name, "Sheet2");
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let text = "===SHEET:Data===\na\n1\n===SHEET:data===\nb\n2\n===SHEET:Data===\nc\n3";
        let sheets = parse_sheets(text).unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Data", "data1", "Data2"]);
    }

    #[test]
    fn test_suffix_stays_within_length_limit() {
        let long = "B".repeat(MAX_SHEET_NAME_LEN);
        let renamed = unique_sheet_name(&long, &[long.clone()]);
        assert_eq!(renamed.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(renamed.ends_with("B1"));
    }

    #[test]
    fn test_default_name_collision() {
        let sheets = parse_sheets("===SHEET:Sheet2===\nx\n1\n===SHEET:===\ny\n2").unwrap();
        assert_eq!(sheets[0].name, "Sheet2");
        assert_eq!(sheets[1].name, "Sheet21");
    }

    #[test]
    fn test_empty_blocks_skipped() {
        let sheets = parse_sheets("===SHEET:Empty===\n\n===SHEET:Full===\nh\nv").unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Full");
    }

    #[test]
    fn test_no_data_is_error() {
        assert!(matches!(parse_sheets(""), Err(MarkupError::NoSheets)));
        assert!(matches!(
            parse_sheets("===SHEET:Only==="),
            Err(MarkupError::NoSheets)
        ));
    }

    #[test]
    fn test_header_only_sheet_is_kept() {
        let sheets = parse_sheets("===SHEET:H===\nA|B").unwrap();
        assert_eq!(sheets[0].headers().len(), 2);
        assert!(sheets[0].data_rows().is_empty());
    }
}
