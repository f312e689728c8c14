//! Best-effort numeric detection for spreadsheet cells.

use serde::{Deserialize, Serialize};

/// How a detected number should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberHint {
    Plain,
    Currency,
    Percent,
}

/// A spreadsheet cell after detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellValue {
    Number { value: f64, hint: NumberHint },
    Text { value: String },
}

impl CellValue {
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number { .. })
    }
}

/// Strip `,` `$` `%`, try a float parse, and remember which symbol was there.
///
/// Percentages are stored as fractions (`"12%"` -> `0.12`). Non-finite parses
/// such as `"inf"` or `"NaN"` stay text.
pub fn detect(raw: &str) -> CellValue {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();

    match cleaned.trim().parse::<f64>() {
        Ok(num) if num.is_finite() => {
            if raw.contains('$') {
                CellValue::Number {
                    value: num,
                    hint: NumberHint::Currency,
                }
            } else if raw.contains('%') {
                CellValue::Number {
                    value: num / 100.0,
                    hint: NumberHint::Percent,
                }
            } else {
                CellValue::Number {
                    value: num,
                    hint: NumberHint::Plain,
                }
            }
        }
        _ => CellValue::Text {
            value: raw.to_string(),
        },
    }
}
