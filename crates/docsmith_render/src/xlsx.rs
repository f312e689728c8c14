use std::collections::BTreeSet;

use anyhow::{Context, Result};
use docsmith_markup::cell::{self, CellValue, NumberHint};
use docsmith_markup::sheet::{SheetBlock, unique_sheet_name};
use rust_xlsxwriter::utility::column_number_to_name;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

const HEADER_FILL: u32 = 0x1F4E79;
const ALT_ROW_FILL: u32 = 0xD6E4F0;
const TOTAL_FILL: u32 = 0xBDD7EE;

const CURRENCY_FORMAT: &str = "$#,##0.00";
const PERCENT_FORMAT: &str = "0.00%";
const NUMBER_FORMAT: &str = "#,##0.##";

const MAX_COLUMN_WIDTH: usize = 50;

/// Options shared by every sheet in a workbook.
#[derive(Debug, Clone, Copy)]
pub struct WorkbookOptions {
    /// Append a `SUM` row under every column that holds numbers.
    pub include_totals: bool,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            include_totals: true,
        }
    }
}

/// Generate an XLSX workbook with one styled worksheet per sheet block.
///
/// Returns the raw bytes of the xlsx file.
pub fn generate_workbook(sheets: &[SheetBlock], options: WorkbookOptions) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    // Tab names must be unique, ignoring case.
    let mut used: Vec<String> = Vec::new();
    for sheet in sheets {
        let name = unique_sheet_name(&sheet.name, &used);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&name)
            .with_context(|| format!("Failed to set sheet name: {name}"))?;
        write_sheet(worksheet, sheet, options)
            .with_context(|| format!("Failed to write sheet: {name}"))?;
        used.push(name);
    }

    let bytes = workbook
        .save_to_buffer()
        .context("Failed to save workbook to buffer")?;

    Ok(bytes)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetBlock, options: WorkbookOptions) -> Result<()> {
    let headers = sheet.headers();
    let data_rows = sheet.data_rows();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_font_size(11)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .with_context(|| format!("Failed to write header at column {col}"))?;
    }
    worksheet.set_row_height(0, 20)?;

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count() + 4).collect();
    let mut numeric_cols = BTreeSet::new();

    for (row_idx, row) in data_rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        // First data row is Excel row 2, which gets the banded fill.
        let banded = row_idx % 2 == 0;

        for (col_idx, raw) in row.iter().enumerate() {
            let col = col_idx as u16;
            match cell::detect(raw) {
                CellValue::Number { value, hint } => {
                    numeric_cols.insert(col);
                    let format = data_format(banded).set_num_format(num_format(hint));
                    worksheet
                        .write_number_with_format(excel_row, col, value, &format)
                        .with_context(|| {
                            format!("Failed to write number at ({excel_row}, {col_idx})")
                        })?;
                }
                CellValue::Text { value } => {
                    worksheet
                        .write_string_with_format(excel_row, col, &value, &data_format(banded))
                        .with_context(|| {
                            format!("Failed to write string at ({excel_row}, {col_idx})")
                        })?;
                }
            }

            if let Some(width) = widths.get_mut(col_idx) {
                *width = (*width).max(raw.chars().count() + 4);
            }
        }
    }

    if options.include_totals && !data_rows.is_empty() && !numeric_cols.is_empty() {
        write_totals(worksheet, headers.len(), data_rows.len(), &numeric_cols)?;
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, (*width).min(MAX_COLUMN_WIDTH) as f64)?;
    }

    worksheet.set_freeze_panes(1, 0)?;

    debug!(
        sheet = %worksheet.name(),
        rows = data_rows.len(),
        numeric_columns = numeric_cols.len(),
        "wrote worksheet"
    );

    Ok(())
}

fn write_totals(
    worksheet: &mut Worksheet,
    columns: usize,
    data_len: usize,
    numeric_cols: &BTreeSet<u16>,
) -> Result<()> {
    let total_row = (data_len + 1) as u32;
    let last_data_row = data_len + 1;
    let total_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(TOTAL_FILL))
        .set_border(FormatBorder::Thin);

    for col in 0..columns as u16 {
        if numeric_cols.contains(&col) {
            let letter = column_number_to_name(col);
            let formula = format!("=SUM({letter}2:{letter}{last_data_row})");
            worksheet
                .write_formula_with_format(
                    total_row,
                    col,
                    formula.as_str(),
                    &total_format.clone().set_num_format(NUMBER_FORMAT),
                )
                .with_context(|| format!("Failed to write total for column {letter}"))?;
        } else if col == 0 {
            worksheet.write_string_with_format(total_row, col, "TOTAL", &total_format)?;
        } else {
            worksheet.write_blank(total_row, col, &total_format)?;
        }
    }

    Ok(())
}

fn data_format(banded: bool) -> Format {
    let format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter);
    if banded {
        format.set_background_color(Color::RGB(ALT_ROW_FILL))
    } else {
        format
    }
}

fn num_format(hint: NumberHint) -> &'static str {
    match hint {
        NumberHint::Currency => CURRENCY_FORMAT,
        NumberHint::Percent => PERCENT_FORMAT,
        NumberHint::Plain => NUMBER_FORMAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn sheet(name: &str, rows: &[&[&str]]) -> SheetBlock {
        SheetBlock {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_generate_workbook_basic() {
        let sheets = vec![sheet(
            "People",
            &[&["Name", "Age", "City"], &["Alice", "30", "New York"], &["Bob", "25", "London"]],
        )];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        // XLSX files start with PK (zip format)
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_totals_row_sums_numeric_columns() {
        let sheets = vec![sheet(
            "Sales",
            &[
                &["Month", "Revenue", "Note"],
                &["January", "$50,000", "ok"],
                &["February", "$55,000", "late"],
            ],
        )];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("SUM(B2:B3)"), "missing totals formula: {xml}");
        assert!(!xml.contains("SUM(C2:C3)"));
        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("TOTAL"));
    }

    #[test]
    fn test_totals_can_be_disabled() {
        let sheets = vec![sheet("S", &[&["Item", "Qty"], &["Bolt", "4"]])];
        let bytes = generate_workbook(
            &sheets,
            WorkbookOptions {
                include_totals: false,
            },
        )
        .unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!xml.contains("SUM("));
    }

    #[test]
    fn test_no_totals_without_numbers() {
        let sheets = vec![sheet("S", &[&["Name"], &["Alice"], &["Bob"]])];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(!xml.contains("SUM("));
    }

    #[test]
    fn test_percent_stored_as_fraction() {
        let sheets = vec![sheet("Rates", &[&["Rate"], &["12%"]])];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("<v>0.12</v>"), "percent not stored as fraction: {xml}");
        let styles = read_part(&bytes, "xl/styles.xml");
        assert!(styles.contains("0.00%"));
    }

    #[test]
    fn test_header_row_is_frozen() {
        let sheets = vec![sheet("S", &[&["A"], &["1"]])];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(xml.contains("ySplit=\"1\""));
    }

    #[test]
    fn test_multiple_sheets_named() {
        let sheets = vec![
            sheet("Scores", &[&["Name", "Score"], &["Alice", "95"]]),
            sheet("Products", &[&["Product", "Price"], &["Widget", "9.99"]]),
        ];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains("name=\"Scores\""));
        assert!(workbook.contains("name=\"Products\""));
    }

    #[test]
    fn test_duplicate_sheet_names_are_renamed() {
        let sheets = vec![sheet("Data", &[&["A"], &["1"]]), sheet("data", &[&["B"], &["2"]])];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains("name=\"Data\""));
        assert!(workbook.contains("name=\"data1\""));
        assert!(read_part(&bytes, "xl/worksheets/sheet2.xml").contains("<c r=\"A1\""));
    }

    #[test]
    fn test_large_dataset() {
        let mut rows: Vec<Vec<String>> = vec![vec!["ID".into(), "Value".into()]];
        rows.extend((0..1000).map(|i| vec![i.to_string(), format!("{:.2}", i as f64 * 1.5)]));
        let sheets = vec![SheetBlock {
            name: "Big".into(),
            rows,
        }];
        let bytes = generate_workbook(&sheets, WorkbookOptions::default()).unwrap();
        assert!(bytes.len() > 1000);
    }
}
