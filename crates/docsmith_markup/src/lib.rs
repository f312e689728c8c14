//! Lightweight markup parsing for document generation.
//!
//! Turns the markdown-like text accepted by the document tools into
//! structured records: headings, lists, tables, rules and paragraphs for
//! PDF/Word output, and named sheet blocks for spreadsheets.

pub mod cell;
pub mod error;
pub mod filename;
pub mod inline;
pub mod line;
pub mod parser;
pub mod sheet;

pub use cell::{CellValue, NumberHint};
pub use error::MarkupError;
pub use inline::Span;
pub use line::{Line, RuleMark};
pub use parser::{Block, ListKind, Parser, TableBlock, parse};
pub use sheet::{SheetBlock, parse_sheets};
