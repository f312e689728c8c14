//! Document tools for a chat host: spreadsheet, PDF and Word creators that
//! upload their output and return a download link.

pub mod config;
pub mod error;
pub mod logging;
pub mod tools;

pub use config::ToolsConfig;
pub use error::ToolError;
pub use tools::{
    Delivered, DocumentTools, PdfRequest, SpreadsheetRequest, ToolKind, ToolOutcome, WordRequest,
};
