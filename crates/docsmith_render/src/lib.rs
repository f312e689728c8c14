//! Document generation (XLSX, PDF, DOCX) from parsed markup.

pub mod docx;
pub mod pdf;
pub mod xlsx;

pub use docx::{WordOptions, generate_docx};
pub use pdf::{PageSize, generate_pdf};
pub use xlsx::{WorkbookOptions, generate_workbook};
