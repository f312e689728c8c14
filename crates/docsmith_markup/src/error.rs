//! Markup error types.

/// Errors raised while turning markup into structured records.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// Sheet text contained no block with data rows.
    #[error("No sheet data found; expected rows under '===SHEET:Name==='")]
    NoSheets,
}
