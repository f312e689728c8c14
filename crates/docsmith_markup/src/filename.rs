//! Output filename sanitizing.

use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]+").expect("valid filename regex"));

/// Used when sanitizing leaves nothing behind.
pub const FALLBACK_STEM: &str = "document";

/// Replace each run of characters outside `[\w-]` with one `_` and trim
/// underscores.
///
/// `"My Report #3!"` becomes `"My_Report_3"`.
pub fn sanitize_stem(name: &str) -> String {
    let replaced = UNSAFE_CHARS_RE.replace_all(name, "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitized stem plus extension, e.g. `with_extension("Q3 budget", "xlsx")`.
pub fn with_extension(name: &str, extension: &str) -> String {
    format!("{}.{extension}", sanitize_stem(name))
}
