//! Whitespace normalization and light cleanup for extracted text.
//!
//! TEI text nodes keep the line breaks and indentation of the XML source,
//! and OCR output carries stray newlines, so every string that ends up in a
//! record goes through one of these functions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Two years separated by a period, e.g. "1995. 1996"
    static ref RE_YEAR_LIST: Regex = Regex::new(r"(\d{4})\.\s+(\d{4})").unwrap();

    /// Runs of periods
    static ref RE_MULTI_PERIOD: Regex = Regex::new(r"\.+").unwrap();
}

/// Collapse every whitespace run (spaces, tabs, newlines) to a single space
/// and trim both ends.
///
/// # Examples
///
/// ```
/// use scholar_extract::text::cleanup::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Deep\n\tlearning   models "), "Deep learning models");
/// assert_eq!(normalize_whitespace("\n \t"), "");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize whitespace, join year lists with commas and collapse repeated
/// periods.
///
/// # Examples
///
/// ```
/// use scholar_extract::text::cleanup::clean_text;
///
/// assert_eq!(clean_text("Published 1995.  1996. See..."), "Published 1995, 1996. See.");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = normalize_whitespace(text);
    let cleaned = RE_YEAR_LIST.replace_all(&cleaned, "$1, $2");
    let cleaned = RE_MULTI_PERIOD.replace_all(&cleaned, ".");
    cleaned.trim().to_string()
}

/// Normalize whitespace and return `None` when nothing is left.
pub fn non_empty(text: &str) -> Option<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
