//! Canonical segment identifiers: `K<chapter:03>-S<position:03>`
//!
//! Chapter 4, position 12 is `K004-S012`. Wider numbers are written in full
//! (`K1000-S001`), never truncated.

use serde_json::Value;

/// Render the canonical identifier for a chapter/position pair
pub fn format_identifier(chapter_number: i64, position: i64) -> String {
    format!("K{chapter_number:03}-S{position:03}")
}

/// Whether `identifier` is exactly the canonical identifier for `chapter_number` and `position`
///
/// Any deviation (case, separator, padding, surrounding whitespace) is a mismatch.
pub fn matches(chapter_number: i64, identifier: &str, position: i64) -> bool {
    identifier == format_identifier(chapter_number, position)
}

/// [`matches`] over a raw JSON value; non-strings never match
pub fn matches_value(chapter_number: i64, identifier: &Value, position: i64) -> bool {
    identifier
        .as_str()
        .is_some_and(|id| matches(chapter_number, id, position))
}
