//! Hard failures of the validation core and its file helpers
// WHY: content defects are reported as Issues; only unusable input ends up here

use thiserror::Error;

/// Errors that abort a call instead of becoming part of a report
#[derive(Error, Debug)]
pub enum SeamError {
    /// The candidate segment list is empty
    #[error("segment list contains no entries")]
    EmptyInput,

    /// The segment document is not a JSON array
    #[error("segment document must be a JSON array, found {found}")]
    NotAList { found: &'static str },

    /// A JSONL line does not hold a JSON object
    #[error("line {line} of segment stream is not a JSON object")]
    NotAnObject { line: usize },

    /// Strict reconciliation found text that does not match the source at the cursor
    #[error("segment text does not match the source at char {offset} (id {segment_id})")]
    TextMismatch { segment_id: String, offset: usize },

    /// A segment lacks the shape an operation needs (1-based index)
    #[error("segment {index} cannot be used: {reason}")]
    Schema { index: usize, reason: String },

    /// A built-in matching pattern failed to compile
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Inconsistent or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, SeamError>;

impl SeamError {
    /// Short JSON type name used in `NotAList` messages
    pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_kind_names() {
        assert_eq!(SeamError::json_kind(&json!({"a": 1})), "object");
        assert_eq!(SeamError::json_kind(&json!("x")), "string");
        assert_eq!(SeamError::json_kind(&json!(null)), "null");
    }

    #[test]
    fn test_mismatch_message_carries_id() {
        let err = SeamError::TextMismatch { segment_id: "K001-S002".to_string(), offset: 42 };
        let msg = err.to_string();
        assert!(msg.contains("K001-S002"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_pattern_error_message() {
        let err = SeamError::Pattern("unclosed group".to_string());
        assert_eq!(err.to_string(), "pattern error: unclosed group");
    }
}
