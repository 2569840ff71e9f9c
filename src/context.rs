// WHY: boundary review (human or model) needs each segment with the text around its edges
// Built on strict reconciliation, so a payload only exists for a faithful segmentation

use crate::error::{Result, SeamError};
use crate::offsets::{compute_offsets, CharIndex};
use crate::segment::{field, id_label};
use crate::text::normalize_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chars of neighbouring text shown on each side of a segment
pub const DEFAULT_CONTEXT_CHARS: usize = 160;

/// One segment as presented for boundary review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub id: Option<String>,
    pub position: Option<i64>,
    pub word_count: Option<i64>,
    pub text: String,
    pub preceding_context: String,
    pub following_context: String,
}

/// Pair every segment with up to `context_chars` chars before and after it
///
/// Fails on a segment without string text, or on the first segment whose text
/// does not continue the source exactly.
pub fn build_review_payload(
    original_text: &str,
    segments: &[Value],
    context_chars: usize,
) -> Result<Vec<ReviewEntry>> {
    let source = normalize_text(original_text);

    let mut labelled = Vec::with_capacity(segments.len());
    for (index, value) in segments.iter().enumerate() {
        let object = value.as_object().ok_or_else(|| SeamError::Schema {
            index: index + 1,
            reason: "not an object".to_string(),
        })?;
        let text = field(object, "text")
            .and_then(Value::as_str)
            .ok_or_else(|| SeamError::Schema {
                index: index + 1,
                reason: "text field must be a string".to_string(),
            })?;
        let label = id_label(object.get("id")).unwrap_or_else(|| "unknown".to_string());
        labelled.push((label, text, object));
    }

    let spans = compute_offsets(
        &source,
        labelled.iter().map(|(label, text, _)| (label.as_str(), *text)),
    )?;

    let index = CharIndex::new(&source);
    let payload = labelled
        .iter()
        .zip(spans)
        .map(|((_, text, object), span)| ReviewEntry {
            id: id_label(object.get("id")),
            position: field(object, "position").and_then(Value::as_i64),
            word_count: field(object, "word_count").and_then(Value::as_i64),
            text: text.to_string(),
            preceding_context: index
                .slice_clamped(span.start.saturating_sub(context_chars), span.start)
                .to_string(),
            following_context: index
                .slice_clamped(span.end, span.end.saturating_add(context_chars))
                .to_string(),
        })
        .collect();
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_contexts() {
        let source = "Alpha beta. Gamma delta. Epsilon.";
        let segments = vec![
            json!({"id": "K001-S001", "position": 1, "word_count": 2, "text": "Alpha beta. "}),
            json!({"id": "K001-S002", "position": 2, "word_count": 2, "text": "Gamma delta. "}),
            json!({"id": "K001-S003", "position": 3, "word_count": 1, "text": "Epsilon."}),
        ];
        let payload = build_review_payload(source, &segments, 6).unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload[0].preceding_context, "");
        assert_eq!(payload[0].following_context, "Gamma ");
        assert_eq!(payload[1].preceding_context, "beta. ");
        assert_eq!(payload[1].following_context, "Epsilo");
        assert_eq!(payload[2].following_context, "");
        assert_eq!(payload[2].id.as_deref(), Some("K001-S003"));
        assert_eq!(payload[2].word_count, Some(1));
    }

    #[test]
    fn test_payload_accepts_legacy_names() {
        let segments = vec![json!({"id": "K001-S001", "seg_nr": 1, "text": "Nur ein Satz."})];
        let payload = build_review_payload("Nur ein Satz.", &segments, DEFAULT_CONTEXT_CHARS).unwrap();
        assert_eq!(payload[0].position, Some(1));
        assert_eq!(payload[0].word_count, None);
    }

    #[test]
    fn test_payload_rejects_drift() {
        let segments = vec![
            json!({"id": "K001-S001", "text": "Alpha "}),
            json!({"id": "K001-S002", "text": "Gamma."}),
        ];
        let err = build_review_payload("Alpha beta. Gamma.", &segments, 10).unwrap_err();
        assert!(matches!(err, SeamError::TextMismatch { ref segment_id, offset: 6 } if segment_id == "K001-S002"));
    }

    #[test]
    fn test_payload_rejects_missing_text() {
        let segments = vec![json!({"id": "K001-S001"})];
        let err = build_review_payload("x", &segments, 10).unwrap_err();
        assert!(matches!(err, SeamError::Schema { index: 1, .. }));
    }
}
