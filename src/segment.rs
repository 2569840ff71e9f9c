// WHY: candidates arrive as untyped JSON from an external producer
// Schema extraction decides whether a candidate is shaped well enough to audit;
// normalized segments are the validator's annotated copies of those candidates

use crate::offsets::Span;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Canonical field names with the legacy names still accepted on input
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("chapter_number", "kap_nr"),
    ("chapter_title", "kap_titel"),
    ("position", "seg_nr"),
];

/// Fields every candidate must carry
pub const REQUIRED_FIELDS: [&str; 6] = [
    "id",
    "chapter_number",
    "chapter_title",
    "position",
    "word_count",
    "text",
];

/// Look up a field by canonical name, falling back to its legacy alias
pub fn field<'v>(object: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    object.get(name).or_else(|| {
        FIELD_ALIASES
            .iter()
            .find(|(canonical, _)| *canonical == name)
            .and_then(|(_, alias)| object.get(*alias))
    })
}

/// Label used for a segment in issues: strings verbatim, other values as JSON
pub fn id_label(id: Option<&Value>) -> Option<String> {
    match id {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Render a title field for comparison; missing and null are empty
pub fn title_text(title: Option<&Value>) -> String {
    match title {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Why a candidate could not be audited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    NotAnObject,
    MissingFields(Vec<&'static str>),
    NotIntegers(Vec<&'static str>),
    TextNotString,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "every segment must be an object with fields"),
            Self::MissingFields(fields) => write!(f, "missing fields: {}", fields.join(", ")),
            Self::NotIntegers(fields) => write!(f, "fields must be integers: {}", fields.join(", ")),
            Self::TextNotString => write!(f, "text field must be a string"),
        }
    }
}

/// Borrowed view of a candidate that passed the schema check
#[derive(Debug, Clone)]
pub struct Segment<'v> {
    pub id: Option<&'v Value>,
    pub chapter_number: i64,
    pub chapter_title: String,
    pub position: i64,
    pub word_count: i64,
    pub text: &'v str,
    /// Producer's claimed offsets, if it sent any
    pub char_start: Option<&'v Value>,
    pub char_end: Option<&'v Value>,
    raw: &'v Map<String, Value>,
}

impl<'v> Segment<'v> {
    /// Check shape and types; the first failing rule wins
    pub fn from_value(value: &'v Value) -> Result<Self, SchemaViolation> {
        let raw = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| field(raw, name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaViolation::MissingFields(missing));
        }

        let integer = |name: &str| field(raw, name).and_then(Value::as_i64);
        let (position, chapter_number, word_count) = match (
            integer("position"),
            integer("chapter_number"),
            integer("word_count"),
        ) {
            (Some(p), Some(c), Some(w)) => (p, c, w),
            (p, c, w) => {
                let bad = [("position", p), ("chapter_number", c), ("word_count", w)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(name, _)| name)
                    .collect();
                return Err(SchemaViolation::NotIntegers(bad));
            }
        };

        let text = field(raw, "text")
            .and_then(Value::as_str)
            .ok_or(SchemaViolation::TextNotString)?;

        Ok(Self {
            id: field(raw, "id"),
            chapter_number,
            chapter_title: title_text(field(raw, "chapter_title")),
            position,
            word_count,
            text,
            char_start: raw.get("char_start"),
            char_end: raw.get("char_end"),
            raw,
        })
    }

    pub fn id_label(&self) -> Option<String> {
        id_label(self.id)
    }

    /// Annotated copy with validator-computed offsets and word count
    pub fn normalized(&self, span: Span, word_count: usize) -> NormalizedSegment {
        let mut fields = self.raw.clone();
        fields.insert("char_start".to_string(), Value::from(span.start));
        fields.insert("char_end".to_string(), Value::from(span.end));
        fields.insert("word_count".to_string(), Value::from(word_count));
        NormalizedSegment {
            span,
            word_count,
            fields,
        }
    }
}

/// A candidate plus trustworthy `char_start`, `char_end` and `word_count`
///
/// Serializes as the original object with those three fields overwritten;
/// unknown producer fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedSegment {
    #[serde(skip)]
    span: Span,
    #[serde(skip)]
    word_count: usize,
    fields: Map<String, Value>,
}

impl NormalizedSegment {
    pub fn char_start(&self) -> usize {
        self.span.start
    }

    pub fn char_end(&self) -> usize {
        self.span.end
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn text(&self) -> &str {
        field(&self.fields, "text").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> Value {
        json!({
            "id": "K002-S001",
            "chapter_number": 2,
            "chapter_title": "Die Reise",
            "position": 1,
            "word_count": 3,
            "text": "Es war kalt.",
            "source": "model-v1"
        })
    }

    #[test]
    fn test_from_value_well_formed() {
        let value = candidate();
        let seg = Segment::from_value(&value).unwrap();
        assert_eq!(seg.chapter_number, 2);
        assert_eq!(seg.position, 1);
        assert_eq!(seg.text, "Es war kalt.");
        assert_eq!(seg.id_label().as_deref(), Some("K002-S001"));
        assert!(seg.char_start.is_none());
    }

    #[test]
    fn test_legacy_field_names() {
        let value = json!({
            "id": "K002-S001", "kap_nr": 2, "kap_titel": "Die Reise",
            "seg_nr": 1, "word_count": 3, "text": "Es war kalt."
        });
        let seg = Segment::from_value(&value).unwrap();
        assert_eq!(seg.chapter_number, 2);
        assert_eq!(seg.chapter_title, "Die Reise");
        assert_eq!(seg.position, 1);
    }

    #[test]
    fn test_missing_fields_listed() {
        let value = json!({"id": "K001-S001", "text": "x"});
        let err = Segment::from_value(&value).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::MissingFields(vec!["chapter_number", "chapter_title", "position", "word_count"])
        );
    }

    #[test]
    fn test_non_integer_fields() {
        let mut value = candidate();
        value["position"] = json!("1");
        value["word_count"] = json!(3.5);
        let err = Segment::from_value(&value).unwrap_err();
        assert_eq!(err, SchemaViolation::NotIntegers(vec!["position", "word_count"]));
    }

    #[test]
    fn test_text_must_be_string() {
        let mut value = candidate();
        value["text"] = json!(["Es war kalt."]);
        assert_eq!(Segment::from_value(&value).unwrap_err(), SchemaViolation::TextNotString);
        assert_eq!(Segment::from_value(&json!(7)).unwrap_err(), SchemaViolation::NotAnObject);
    }

    #[test]
    fn test_normalized_overrides_and_keeps_extras() {
        let value = candidate();
        let seg = Segment::from_value(&value).unwrap();
        let normalized = seg.normalized(Span { start: 10, end: 22 }, 3);
        assert_eq!(normalized.char_start(), 10);
        assert_eq!(normalized.char_end(), 22);
        assert_eq!(normalized.text(), "Es war kalt.");

        let out = serde_json::to_value(&normalized).unwrap();
        assert_eq!(out["char_start"], json!(10));
        assert_eq!(out["char_end"], json!(22));
        assert_eq!(out["source"], json!("model-v1"));
        assert_eq!(out["id"], json!("K002-S001"));
    }

    #[test]
    fn test_non_string_id_label() {
        assert_eq!(id_label(Some(&json!(17))), Some("17".to_string()));
        assert_eq!(id_label(Some(&json!(null))), None);
        assert_eq!(id_label(None), None);
    }
}
