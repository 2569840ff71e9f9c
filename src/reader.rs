// WHY: file loading sits outside the validation core; the core only ever sees loaded values
// Chapter text is read whole so line endings survive for normalization

use crate::error::SeamError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Serialization of a segment file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentFormat {
    /// One JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
}

impl SegmentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Self::JsonLines,
            _ => Self::Json,
        }
    }
}

/// Statistics for one chapter text read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub chars_read: u64,
    pub duration_ms: u64,
}

/// Read a chapter text file as UTF-8
pub async fn read_chapter_text<P: AsRef<Path>>(path: P) -> Result<(String, ReadStats)> {
    let path = path.as_ref();
    let start_time = std::time::Instant::now();
    debug!("Reading chapter text: {}", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to open chapter text {}", path.display()))?;
    let bytes_read = bytes.len() as u64;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid_up_to = e.utf8_error().valid_up_to();
        anyhow::anyhow!(
            "UTF-8 decoding error in {} at byte {}",
            path.display(),
            valid_up_to
        )
    })?;

    let stats = ReadStats {
        file_path: path.display().to_string(),
        bytes_read,
        chars_read: text.chars().count() as u64,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    info!(
        "Read chapter text {}: {} bytes, {} chars in {}ms",
        path.display(),
        stats.bytes_read,
        stats.chars_read,
        stats.duration_ms
    );
    Ok((text, stats))
}

/// Parse segment documents that are already in memory
pub fn parse_segments(content: &str, format: SegmentFormat) -> crate::error::Result<Vec<Value>> {
    match format {
        SegmentFormat::Json => match serde_json::from_str::<Value>(content)? {
            Value::Array(items) => Ok(items),
            other => Err(SeamError::NotAList {
                found: SeamError::json_kind(&other),
            }),
        },
        SegmentFormat::JsonLines => {
            let mut items = Vec::new();
            for (index, line) in content.lines().enumerate() {
                if let Some(item) = parse_jsonl_line(line, index + 1)? {
                    items.push(item);
                }
            }
            Ok(items)
        }
    }
}

fn parse_jsonl_line(line: &str, line_number: usize) -> crate::error::Result<Option<Value>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(line)?;
    if !value.is_object() {
        return Err(SeamError::NotAnObject { line: line_number });
    }
    Ok(Some(value))
}

/// Load candidate segments from a `.json` array or a `.jsonl` stream
pub async fn read_segments<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let segments = match SegmentFormat::from_path(path) {
        SegmentFormat::Json => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read segment file {}", path.display()))?;
            parse_segments(&content, SegmentFormat::Json)
                .with_context(|| format!("Invalid segment file {}", path.display()))?
        }
        SegmentFormat::JsonLines => read_segments_jsonl(path).await?,
    };
    debug!("Loaded {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

// WHY: JSONL files can be large; stream them line by line instead of buffering twice
async fn read_segments_jsonl(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open segment stream {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut segments = Vec::new();
    let mut line_number = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("Failed to read line {} of {}", line_number + 1, path.display()))?
    {
        line_number += 1;
        let parsed = parse_jsonl_line(&line, line_number)
            .with_context(|| format!("Invalid segment stream {}", path.display()))?;
        if let Some(value) = parsed {
            segments.push(value);
        }
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let file_path = dir.join(name);
        tokio::fs::write(&file_path, content).await.unwrap();
        file_path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SegmentFormat::from_path(Path::new("a/b_draft.json")), SegmentFormat::Json);
        assert_eq!(SegmentFormat::from_path(Path::new("final.JSONL")), SegmentFormat::JsonLines);
        assert_eq!(SegmentFormat::from_path(Path::new("noext")), SegmentFormat::Json);
    }

    #[test]
    fn test_parse_json_requires_array() {
        let err = parse_segments(r#"{"segments": []}"#, SegmentFormat::Json).unwrap_err();
        assert!(matches!(err, SeamError::NotAList { found: "object" }));

        let items = parse_segments(r#"[{"id": "K001-S001"}, 3]"#, SegmentFormat::Json).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_jsonl_skips_blank_lines() {
        let content = "{\"id\": \"a\"}\n\n{\"id\": \"b\"}\n";
        let items = parse_segments(content, SegmentFormat::JsonLines).unwrap();
        assert_eq!(items, vec![json!({"id": "a"}), json!({"id": "b"})]);
    }

    #[test]
    fn test_parse_jsonl_rejects_non_objects() {
        let err = parse_segments("{\"id\": \"a\"}\n[1, 2]\n", SegmentFormat::JsonLines).unwrap_err();
        assert!(matches!(err, SeamError::NotAnObject { line: 2 }));
    }

    #[tokio::test]
    async fn test_read_chapter_text_keeps_crlf() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(temp_dir.path(), "k1.txt", "Zeile eins.\r\nZeile zwei.".as_bytes()).await;
        let (text, stats) = read_chapter_text(&path).await.unwrap();
        assert_eq!(text, "Zeile eins.\r\nZeile zwei.");
        assert_eq!(stats.bytes_read, 24);
        assert_eq!(stats.chars_read, 24);
    }

    #[tokio::test]
    async fn test_read_chapter_text_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(temp_dir.path(), "bad.txt", &[b'o', b'k', 0xFF, 0xFE]).await;
        let err = read_chapter_text(&path).await.unwrap_err();
        assert!(err.to_string().contains("at byte 2"), "{err}");
    }

    #[tokio::test]
    async fn test_read_missing_file_has_context() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_chapter_text(temp_dir.path().join("missing.txt")).await.unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_read_segments_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = create_test_file(temp_dir.path(), "k1_draft.json", br#"[{"id": "K001-S001"}]"#).await;
        let jsonl_path = create_test_file(
            temp_dir.path(),
            "k1_final.jsonl",
            b"{\"id\": \"K001-S001\"}\n{\"id\": \"K001-S002\"}\n",
        )
        .await;

        assert_eq!(read_segments(&json_path).await.unwrap().len(), 1);
        let streamed = read_segments(&jsonl_path).await.unwrap();
        assert_eq!(streamed.len(), 2);
        assert_eq!(streamed[1]["id"], json!("K001-S002"));
    }

    #[tokio::test]
    async fn test_read_segments_not_a_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(temp_dir.path(), "k1_draft.json", br#""just text""#).await;
        let err = read_segments(&path).await.unwrap_err();
        let root = err.downcast_ref::<SeamError>();
        assert!(matches!(root, Some(SeamError::NotAList { found: "string" })), "{err:?}");
    }
}
