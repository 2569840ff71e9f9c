// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const VOCABULARY: [&str; 12] = [
    "Die", "Stadt", "lag", "still", "über", "dem", "Fluss", "und", "Grüße", "kamen", "spät", "an",
];

/// Synthetic chapter whose segment texts concatenate to its source exactly
#[derive(Debug, Clone)]
pub struct Chapter {
    pub number: i64,
    pub title: String,
    pub source: String,
    pub texts: Vec<String>,
}

impl Chapter {
    /// `segment_count` segments of exactly `words_per_segment` words, each ending in "."
    pub fn generate(number: i64, segment_count: usize, words_per_segment: usize) -> Self {
        let mut texts = Vec::with_capacity(segment_count);
        let mut word = 0usize;
        for i in 0..segment_count {
            let body: Vec<&str> = (0..words_per_segment)
                .map(|_| {
                    let w = VOCABULARY[word % VOCABULARY.len()];
                    word += 1;
                    w
                })
                .collect();
            let mut text = format!("{}.", body.join(" "));
            if i + 1 < segment_count {
                // alternate separators so paragraph breaks are covered too
                text.push_str(if i % 2 == 0 { " " } else { "\n\n" });
            }
            texts.push(text);
        }
        Self::from_texts(number, &texts.iter().map(String::as_str).collect::<Vec<_>>())
    }

    pub fn from_texts(number: i64, texts: &[&str]) -> Self {
        Self {
            number,
            title: "Die Ankunft".to_string(),
            source: texts.concat(),
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Fully correct candidate segments, claimed offsets included
    pub fn segments(&self) -> Vec<Value> {
        let mut start = 0usize;
        self.texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let position = i as i64 + 1;
                let end = start + text.chars().count();
                let segment = json!({
                    "id": format!("K{:03}-S{:03}", self.number, position),
                    "chapter_number": self.number,
                    "chapter_title": self.title,
                    "position": position,
                    "word_count": seamguard::count_words(text).unwrap(),
                    "text": text,
                    "char_start": start,
                    "char_end": end,
                });
                start = end;
                segment
            })
            .collect()
    }

    pub fn source_chars(&self) -> usize {
        self.source.chars().count()
    }
}

/// Test fixture helper for creating temporary directories with chapter files
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a file with given content, parent directories included
    pub fn create_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write `<base>.txt` and `<base>_draft.json` for a chapter
    pub fn create_chapter(&self, base: &str, chapter: &Chapter) -> (PathBuf, PathBuf) {
        self.create_chapter_with(base, &chapter.source, &chapter.segments())
    }

    /// Write a chapter text with arbitrary candidate segments
    pub fn create_chapter_with(&self, base: &str, source: &str, segments: &[Value]) -> (PathBuf, PathBuf) {
        let text_path = self.create_file(format!("{base}.txt"), source);
        let draft = serde_json::to_string_pretty(segments).expect("Failed to serialize segments");
        let draft_path = self.create_file(format!("{base}_draft.json"), &draft);
        (text_path, draft_path)
    }

    /// Parse a JSON file below the fixture root
    pub fn read_json<P: AsRef<Path>>(&self, relative_path: P) -> Value {
        let content = fs::read_to_string(self.root_path.join(relative_path))
            .expect("Failed to read JSON output");
        serde_json::from_str(&content).expect("Output is not valid JSON")
    }
}
