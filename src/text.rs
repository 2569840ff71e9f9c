// WHY: offsets and word counts must be reproducible no matter which platform wrote the chapter file
// Line endings are canonicalized once; word counting is a pure function of the slice it is given

use crate::error::{Result, SeamError};
use regex_automata::meta::Regex;
use std::borrow::Cow;

/// Canonicalize line terminators: `\r\n` and lone `\r` both become `\n`
///
/// Idempotent; returns the input unchanged (borrowed) when it contains no `\r`.
pub fn normalize_text(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            // \r\n collapses into the single \n that follows
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            result.push('\n');
        } else {
            result.push(ch);
        }
    }
    Cow::Owned(result)
}

/// Counts maximal runs of Unicode word characters (letters, digits, connector punctuation)
///
/// Holds its compiled pattern so one validation run compiles it once.
#[derive(Debug, Clone)]
pub struct WordCounter {
    pattern: Regex,
}

impl WordCounter {
    pub fn new() -> Result<Self> {
        // WHY: \w in regex-automata is Unicode-aware by default, so "Grüße" and "naïve" are one token each
        let pattern = Regex::new(r"\w+").map_err(|e| SeamError::Pattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }
}

/// Count word tokens in `text` with a fresh counter
pub fn count_words(text: &str) -> Result<usize> {
    Ok(WordCounter::new()?.count(text))
}
