// WHY: exact, lockstep reconciliation of segment text against the source
// No resync heuristics: a drifted segment is reported, never realigned

use crate::error::{Result, SeamError};
use serde::{Deserialize, Serialize};

/// Half-open char range `[start, end)` in the normalized source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Char-position to byte-position table for one text
///
/// Offsets reported to callers count chars (Unicode scalar values); slicing
/// needs byte boundaries. `boundaries[i]` is the byte offset of char `i`, and
/// the last entry is `text.len()`.
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(pos, _)| pos).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Length of the text in chars
    pub fn len_chars(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Exact slice of chars `[start, end)`; `None` if the range leaves the text
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a str> {
        if start > end || end > self.len_chars() {
            return None;
        }
        Some(&self.text[self.boundaries[start]..self.boundaries[end]])
    }

    /// Slice with both ends clamped into the text
    pub fn slice_clamped(&self, start: usize, end: usize) -> &'a str {
        let len = self.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}

/// Result of reconciling one segment at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub span: Span,
    /// Whether the source text at `span` equals the segment text exactly
    pub matched: bool,
}

/// Walks a source text and a sequence of segment texts in lockstep
///
/// The cursor always advances by the claimed text length, matched or not, so
/// later segments keep meaningful offsets after a local mismatch.
#[derive(Debug, Clone)]
pub struct OffsetWalker<'a> {
    index: CharIndex<'a>,
    cursor: usize,
}

impl<'a> OffsetWalker<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            index: CharIndex::new(source),
            cursor: 0,
        }
    }

    pub fn advance(&mut self, segment_text: &str) -> Step {
        let start = self.cursor;
        let end = start + segment_text.chars().count();
        let matched = self.index.slice(start, end) == Some(segment_text);
        self.cursor = end;
        Step {
            span: Span { start, end },
            matched,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn source_len(&self) -> usize {
        self.index.len_chars()
    }

    /// True once the cursor sits exactly at the end of the source
    pub fn is_complete(&self) -> bool {
        self.cursor == self.index.len_chars()
    }
}

/// Strict offsets for `(id, text)` pairs; fails on the first divergence
///
/// Does not require the segments to reach the end of the source.
pub fn compute_offsets<'s, I>(source: &str, segments: I) -> Result<Vec<Span>>
where
    I: IntoIterator<Item = (&'s str, &'s str)>,
{
    let mut walker = OffsetWalker::new(source);
    let mut spans = Vec::new();
    for (segment_id, text) in segments {
        let step = walker.advance(text);
        if !step.matched {
            return Err(SeamError::TextMismatch {
                segment_id: segment_id.to_string(),
                offset: step.span.start,
            });
        }
        spans.push(step.span);
    }
    Ok(spans)
}
