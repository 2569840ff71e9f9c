//! Issue taxonomy and the per-chapter validation report
//!
//! Every [`IssueKind`] has a fixed [`Severity`]; the report files an issue into
//! `errors` or `warnings` from that alone, so the two lists are disjoint by
//! construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an issue blocks downstream use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Fixed taxonomy of findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Missing fields or wrongly typed values
    Schema,
    ChapterNumberInconsistent,
    ChapterTitleInconsistent,
    SequencePosition,
    IdentifierFormat,
    /// Segment text differs from the source at the cursor
    TextMismatch,
    /// Producer-supplied `char_start`/`char_end` disagree with computed offsets
    ClaimedOffsetMismatch,
    WordCount,
    /// Segments do not account for the whole source
    Coverage,
    /// Caller's chapter number differs from the one in the segments
    ChapterNumberMismatch,
    SegmentLength,
    SentenceBoundary,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::ChapterNumberMismatch | Self::SegmentLength | Self::SentenceBoundary => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::ChapterNumberInconsistent => "chapter_number_inconsistent",
            Self::ChapterTitleInconsistent => "chapter_title_inconsistent",
            Self::SequencePosition => "sequence_position",
            Self::IdentifierFormat => "identifier_format",
            Self::TextMismatch => "text_mismatch",
            Self::ClaimedOffsetMismatch => "claimed_offset_mismatch",
            Self::WordCount => "word_count",
            Self::Coverage => "coverage",
            Self::ChapterNumberMismatch => "chapter_number_mismatch",
            Self::SegmentLength => "segment_length",
            Self::SentenceBoundary => "sentence_boundary",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding; `segment_id` is `None` for chapter-wide issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub segment_id: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, segment_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            segment_id,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.segment_id.as_deref().unwrap_or("-"),
            self.kind,
            self.message
        )
    }
}

/// Overall outcome, derived from the issue lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Ok,
    Warnings,
    Errors,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Warnings => "warnings",
            Self::Errors => "errors",
        })
    }
}

/// Result of validating one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub chapter_number: i64,
    pub chapter_title: String,
    pub status: ReportStatus,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    /// True unless the report carries errors; warnings alone never block
    pub fn is_admissible(&self) -> bool {
        self.status != ReportStatus::Errors
    }

    /// All issues of one kind, errors first
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |issue| issue.kind == kind)
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues_of(kind).count()
    }
}

/// Accumulates issues during a run and derives the status at the end
#[derive(Debug, Default)]
pub struct ReportBuilder {
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        match issue.severity() {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn add(&mut self, kind: IssueKind, segment_id: Option<String>, message: impl Into<String>) {
        self.push(Issue::new(kind, segment_id, message));
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn finish(self, chapter_number: i64, chapter_title: String) -> ValidationReport {
        let status = if !self.errors.is_empty() {
            ReportStatus::Errors
        } else if !self.warnings.is_empty() {
            ReportStatus::Warnings
        } else {
            ReportStatus::Ok
        };
        ValidationReport {
            chapter_number,
            chapter_title,
            status,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
