// WHY: the gate between an externally produced segmentation and the retrieval index
// Every candidate is checked independently and every defect is reported in one pass;
// only structurally unusable input aborts the call

use crate::boundary::BoundaryRules;
use crate::config::SegmentLimits;
use crate::error::{Result, SeamError};
use crate::identifier;
use crate::offsets::OffsetWalker;
use crate::report::{IssueKind, ReportBuilder, ValidationReport};
use crate::segment::{field, id_label, title_text, NormalizedSegment, Segment};
use crate::text::{normalize_text, WordCounter};
use serde_json::Value;
use tracing::debug;

/// Stateless validator: configuration only, no state carried between calls
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: SegmentLimits,
    rules: BoundaryRules,
}

impl Validator {
    pub fn new(limits: SegmentLimits) -> Self {
        Self {
            limits,
            rules: BoundaryRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: BoundaryRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn limits(&self) -> &SegmentLimits {
        &self.limits
    }

    /// Audit `candidates` against `original_text`
    ///
    /// Returns the report and the normalized segments. The normalized list is
    /// diagnostic only when the report status is `errors`. Fails only on an
    /// empty candidate list.
    pub fn validate(
        &self,
        chapter_hint: Option<i64>,
        original_text: &str,
        candidates: &[Value],
    ) -> Result<(ValidationReport, Vec<NormalizedSegment>)> {
        let first = candidates.first().ok_or(SeamError::EmptyInput)?;
        let source = normalize_text(original_text);
        let words = WordCounter::new()?;
        let mut report = ReportBuilder::new();

        let first_object = first.as_object();
        // a malformed first record is one schema issue, not a reason to re-key every later segment
        let chapter_number = candidates
            .iter()
            .filter_map(Value::as_object)
            .find_map(|o| field(o, "chapter_number").and_then(Value::as_i64))
            .or(chapter_hint)
            .unwrap_or(0);
        let chapter_title = first_object
            .map(|o| title_text(field(o, "chapter_title")))
            .unwrap_or_default();

        if let Some(hint) = chapter_hint {
            if hint != chapter_number {
                let first_id = first_object.and_then(|o| id_label(o.get("id")));
                report.add(
                    IssueKind::ChapterNumberMismatch,
                    first_id,
                    format!("chapter number in segments ({chapter_number}) differs from parameter ({hint})"),
                );
            }
        }

        let mut walker = OffsetWalker::new(&source);
        let mut expected_position: i64 = 1;
        let mut normalized = Vec::with_capacity(candidates.len());

        for value in candidates {
            let segment = match Segment::from_value(value) {
                Ok(segment) => segment,
                Err(violation) => {
                    let id = value
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    report.add(IssueKind::Schema, id, violation.to_string());
                    continue;
                }
            };
            let id = segment.id_label();

            if segment.chapter_number != chapter_number {
                report.add(
                    IssueKind::ChapterNumberInconsistent,
                    id.clone(),
                    format!(
                        "chapter number {} does not match {}",
                        segment.chapter_number, chapter_number
                    ),
                );
            }
            if segment.chapter_title.trim() != chapter_title.trim() {
                report.add(
                    IssueKind::ChapterTitleInconsistent,
                    id.clone(),
                    format!(
                        "chapter title {:?} differs from {:?}",
                        segment.chapter_title.trim(),
                        chapter_title.trim()
                    ),
                );
            }

            // the counter moves on regardless so one bad label stays a local finding
            if segment.position != expected_position {
                report.add(
                    IssueKind::SequencePosition,
                    id.clone(),
                    format!(
                        "expected position {expected_position}, found {}",
                        segment.position
                    ),
                );
            }
            expected_position += 1;

            let id_ok = segment
                .id
                .is_some_and(|v| identifier::matches_value(chapter_number, v, segment.position));
            if !id_ok {
                report.add(
                    IssueKind::IdentifierFormat,
                    id.clone(),
                    format!(
                        "identifier does not follow KNNN-SMMM (expected {})",
                        identifier::format_identifier(chapter_number, segment.position)
                    ),
                );
            }

            let step = walker.advance(segment.text);
            if !step.matched {
                report.add(
                    IssueKind::TextMismatch,
                    id.clone(),
                    format!(
                        "segment text does not match the source exactly at char {}",
                        step.span.start
                    ),
                );
            }

            for (name, claimed, computed) in [
                ("char_start", segment.char_start, step.span.start),
                ("char_end", segment.char_end, step.span.end),
            ] {
                if let Some(claimed) = claimed {
                    if claimed.as_u64() != Some(computed as u64) {
                        report.add(
                            IssueKind::ClaimedOffsetMismatch,
                            id.clone(),
                            format!("{name} {claimed} does not match computed {computed}"),
                        );
                    }
                }
            }

            let actual_words = words.count(segment.text);
            if i64::try_from(actual_words).ok() != Some(segment.word_count) {
                report.add(
                    IssueKind::WordCount,
                    id.clone(),
                    format!(
                        "word_count {} does not match counted {}",
                        segment.word_count, actual_words
                    ),
                );
            }

            if actual_words < self.limits.min_words {
                report.add(
                    IssueKind::SegmentLength,
                    id.clone(),
                    format!(
                        "segment has only {actual_words} words (< {})",
                        self.limits.min_words
                    ),
                );
            }
            if actual_words > self.limits.hard_max {
                report.add(
                    IssueKind::SegmentLength,
                    id.clone(),
                    format!(
                        "segment has {actual_words} words (> {})",
                        self.limits.hard_max
                    ),
                );
            }

            if self.rules.ends_mid_sentence(segment.text) {
                report.add(
                    IssueKind::SentenceBoundary,
                    id,
                    "segment does not end on '.', '?' or '!' (ignoring closing quotes and brackets)",
                );
            }

            normalized.push(segment.normalized(step.span, actual_words));
        }

        if !walker.is_complete() {
            report.add(
                IssueKind::Coverage,
                None,
                format!(
                    "segments end at char {} but the source has {} chars",
                    walker.cursor(),
                    walker.source_len()
                ),
            );
        }

        debug!(
            chapter_number,
            segments = candidates.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Validation pass finished"
        );

        Ok((report.finish(chapter_number, chapter_title), normalized))
    }
}

/// One-shot validation with the given limits and default boundary rules
pub fn validate(
    chapter_hint: Option<i64>,
    original_text: &str,
    candidates: &[Value],
    limits: &SegmentLimits,
) -> Result<(ValidationReport, Vec<NormalizedSegment>)> {
    Validator::new(*limits).validate(chapter_hint, original_text, candidates)
}
