// WHY: chapters are independent, so a directory of them is validated concurrently
// Each chapter still runs as one pure validator call; only I/O and scheduling live here

use crate::config::SegmentLimits;
use crate::discovery::{collect_discovered_chapters, ChapterPair, DiscoveryConfig};
use crate::paths::{normalized_path_for, report_path_for};
use crate::reader::{read_chapter_text, read_segments};
use crate::validator::Validator;
use crate::writer::{write_json, write_report, write_segments};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Per-chapter processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChapterStats {
    /// Chapter text path
    pub path: String,
    /// Candidate segment file, when one was found
    pub segments_path: Option<String>,
    pub chapter_number: Option<i64>,
    /// Report status (ok, warnings, errors), or skipped/failed when no report exists
    pub status: String,
    pub segments: u64,
    pub errors: u64,
    pub warnings: u64,
    pub segments_in_target_band: u64,
    pub processing_time_ms: u64,
    /// Error message if the chapter could not be validated
    pub error: Option<String>,
}

impl ChapterStats {
    fn without_report(pair: &ChapterPair, status: &str, error: String, elapsed_ms: u64) -> Self {
        Self {
            path: pair.text_path.display().to_string(),
            segments_path: pair.segments_path.as_ref().map(|p| p.display().to_string()),
            chapter_number: None,
            status: status.to_string(),
            segments: 0,
            errors: 0,
            warnings: 0,
            segments_in_target_band: 0,
            processing_time_ms: elapsed_ms,
            error: Some(error),
        }
    }
}

/// Aggregate statistics for one batch run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Seconds since the Unix epoch at which the run started
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub chapters_ok: u64,
    pub chapters_with_warnings: u64,
    pub chapters_with_errors: u64,
    pub chapters_skipped: u64,
    pub chapters_failed: u64,
    pub total_segments: u64,
    pub chapter_stats: Vec<ChapterStats>,
}

impl RunStats {
    /// True when any chapter has errors, failed to load or lacked segments
    pub fn has_failures(&self) -> bool {
        self.chapters_with_errors + self.chapters_failed + self.chapters_skipped > 0
    }

    fn from_chapters(run_start: u64, elapsed_ms: u64, mut chapter_stats: Vec<ChapterStats>) -> Self {
        chapter_stats.sort_by(|a, b| a.path.cmp(&b.path));
        let count = |status: &str| chapter_stats.iter().filter(|c| c.status == status).count() as u64;
        Self {
            run_start,
            total_processing_time_ms: elapsed_ms,
            chapters_ok: count("ok"),
            chapters_with_warnings: count("warnings"),
            chapters_with_errors: count("errors"),
            chapters_skipped: count("skipped"),
            chapters_failed: count("failed"),
            total_segments: chapter_stats.iter().map(|c| c.segments).sum(),
            chapter_stats,
        }
    }
}

/// Configuration for batch validation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Chapters validated at the same time
    pub concurrency: usize,
    /// Abort on the first chapter that cannot be loaded
    pub fail_fast: bool,
    /// Show a console progress bar
    pub show_progress: bool,
    pub limits: SegmentLimits,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
            fail_fast: false,
            show_progress: true,
            limits: SegmentLimits::default(),
        }
    }
}

/// Discover chapters under `root_dir` and validate all of them
pub async fn run_batch(root_dir: &Path, config: &BatchConfig) -> Result<RunStats> {
    let discovery_config = DiscoveryConfig {
        fail_fast: config.fail_fast,
    };
    let chapters = collect_discovered_chapters(root_dir, discovery_config).await?;
    process_chapters(chapters, config).await
}

/// Validate discovered chapters concurrently, writing each report and, for admissible
/// chapters only, the normalized segments
pub async fn process_chapters(chapters: Vec<ChapterPair>, config: &BatchConfig) -> Result<RunStats> {
    let run_start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let started = Instant::now();
    let validator = Arc::new(Validator::new(config.limits));
    let progress = progress_bar(chapters.len() as u64, config.show_progress);

    let mut outcomes = stream::iter(chapters)
        .map(|pair| {
            let validator = Arc::clone(&validator);
            async move {
                let chapter_started = Instant::now();
                let outcome = validate_chapter(&pair, validator).await;
                (pair, outcome, chapter_started.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(config.concurrency.max(1));

    let mut chapter_stats = Vec::new();
    while let Some((pair, outcome, elapsed_ms)) = outcomes.next().await {
        let stats = match outcome {
            Ok(ChapterOutcome::Validated(mut stats)) => {
                stats.processing_time_ms = elapsed_ms;
                stats
            }
            Ok(ChapterOutcome::Skipped(reason)) => {
                ChapterStats::without_report(&pair, "skipped", reason, elapsed_ms)
            }
            Err(e) => {
                warn!("Failed to validate {}: {:#}", pair.text_path.display(), e);
                if config.fail_fast {
                    progress.abandon();
                    return Err(e.context(format!("Aborting batch at {}", pair.text_path.display())));
                }
                ChapterStats::without_report(&pair, "failed", format!("{e:#}"), elapsed_ms)
            }
        };
        progress.set_message(file_name(&pair.text_path));
        progress.inc(1);
        chapter_stats.push(stats);
    }
    progress.finish_with_message("Complete");

    let stats = RunStats::from_chapters(run_start, started.elapsed().as_millis() as u64, chapter_stats);
    info!(
        "Batch finished: {} ok, {} with warnings, {} with errors, {} skipped, {} failed in {}ms",
        stats.chapters_ok,
        stats.chapters_with_warnings,
        stats.chapters_with_errors,
        stats.chapters_skipped,
        stats.chapters_failed,
        stats.total_processing_time_ms
    );
    Ok(stats)
}

/// Write run statistics as pretty JSON
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    write_json(path, stats).await?;
    info!("Run statistics written to {}", path.display());
    Ok(())
}

enum ChapterOutcome {
    Validated(ChapterStats),
    Skipped(String),
}

async fn validate_chapter(pair: &ChapterPair, validator: Arc<Validator>) -> Result<ChapterOutcome> {
    let segments_path: PathBuf = match (&pair.segments_path, &pair.error) {
        (Some(path), None) => path.clone(),
        (_, Some(error)) => return Ok(ChapterOutcome::Skipped(error.clone())),
        (None, None) => return Ok(ChapterOutcome::Skipped("No candidate segment file".to_string())),
    };

    let (text, _read_stats) = read_chapter_text(&pair.text_path).await?;
    let candidates = read_segments(&segments_path).await?;

    // WHY: validation is CPU-bound; keep it off the async worker threads
    let worker = Arc::clone(&validator);
    let (report, normalized) =
        tokio::task::spawn_blocking(move || worker.validate(None, &text, &candidates))
            .await?
            .with_context(|| format!("Cannot validate {}", segments_path.display()))?;

    write_report(&report_path_for(&segments_path), &report).await?;

    // WHY: a normalized file next to the draft means "safe to index"; rejected chapters must not leave one
    let normalized_path = normalized_path_for(&segments_path);
    let in_band = if report.is_admissible() {
        write_segments(&normalized_path, &normalized).await?;
        let limits = validator.limits();
        normalized
            .iter()
            .filter(|segment| limits.in_target_band(segment.word_count()))
            .count()
    } else {
        remove_stale_output(&normalized_path).await?;
        warn!(
            "{}: {} errors, {} warnings; normalized segments withheld",
            segments_path.display(),
            report.errors.len(),
            report.warnings.len()
        );
        0
    };

    Ok(ChapterOutcome::Validated(ChapterStats {
        path: pair.text_path.display().to_string(),
        segments_path: Some(segments_path.display().to_string()),
        chapter_number: Some(report.chapter_number),
        status: report.status.to_string(),
        segments: normalized.len() as u64,
        errors: report.errors.len() as u64,
        warnings: report.warnings.len() as u64,
        segments_in_target_band: in_band as u64,
        processing_time_ms: 0,
        error: None,
    }))
}

/// Drop normalized output left behind by an earlier, admissible run
async fn remove_stale_output(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("Removed stale normalized output {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} chapters {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
