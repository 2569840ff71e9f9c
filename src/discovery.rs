use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::paths::draft_paths_for;

/// Configuration for chapter discovery behavior
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// A chapter text and the candidate segment file found next to it
#[derive(Debug, Clone)]
pub struct ChapterPair {
    pub text_path: PathBuf,
    pub segments_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ChapterPair {
    /// Both files present and accessible
    pub fn is_ready(&self) -> bool {
        self.segments_path.is_some() && self.error.is_none()
    }
}

/// Discovers all `**/*.txt` chapter texts under `root_dir` and pairs each with
/// its `<base>_draft.json` (or `.jsonl`) candidate file.
///
/// A text without a candidate file is yielded with an error rather than skipped,
/// so the caller can account for it.
pub fn discover_chapters(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<ChapterPair>> {
    let root_path = root_dir.as_ref().to_path_buf();

    // WHY: futures::stream::unfold keeps glob's lazy iteration without another dependency
    futures::stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move { state.next_chapter().await.map(|result| (result, state)) },
    )
}

/// Internal state for chapter discovery iteration
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    async fn next_chapter(&mut self) -> Option<Result<ChapterPair>> {
        // Initialize glob iterator on first call
        if self.glob_iter.is_none() {
            let pattern = format!("{}/**/*.txt", self.root_dir.display());
            debug!("Starting chapter discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("Chapter discovery initialized for root: {}", self.root_dir.display());
                }
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            }
        }

        loop {
            let glob_iter = self.glob_iter.as_mut()?;
            match glob_iter.next() {
                Some(Ok(path)) => {
                    debug!("Found chapter text: {}", path.display());
                    return Some(self.pair_chapter(path).await);
                }
                Some(Err(e)) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                    // Continue to next file on non-fatal glob errors
                }
                None => {
                    info!("Chapter discovery completed");
                    return None;
                }
            }
        }
    }

    async fn pair_chapter(&self, text_path: PathBuf) -> Result<ChapterPair> {
        match fs::metadata(&text_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                let error = format!("Path is not a file: {}", text_path.display());
                warn!("{}", error);
                return Ok(ChapterPair {
                    text_path,
                    segments_path: None,
                    error: Some(error),
                });
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", text_path.display(), e);
                warn!("{}", error);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error));
                }
                return Ok(ChapterPair {
                    text_path,
                    segments_path: None,
                    error: Some(error),
                });
            }
        }

        for candidate in draft_paths_for(&text_path) {
            if fs::try_exists(&candidate).await.unwrap_or(false) {
                debug!("Paired {} with {}", text_path.display(), candidate.display());
                return Ok(ChapterPair {
                    text_path,
                    segments_path: Some(candidate),
                    error: None,
                });
            }
        }

        let error = format!("No candidate segment file for {}", text_path.display());
        warn!("{}", error);
        Ok(ChapterPair {
            text_path,
            segments_path: None,
            error: Some(error),
        })
    }
}

/// Collect all discovered chapters into a Vec, sorted by text path
pub async fn collect_discovered_chapters(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<ChapterPair>> {
    let mut chapters = Vec::new();
    let mut stream = Box::pin(discover_chapters(root_dir, config));

    while let Some(result) = stream.next().await {
        chapters.push(result?);
    }
    chapters.sort_by(|a, b| a.text_path.cmp(&b.text_path));

    let ready_count = chapters.iter().filter(|c| c.is_ready()).count();
    let unpaired_count = chapters.len() - ready_count;
    if unpaired_count > 0 {
        warn!("Found {} chapter texts without usable segments", unpaired_count);
    }
    info!(
        "Chapter discovery summary: {} total, {} ready, {} unpaired",
        chapters.len(),
        ready_count,
        unpaired_count
    );

    Ok(chapters)
}
