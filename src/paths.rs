// WHY: one place for the naming convention of files derived from a chapter
// <base>.txt is the source, <base>_draft.json(l) the candidates, reports and
// normalized output land next to the candidates

use std::path::{Path, PathBuf};

pub const DRAFT_SUFFIX: &str = "_draft";
pub const REPORT_SUFFIX: &str = "_validation.json";
pub const NORMALIZED_SUFFIX: &str = "_normalized.json";
pub const REVIEW_SUFFIX: &str = "_review_payload.json";

/// Chapter base name of a source or segment file (`k004_draft.json` -> `k004`)
pub fn chapter_base(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    stem.strip_suffix(DRAFT_SUFFIX).unwrap_or(stem).to_string()
}

fn sibling(path: &Path, file_name: String) -> PathBuf {
    let mut out = path.to_path_buf();
    out.set_file_name(file_name);
    out
}

/// Candidate segment files for a chapter text, JSON preferred over JSONL
pub fn draft_paths_for(text_path: &Path) -> [PathBuf; 2] {
    let base = chapter_base(text_path);
    [
        sibling(text_path, format!("{base}{DRAFT_SUFFIX}.json")),
        sibling(text_path, format!("{base}{DRAFT_SUFFIX}.jsonl")),
    ]
}

/// Default report location for a segment file
pub fn report_path_for(segments_path: &Path) -> PathBuf {
    sibling(segments_path, format!("{}{REPORT_SUFFIX}", chapter_base(segments_path)))
}

/// Default normalized-output location for a segment file
pub fn normalized_path_for(segments_path: &Path) -> PathBuf {
    sibling(segments_path, format!("{}{NORMALIZED_SUFFIX}", chapter_base(segments_path)))
}

/// Default review-payload location for a segment file
pub fn review_path_for(segments_path: &Path) -> PathBuf {
    sibling(segments_path, format!("{}{REVIEW_SUFFIX}", chapter_base(segments_path)))
}

/// Whether a file name belongs to derived output rather than input
pub fn is_derived_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.ends_with(REPORT_SUFFIX)
                || name.ends_with(NORMALIZED_SUFFIX)
                || name.ends_with(REVIEW_SUFFIX)
        })
}
