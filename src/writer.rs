// WHY: persisting results is the driver's job; the core hands back values only
// JSON output is pretty-printed UTF-8, JSONL output is one compact object per line

use crate::reader::SegmentFormat;
use crate::report::ValidationReport;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write `value` as pretty JSON, creating parent directories
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path).await?;
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write each item as one JSON line
pub async fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    ensure_parent(path).await?;
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        let line = serde_json::to_string(item)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

pub async fn write_report(path: &Path, report: &ValidationReport) -> Result<()> {
    write_json(path, report).await?;
    info!("Validation report written to {}", path.display());
    Ok(())
}

/// Write segments as a JSON array or as JSONL, chosen by the path's extension
pub async fn write_segments<T: Serialize>(path: &Path, segments: &[T]) -> Result<()> {
    match SegmentFormat::from_path(path) {
        SegmentFormat::Json => write_json(path, segments).await?,
        SegmentFormat::JsonLines => write_jsonl(path, segments).await?,
    }
    info!("Wrote {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Convert a JSON array file into JSONL; defaults to the same path with `.jsonl`
pub async fn convert_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("jsonl"));

    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let items: Vec<Value> = crate::reader::parse_segments(&content, SegmentFormat::Json)
        .with_context(|| format!("Expected a list of objects in {}", input.display()))?;

    write_jsonl(&output, &items).await?;
    info!("Converted {} -> {}", input.display(), output.display());
    Ok(output)
}

/// Convert every `*.json` file directly inside `dir`, in name order
pub async fn convert_directory(dir: &Path, output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let mut inputs: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid directory pattern {pattern}"))?
        .filter_map(|entry| entry.ok())
        .filter(|path| !crate::paths::is_derived_output(path))
        .collect();
    inputs.sort();

    let mut outputs = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let target = output_dir.map(|out| {
            let name = input.with_extension("jsonl");
            out.join(name.file_name().unwrap_or_default())
        });
        outputs.push(convert_file(input, target.as_deref()).await?);
    }
    Ok(outputs)
}
