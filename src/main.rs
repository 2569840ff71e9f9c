use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use seamguard::batch::{run_batch, write_run_stats, BatchConfig};
use seamguard::context::{build_review_payload, DEFAULT_CONTEXT_CHARS};
use seamguard::paths::{report_path_for, review_path_for};
use seamguard::reader::{read_chapter_text, read_segments};
use seamguard::writer::{convert_directory, convert_file, write_json, write_report, write_segments};
use seamguard::{SegmentLimits, Validator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seamguard")]
#[command(about = "Validates externally produced chapter segmentations against their source text")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// TOML file with a [segments] table of length thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate one chapter's candidate segments and write the report
    Validate(ValidateArgs),

    /// Convert JSON segment arrays into JSONL
    Convert {
        /// Files or directories (every *.json directly inside)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write converted files here instead of next to the inputs
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Build the boundary-review payload (segment plus neighbouring text)
    Context {
        /// Chapter text
        #[arg(long)]
        input: PathBuf,

        /// Segment file (.json or .jsonl)
        #[arg(long)]
        segments: PathBuf,

        /// Chars of context on each side
        #[arg(long, default_value_t = DEFAULT_CONTEXT_CHARS)]
        context_chars: usize,

        /// Payload path (default: <base>_review_payload.json next to the segments)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate every chapter/draft pair under a directory
    Batch {
        /// Root directory to scan for <base>.txt with <base>_draft.json(l)
        root_dir: PathBuf,

        /// Chapters validated at the same time (default: CPU count)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Stats output file path
        #[arg(long, default_value = "run_stats.json")]
        stats_out: PathBuf,

        /// Suppress console progress bars
        #[arg(long)]
        no_progress: bool,

        /// Abort on first chapter that cannot be loaded
        #[arg(long)]
        fail_fast: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Chapter text
    #[arg(long)]
    input: PathBuf,

    /// Candidate segments (.json array or .jsonl)
    #[arg(long)]
    segments: PathBuf,

    /// Expected chapter number; a differing first segment yields a warning
    #[arg(long)]
    chapter: Option<i64>,

    /// Report path (default: <base>_validation.json next to the segments)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write normalized segments here (.jsonl for one object per line)
    #[arg(long)]
    normalized_output: Option<PathBuf>,

    #[command(flatten)]
    limits: LimitArgs,
}

/// CLI overrides, applied on top of file and environment configuration
#[derive(Args, Debug)]
struct LimitArgs {
    /// Warn below this many words
    #[arg(long)]
    min_words: Option<usize>,

    /// Warn above this many words
    #[arg(long)]
    hard_max: Option<usize>,
}

impl LimitArgs {
    fn resolve(&self, config: Option<&Path>) -> Result<SegmentLimits> {
        // WHY: flags are the top layer, so consistency is judged only after they apply
        let mut limits = SegmentLimits::from_sources(config, |name| std::env::var(name).ok())
            .context("Failed to load segment limits")?;
        if let Some(min_words) = self.min_words {
            limits.min_words = min_words;
        }
        if let Some(hard_max) = self.hard_max {
            limits.hard_max = hard_max;
        }
        limits.check().context("Inconsistent segment limits")?;
        Ok(limits)
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    // WHY: structured JSON logging by default so batch runs can be ingested; text for humans
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is the normal case
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_format);
    info!(?cli, "Parsed CLI arguments");

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Validate(args) => run_validate(args, config).await,
        Commands::Convert { paths, output_dir } => run_convert(&paths, output_dir.as_deref()).await,
        Commands::Context {
            input,
            segments,
            context_chars,
            output,
        } => run_context(&input, &segments, context_chars, output).await,
        Commands::Batch {
            root_dir,
            concurrency,
            stats_out,
            no_progress,
            fail_fast,
            limits,
        } => {
            // WHY: validate root directory exists early to fail fast with clear error
            if !root_dir.is_dir() {
                anyhow::bail!("Root path is not a directory: {}", root_dir.display());
            }
            let defaults = BatchConfig::default();
            let batch_config = BatchConfig {
                concurrency: concurrency.unwrap_or(defaults.concurrency),
                fail_fast,
                show_progress: !no_progress,
                limits: limits.resolve(config)?,
            };
            let stats = run_batch(&root_dir, &batch_config).await?;
            write_run_stats(&stats_out, &stats).await?;

            println!(
                "seamguard v{} - {} chapters: {} ok, {} with warnings, {} with errors, {} skipped, {} failed",
                env!("CARGO_PKG_VERSION"),
                stats.chapter_stats.len(),
                stats.chapters_ok,
                stats.chapters_with_warnings,
                stats.chapters_with_errors,
                stats.chapters_skipped,
                stats.chapters_failed
            );
            Ok(exit_code(!stats.has_failures()))
        }
    }
}

async fn run_validate(args: ValidateArgs, config: Option<&Path>) -> Result<ExitCode> {
    let limits = args.limits.resolve(config)?;
    let (text, _) = read_chapter_text(&args.input).await?;
    let candidates = read_segments(&args.segments).await?;

    let (report, normalized) = Validator::new(limits)
        .validate(args.chapter, &text, &candidates)
        .with_context(|| format!("Validation failed for {}", args.segments.display()))?;

    let report_path = args
        .report
        .unwrap_or_else(|| report_path_for(&args.segments));
    write_report(&report_path, &report).await?;
    if let Some(path) = &args.normalized_output {
        write_segments(path, &normalized).await?;
    }

    for issue in &report.errors {
        warn!("{}", issue);
    }
    info!(
        status = %report.status,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "Chapter {} validated",
        report.chapter_number
    );
    println!(
        "Chapter {} \"{}\": {} ({} errors, {} warnings)",
        report.chapter_number,
        report.chapter_title,
        report.status,
        report.errors.len(),
        report.warnings.len()
    );
    Ok(exit_code(report.is_admissible()))
}

async fn run_convert(paths: &[PathBuf], output_dir: Option<&Path>) -> Result<ExitCode> {
    let mut converted = 0usize;
    for path in paths {
        if path.is_dir() {
            converted += convert_directory(path, output_dir).await?.len();
        } else {
            let target = output_dir.map(|dir| {
                let name = path.with_extension("jsonl");
                dir.join(name.file_name().unwrap_or_default())
            });
            convert_file(path, target.as_deref()).await?;
            converted += 1;
        }
    }
    println!("Converted {converted} files");
    Ok(ExitCode::SUCCESS)
}

async fn run_context(
    input: &Path,
    segments: &Path,
    context_chars: usize,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let (text, _) = read_chapter_text(input).await?;
    let candidates = read_segments(segments).await?;
    let payload = build_review_payload(&text, &candidates, context_chars)
        .with_context(|| format!("Cannot build review payload for {}", segments.display()))?;

    let output = output.unwrap_or_else(|| review_path_for(segments));
    write_json(&output, &payload).await?;
    info!("Review payload with {} segments written to {}", payload.len(), output.display());
    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
