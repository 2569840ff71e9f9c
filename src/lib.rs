pub mod batch;
pub mod boundary;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod identifier;
pub mod offsets;
pub mod paths;
pub mod reader;
pub mod report;
pub mod segment;
pub mod text;
pub mod validator;
pub mod writer;

// Re-export the validation core for convenient access
pub use config::SegmentLimits;
pub use error::{Result, SeamError};
pub use identifier::matches;
pub use offsets::{compute_offsets, Span};
pub use report::{Issue, IssueKind, ReportStatus, Severity, ValidationReport};
pub use segment::NormalizedSegment;
pub use text::{count_words, normalize_text};
pub use validator::{validate, Validator};

// Re-export driver entry points used by the binary and benchmarks
pub use batch::{run_batch, BatchConfig, ChapterStats, RunStats};
pub use context::{build_review_payload, ReviewEntry};
