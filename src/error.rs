//! Custom error types and handling
//!
//! Every failure the pipeline can produce is one variant of [`AppError`].
//! The scheduler decides how far each failure propagates; see
//! [`crate::benchmark::scheduler`].

use std::path::PathBuf;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Initialize phase
    #[error("Setup failed for {runner}: {source}")]
    Setup {
        runner: String,
        #[source]
        source: Box<AppError>,
    },

    // Benchmark phase
    #[error("Could not find a trace log in {}", dir.display())]
    TraceMissing { dir: PathBuf },

    #[error("Found {count} trace logs in {}, cannot attribute the trace", dir.display())]
    TraceCollision { dir: PathBuf, count: usize },

    #[error("Sampler failed: {0}")]
    Sampler(String),

    #[error("Runner not initialized: {0}")]
    NotInitialized(String),

    // Analyze phase
    #[error("Malformed trace record at line {line}: expected {expected} fields, found {found}")]
    MalformedTrace {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Report tool exited with status {status} for {}", trace.display())]
    ReportTool { trace: PathBuf, status: String },

    #[error("Refusing to overwrite existing artifact {}", path.display())]
    DuplicateOutput { path: PathBuf },

    // Registry and artifact layout
    #[error("Invalid artifact key component: {0:?}")]
    InvalidArtifactKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Infrastructure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "SETUP_ERROR",
            Self::TraceMissing { .. } => "TRACE_MISSING",
            Self::TraceCollision { .. } => "TRACE_COLLISION",
            Self::Sampler(_) => "SAMPLER_ERROR",
            Self::NotInitialized(_) => "NOT_INITIALIZED",
            Self::MalformedTrace { .. } => "MALFORMED_TRACE",
            Self::ReportTool { .. } => "REPORT_TOOL_ERROR",
            Self::DuplicateOutput { .. } => "DUPLICATE_OUTPUT",
            Self::InvalidArtifactKey(_) => "INVALID_ARTIFACT_KEY",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Wrap an Initialize-phase failure with the runner it came from
    pub fn setup(runner: impl Into<String>, source: AppError) -> Self {
        Self::Setup {
            runner: runner.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
