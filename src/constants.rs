//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// BENCHMARK DEFAULTS
// =============================================================================

/// Default minimum number of sampler iterations per sample
pub const DEFAULT_MIN_ITERATIONS: u32 = 100;

/// Default maximum sampling time per sample, in seconds (overrides iterations)
pub const DEFAULT_MAX_TIME_SECONDS: u64 = 10;

/// Environment variable carrying the iteration bound to the sampler process
pub const SAMPLER_MIN_ITERATIONS_ENV: &str = "BENCH_MIN_ITERATIONS";

/// Environment variable carrying the time bound to the sampler process
pub const SAMPLER_MAX_TIME_ENV: &str = "BENCH_MAX_TIME";

// =============================================================================
// FILESYSTEM DEFAULTS
// =============================================================================

/// Default root for all benchmark artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default directory holding the sample corpus
pub const DEFAULT_SAMPLES_DIR: &str = "samples";

/// Default comma-separated sample list
pub const DEFAULT_SAMPLES: &str = "README.md";

/// Default directory holding the per-language runner scripts
pub const DEFAULT_RUNNERS_DIR: &str = "runners";

/// Default Node.js executable
pub const DEFAULT_NODE_BINARY: &str = "node";

/// Default directory in which the profiler deposits its raw trace
pub const DEFAULT_TRACE_DIR: &str = ".";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "shootout=info";

// =============================================================================
// ARTIFACT NAMES
// =============================================================================

/// Timing samples for one (runner, sample) pair
pub const TIMES_FILE: &str = "times.json";

/// Rendered document for one (runner, sample) pair
pub const DOCUMENT_FILE: &str = "output.html";

/// Extension given to a normalized trace (replaces the raw `log` extension)
pub const NORMALIZED_TRACE_EXTENSION: &str = "fixed.log";

/// Extension given to the report tool's output
pub const REPORT_EXTENSION: &str = "txt";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const JAVASCRIPT: &str = "javascript";
}
