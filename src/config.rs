//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! Configuration is loaded once at startup and passed down by value; nothing reads
//! the environment after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_TIME_SECONDS, DEFAULT_MIN_ITERATIONS, DEFAULT_NODE_BINARY,
    DEFAULT_OUTPUT_DIR, DEFAULT_RUNNERS_DIR, DEFAULT_SAMPLES, DEFAULT_SAMPLES_DIR,
    DEFAULT_TRACE_DIR,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub benchmark: BenchmarkConfig,
    pub node: NodeConfig,
    pub rust_log: String,
}

/// Filesystem locations
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root of the artifact tree
    pub output_dir: PathBuf,
    /// Directory holding the sample corpus
    pub samples_dir: PathBuf,
    /// Sample file names, in benchmark order
    pub samples: Vec<String>,
    /// Directory holding `{language}/` runner scripts
    pub runners_dir: PathBuf,
}

/// Sampler bounds handed to every runner at initialization
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkConfig {
    pub min_iterations: u32,
    /// Overrides `min_iterations` as the stopping condition
    pub max_time: Duration,
}

/// Node.js runner configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Executable used for both `--prof` and `--prof-process`
    pub binary: PathBuf,
    /// Working directory of profiled runs, where `isolate-*-v8.log` appears
    pub trace_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            storage: StorageConfig::from_lookup(&lookup)?,
            benchmark: BenchmarkConfig::from_lookup(&lookup)?,
            node: NodeConfig::from_lookup(&lookup),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

impl StorageConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let samples: Vec<String> = lookup("SAMPLES")
            .unwrap_or_else(|| DEFAULT_SAMPLES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if samples.is_empty() {
            return Err(ConfigError::InvalidValue("SAMPLES".to_string()));
        }

        Ok(Self {
            output_dir: PathBuf::from(
                lookup("OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            samples_dir: PathBuf::from(
                lookup("SAMPLES_DIR").unwrap_or_else(|| DEFAULT_SAMPLES_DIR.to_string()),
            ),
            samples,
            runners_dir: PathBuf::from(
                lookup("RUNNERS_DIR").unwrap_or_else(|| DEFAULT_RUNNERS_DIR.to_string()),
            ),
        })
    }
}

impl BenchmarkConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let min_iterations = lookup("BENCHMARK_MIN_ITERATIONS")
            .unwrap_or_else(|| DEFAULT_MIN_ITERATIONS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BENCHMARK_MIN_ITERATIONS".to_string()))?;
        let max_time_seconds: u64 = lookup("BENCHMARK_MAX_TIME_SECONDS")
            .unwrap_or_else(|| DEFAULT_MAX_TIME_SECONDS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BENCHMARK_MAX_TIME_SECONDS".to_string()))?;

        Ok(Self {
            min_iterations,
            max_time: Duration::from_secs(max_time_seconds),
        })
    }
}

impl NodeConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            binary: PathBuf::from(
                lookup("NODE_BINARY").unwrap_or_else(|| DEFAULT_NODE_BINARY.to_string()),
            ),
            trace_dir: PathBuf::from(
                lookup("TRACE_DIR").unwrap_or_else(|| DEFAULT_TRACE_DIR.to_string()),
            ),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
