//! Benchmark result models

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings handed to a runner exactly once, at initialization
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Minimum number of iterations the sampler performs
    pub min_iterations: u32,
    /// Maximum sampling time; overrides `min_iterations`
    pub max_time: Duration,
    /// `{output}/{language}/{description}` for this runner
    pub artifact_dir: PathBuf,
}

/// Output of one sampler execution for a (runner, sample) pair
///
/// This is exactly the JSON line the sampler prints on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Sampled times in microseconds, in sampling order
    pub times: Vec<f64>,
    /// Rendered HTML
    pub document: String,
}

impl BenchmarkResult {
    /// Parse the sampler's stdout.
    ///
    /// The sampler prints a single JSON line; anything it logs before that line
    /// is ignored.
    pub fn from_sampler_output(stdout: &str) -> serde_json::Result<Self> {
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or_default();
        serde_json::from_str(line.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sampler_output() {
        let stdout = "{\"times\":[12.5,13.0,11.75],\"document\":\"<h1>Hi</h1>\\n\"}\n";
        let result = BenchmarkResult::from_sampler_output(stdout).unwrap();

        assert_eq!(result.times, vec![12.5, 13.0, 11.75]);
        assert_eq!(result.document, "<h1>Hi</h1>\n");
    }

    #[test]
    fn test_parse_ignores_leading_noise() {
        let stdout = "warming up\n{\"times\":[1],\"document\":\"\"}\n\n";
        let result = BenchmarkResult::from_sampler_output(stdout).unwrap();
        assert_eq!(result.times, vec![1.0]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(BenchmarkResult::from_sampler_output("").is_err());
        assert!(BenchmarkResult::from_sampler_output("{\"times\":\"fast\"}").is_err());
    }
}
