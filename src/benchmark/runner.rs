//! Runner contract - the lifecycle every benchmarked implementation exposes

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{BenchmarkResult, RunnerConfig, Sample},
};

/// A pluggable implementation under benchmark.
///
/// The scheduler drives every runner through
/// `initialize -> benchmark* -> analyze`:
///
/// - `initialize` is called exactly once, possibly concurrently with other
///   runners' `initialize`.
/// - `benchmark` is called once per sample, never concurrently with any other
///   `benchmark` call (of this or any other runner).
/// - `analyze` is called exactly once after the runner's last `benchmark`,
///   possibly concurrently with other runners' `analyze`.
///
/// Runners keep their own state between calls and never share it.
#[async_trait]
pub trait BenchmarkRunner: Send + Sync {
    /// Programming language of the implementation
    fn language(&self) -> &str;

    /// Name of the implementation
    fn description(&self) -> &str;

    /// Version of the implementation
    fn version(&self) -> &str;

    /// Perform setup prior to benchmarking
    async fn initialize(&mut self, config: RunnerConfig) -> AppResult<()>;

    /// Run the implementation over one sample under profiling
    async fn benchmark(&mut self, sample: &Sample) -> AppResult<BenchmarkResult>;

    /// Post-process the artifacts collected by `benchmark`
    async fn analyze(&mut self) -> AppResult<()>;

    /// Display title, e.g. `marked (4.0.0) [javascript]`
    fn title(&self) -> String {
        format!(
            "{} ({}) [{}]",
            self.description(),
            self.version(),
            self.language()
        )
    }
}
