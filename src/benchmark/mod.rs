//! Benchmark orchestration engine
//!
//! Runners are driven through three phases by the [`PhaseScheduler`]:
//!
//! 1. **Initialize**: every runner prepares its artifact directory, concurrently.
//! 2. **Benchmark**: each runner profiles every sample, one run at a time.
//! 3. **Analyze**: every runner post-processes its traces, concurrently.
//!
//! Results land in the [`ArtifactStore`]; progress is streamed as
//! [`ProgressEvent`]s.

pub mod command;
pub mod corpus;
pub mod languages;
pub mod progress;
pub mod registry;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod store;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_utils;

pub use corpus::SampleCorpus;
pub use progress::{Phase, ProgressEvent, ProgressSender};
pub use registry::RunnerRegistry;
pub use runner::BenchmarkRunner;
pub use scheduler::{PhaseScheduler, RunSummary};
pub use store::ArtifactStore;
pub use trace::TraceNormalizer;
