//! Language-specific runners
//!
//! Each language module knows how to drive its implementations through the
//! profiler of its own runtime.

pub mod javascript;

use crate::{config::Config, error::AppResult};

use super::registry::RunnerRegistry;

pub use javascript::NodeRunner;

/// Build the registry of every runner this build knows about, in benchmark order
pub async fn default_registry(config: &Config) -> AppResult<RunnerRegistry> {
    let mut registry = RunnerRegistry::new();

    for runner in javascript::runners(config).await? {
        registry.register(Box::new(runner))?;
    }

    Ok(registry)
}
