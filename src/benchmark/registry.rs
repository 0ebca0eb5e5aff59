//! Runner registry

use std::collections::HashSet;

use crate::error::{AppError, AppResult};

use super::runner::BenchmarkRunner;

/// Ordered, fixed set of runners built at startup
#[derive(Default)]
pub struct RunnerRegistry {
    runners: Vec<Box<dyn BenchmarkRunner>>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a runner. Two runners with the same `(language, description)`
    /// would write to the same artifact directory, so that is rejected.
    pub fn register(&mut self, runner: Box<dyn BenchmarkRunner>) -> AppResult<()> {
        let clash = self.runners.iter().any(|r| {
            r.language() == runner.language() && r.description() == runner.description()
        });
        if clash {
            return Err(AppError::Configuration(format!(
                "Runner registered twice: {}",
                runner.title()
            )));
        }

        self.runners.push(runner);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn BenchmarkRunner> {
        self.runners.iter().map(|r| r.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn BenchmarkRunner>> {
        self.runners.iter_mut()
    }

    pub fn titles(&self) -> Vec<String> {
        self.iter().map(|r| r.title()).collect()
    }

    /// Languages present, in registration order
    pub fn languages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|r| r.language())
            .filter(|l| seen.insert(*l))
            .collect()
    }
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.titles()).finish()
    }
}
