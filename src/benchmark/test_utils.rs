//! In-memory runner used by scheduler and registry tests

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{BenchmarkResult, RunnerConfig, Sample},
};

use super::runner::BenchmarkRunner;

/// Shared record of every lifecycle call made on a set of fake runners
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
    configs: Arc<Mutex<Vec<RunnerConfig>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<RunnerConfig> {
        self.configs.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct FakeRunner {
    description: String,
    log: CallLog,
    initialize_delay: Option<Duration>,
    fail_initialize: bool,
    fail_on_sample: Option<usize>,
    fail_analyze: bool,
    benchmarked: usize,
}

impl FakeRunner {
    pub fn new(description: &str, log: &CallLog) -> Self {
        Self {
            description: description.to_string(),
            log: log.clone(),
            initialize_delay: None,
            fail_initialize: false,
            fail_on_sample: None,
            fail_analyze: false,
            benchmarked: 0,
        }
    }

    pub fn initialize_delay(mut self, delay: Duration) -> Self {
        self.initialize_delay = Some(delay);
        self
    }

    pub fn fail_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Fail the `index`-th benchmark call (0-based)
    pub fn fail_on_sample(mut self, index: usize) -> Self {
        self.fail_on_sample = Some(index);
        self
    }

    pub fn fail_analyze(mut self) -> Self {
        self.fail_analyze = true;
        self
    }
}

#[async_trait]
impl BenchmarkRunner for FakeRunner {
    fn language(&self) -> &str {
        "fake"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    async fn initialize(&mut self, config: RunnerConfig) -> AppResult<()> {
        if let Some(delay) = self.initialize_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.record(format!("initialize {}", self.description));

        if self.fail_initialize {
            return Err(AppError::Configuration("no runtime".to_string()));
        }
        self.log.configs.lock().unwrap().push(config);
        Ok(())
    }

    async fn benchmark(&mut self, sample: &Sample) -> AppResult<BenchmarkResult> {
        self.log
            .record(format!("benchmark {} {}", self.description, sample.friendly_name));

        let index = self.benchmarked;
        self.benchmarked += 1;
        if self.fail_on_sample == Some(index) {
            return Err(AppError::TraceMissing {
                dir: PathBuf::from("/traces"),
            });
        }

        Ok(BenchmarkResult {
            times: vec![1.0, 2.0],
            document: format!("<p>{}</p>", sample.friendly_name),
        })
    }

    async fn analyze(&mut self) -> AppResult<()> {
        self.log.record(format!("analyze {}", self.description));

        if self.fail_analyze {
            return Err(AppError::ReportTool {
                trace: PathBuf::from("/traces/trace.fixed.log"),
                status: "exit status: 2".to_string(),
            });
        }
        Ok(())
    }
}
