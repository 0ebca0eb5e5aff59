//! Phase scheduler - drives every runner through the three pipeline phases
//!
//! | Phase      | Concurrency                        | On failure                         |
//! |------------|------------------------------------|------------------------------------|
//! | Initialize | all runners at once                | whole run fails, others abandoned  |
//! | Benchmark  | one runner, one sample at a time   | that runner's remaining samples skipped |
//! | Analyze    | all runners at once                | isolated, collected into the summary |
//!
//! Benchmark must stay strictly sequential: profiled runs deposit their trace
//! in a shared directory and a runner attributes whatever trace it finds
//! there to the sample it just ran.

use futures::future::{join_all, try_join_all};

use crate::{
    config::BenchmarkConfig,
    error::{AppError, AppResult},
    models::{RunnerConfig, Sample},
};

use super::{
    corpus::SampleCorpus,
    progress::{Phase, ProgressEvent, ProgressSender},
    registry::RunnerRegistry,
    runner::BenchmarkRunner,
    store::ArtifactStore,
};

/// Result of one runner's Benchmark loop
#[derive(Debug)]
pub struct BenchmarkOutcome {
    pub runner: String,
    pub completed_samples: usize,
    pub error: Option<AppError>,
}

/// Result of one runner's Analyze step
#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub runner: String,
    pub error: Option<AppError>,
}

/// Per-runner outcomes of a run that got past Initialize
#[derive(Debug, Default)]
pub struct RunSummary {
    pub benchmark: Vec<BenchmarkOutcome>,
    pub analyze: Vec<AnalyzeOutcome>,
}

impl RunSummary {
    /// Every failure, as `(phase, runner title, error)`
    pub fn failures(&self) -> Vec<(Phase, &str, &AppError)> {
        let benchmark = self
            .benchmark
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| (Phase::Benchmark, o.runner.as_str(), e)));
        let analyze = self
            .analyze
            .iter()
            .filter_map(|o| o.error.as_ref().map(|e| (Phase::Analyze, o.runner.as_str(), e)));

        benchmark.chain(analyze).collect()
    }

    pub fn is_success(&self) -> bool {
        self.benchmark.iter().all(|o| o.error.is_none())
            && self.analyze.iter().all(|o| o.error.is_none())
    }
}

/// Drives Initialize -> Benchmark -> Analyze
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    store: ArtifactStore,
    bounds: BenchmarkConfig,
    progress: ProgressSender,
}

impl PhaseScheduler {
    pub fn new(store: ArtifactStore, bounds: BenchmarkConfig) -> Self {
        Self {
            store,
            bounds,
            progress: ProgressSender::disabled(),
        }
    }

    /// Stream progress events to a reporting layer
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = progress;
        self
    }

    /// Run all three phases.
    ///
    /// Returns `Err` only when Initialize fails, in which case nothing was
    /// benchmarked. Benchmark and Analyze failures are reported in the summary.
    pub async fn run(
        &self,
        registry: &mut RunnerRegistry,
        corpus: &SampleCorpus,
    ) -> AppResult<RunSummary> {
        tracing::info!(
            runners = registry.len(),
            samples = corpus.len(),
            output = %self.store.root().display(),
            "Starting benchmark run"
        );

        self.initialize(registry).await?;
        let benchmark = self.benchmark(registry, corpus).await;
        let analyze = self.analyze(registry).await;

        Ok(RunSummary { benchmark, analyze })
    }

    /// Initialize every runner concurrently; the first failure aborts the phase
    pub async fn initialize(&self, registry: &mut RunnerRegistry) -> AppResult<()> {
        let phase = Phase::Initialize;
        self.start_phase(phase);

        let tasks = registry.iter_mut().map(|runner| async move {
            let title = runner.title();
            self.start_task(phase, &title);

            match self.initialize_runner(runner.as_mut()).await {
                Ok(()) => {
                    self.finish_task(phase, &title, None);
                    Ok(())
                }
                Err(e) => {
                    self.finish_task(phase, &title, Some(&e));
                    Err(AppError::setup(title, e))
                }
            }
        });

        let result = try_join_all(tasks).await.map(|_| ());
        self.finish_phase(phase, usize::from(result.is_err()));
        result
    }

    /// Benchmark runners one after another, each over the corpus in order
    pub async fn benchmark(
        &self,
        registry: &mut RunnerRegistry,
        corpus: &SampleCorpus,
    ) -> Vec<BenchmarkOutcome> {
        let phase = Phase::Benchmark;
        self.start_phase(phase);

        let mut outcomes = Vec::with_capacity(registry.len());
        for runner in registry.iter_mut() {
            let outcome = self.benchmark_runner(runner.as_mut(), corpus).await;
            outcomes.push(outcome);
        }

        let failures = outcomes.iter().filter(|o| o.error.is_some()).count();
        self.finish_phase(phase, failures);
        outcomes
    }

    /// Analyze every runner concurrently; each failure is isolated
    pub async fn analyze(&self, registry: &mut RunnerRegistry) -> Vec<AnalyzeOutcome> {
        let phase = Phase::Analyze;
        self.start_phase(phase);

        let tasks = registry.iter_mut().map(|runner| async move {
            let title = runner.title();
            self.start_task(phase, &title);

            let error = runner.analyze().await.err();
            self.finish_task(phase, &title, error.as_ref());

            AnalyzeOutcome {
                runner: title,
                error,
            }
        });

        let outcomes = join_all(tasks).await;
        let failures = outcomes.iter().filter(|o| o.error.is_some()).count();
        self.finish_phase(phase, failures);
        outcomes
    }

    async fn initialize_runner(&self, runner: &mut dyn BenchmarkRunner) -> AppResult<()> {
        let artifact_dir = self
            .store
            .ensure_runner_dir(runner.language(), runner.description())
            .await?;

        runner
            .initialize(RunnerConfig {
                min_iterations: self.bounds.min_iterations,
                max_time: self.bounds.max_time,
                artifact_dir,
            })
            .await
    }

    async fn benchmark_runner(
        &self,
        runner: &mut dyn BenchmarkRunner,
        corpus: &SampleCorpus,
    ) -> BenchmarkOutcome {
        let title = runner.title();
        let total = corpus.len();
        self.start_task(Phase::Benchmark, &title);

        let mut completed = 0;
        let mut error = None;

        for sample in corpus.samples() {
            match self.benchmark_sample(runner, sample).await {
                Ok(()) => {
                    completed += 1;
                    tracing::debug!(runner = %title, sample = %sample.friendly_name, "Sample complete");
                    self.progress.emit(ProgressEvent::SampleCompleted {
                        runner: title.clone(),
                        sample: sample.friendly_name.clone(),
                        completed,
                        total,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        runner = %title,
                        sample = %sample.friendly_name,
                        skipped = total - completed - 1,
                        "Sample failed, skipping the rest"
                    );
                    error = Some(e);
                    break;
                }
            }
        }

        self.finish_task(Phase::Benchmark, &title, error.as_ref());
        BenchmarkOutcome {
            runner: title,
            completed_samples: completed,
            error,
        }
    }

    async fn benchmark_sample(
        &self,
        runner: &mut dyn BenchmarkRunner,
        sample: &Sample,
    ) -> AppResult<()> {
        let result = runner.benchmark(sample).await?;
        self.store
            .persist(runner.language(), runner.description(), sample, result)
            .await?;
        Ok(())
    }

    fn start_phase(&self, phase: Phase) {
        tracing::info!(%phase, "Phase started");
        self.progress.emit(ProgressEvent::PhaseStarted { phase });
    }

    fn finish_phase(&self, phase: Phase, failures: usize) {
        if failures == 0 {
            tracing::info!(%phase, "Phase finished");
        } else {
            tracing::warn!(%phase, failures, "Phase finished with failures");
        }
        self.progress.emit(ProgressEvent::PhaseFinished { phase, failures });
    }

    fn start_task(&self, phase: Phase, runner: &str) {
        tracing::debug!(%phase, runner, "Task started");
        self.progress.emit(ProgressEvent::TaskStarted {
            phase,
            runner: runner.to_string(),
        });
    }

    fn finish_task(&self, phase: Phase, runner: &str, error: Option<&AppError>) {
        let event = match error {
            None => ProgressEvent::TaskSucceeded {
                phase,
                runner: runner.to_string(),
            },
            Some(e) => {
                tracing::error!(%phase, runner, code = e.error_code(), "Task failed: {}", e);
                ProgressEvent::TaskFailed {
                    phase,
                    runner: runner.to_string(),
                    error: e.to_string(),
                }
            }
        };
        self.progress.emit(event);
    }
}
