//! JavaScript runners, driven through `node --prof`
//!
//! Each implementation has a script `runners/javascript/{package}.js` that
//! samples the transform over the file given as its only argument and prints
//! `{"times": [...], "document": "..."}`. With `--prof` Node also drops an
//! `isolate-<address>-v8.log` into its working directory; that log is moved
//! next to the sample's other artifacts and post-processed during analysis.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use serde::Deserialize;
use tokio::fs;

use crate::{
    benchmark::{
        command::ToolCommand,
        report::{Platform, ReportTool},
        runner::BenchmarkRunner,
        trace::TraceNormalizer,
    },
    config::Config,
    constants::{
        languages, NORMALIZED_TRACE_EXTENSION, REPORT_EXTENSION, SAMPLER_MAX_TIME_ENV,
        SAMPLER_MIN_ITERATIONS_ENV,
    },
    error::{AppError, AppResult},
    models::{BenchmarkResult, RunnerConfig, Sample},
};

static V8_LOG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^isolate-.*-v8\.log$").expect("valid v8 log pattern"));

const UNKNOWN_VERSION: &str = "unknown";

/// An npm package with a benchmark script
#[derive(Debug, Clone, Copy)]
pub struct NodePackage {
    pub package_name: &'static str,
    pub friendly_name: Option<&'static str>,
}

impl NodePackage {
    pub fn description(&self) -> &'static str {
        self.friendly_name.unwrap_or(self.package_name)
    }
}

/// Implementations benchmarked on Node, in benchmark order
pub const NODE_PACKAGES: &[NodePackage] = &[
    NodePackage { package_name: "commonmark", friendly_name: None },
    NodePackage { package_name: "markdown-it", friendly_name: None },
    NodePackage { package_name: "markdown", friendly_name: Some("markdown-js") },
    NodePackage { package_name: "markdowndeep", friendly_name: None },
    NodePackage { package_name: "marked", friendly_name: None },
    NodePackage { package_name: "remark", friendly_name: None },
    NodePackage { package_name: "showdown", friendly_name: None },
];

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: HashMap<String, String>,
}

/// Build one runner per entry of [`NODE_PACKAGES`].
///
/// Versions come from `runners/javascript/package.json`.
pub async fn runners(config: &Config) -> AppResult<Vec<NodeRunner>> {
    let scripts_dir = config.storage.runners_dir.join(languages::JAVASCRIPT);
    let versions = read_dependency_versions(&scripts_dir.join("package.json")).await?;
    let node = ToolCommand::new(&config.node.binary);

    let runners = NODE_PACKAGES
        .iter()
        .map(|pkg| {
            let version = versions.get(pkg.package_name).cloned().unwrap_or_else(|| {
                tracing::warn!(package = pkg.package_name, "No version in package.json");
                UNKNOWN_VERSION.to_string()
            });

            NodeRunner::new(
                pkg.description(),
                version,
                scripts_dir.join(format!("{}.js", pkg.package_name)),
                node.clone(),
                &config.node.trace_dir,
            )
        })
        .collect();

    Ok(runners)
}

async fn read_dependency_versions(manifest: &Path) -> AppResult<HashMap<String, String>> {
    let raw = fs::read_to_string(manifest).await.map_err(|e| {
        AppError::Configuration(format!("Cannot read {}: {}", manifest.display(), e))
    })?;
    let manifest: PackageManifest = serde_json::from_str(&raw)?;
    Ok(manifest.dependencies)
}

/// Runner for one JavaScript implementation
#[derive(Debug)]
pub struct NodeRunner {
    description: String,
    version: String,
    script: PathBuf,
    node: ToolCommand,
    trace_dir: PathBuf,
    report_tool: ReportTool,
    normalizer: TraceNormalizer,
    config: Option<RunnerConfig>,
    /// Trace logs collected so far, already moved into the artifact tree
    traces: Vec<PathBuf>,
}

impl NodeRunner {
    pub fn new(
        description: impl Into<String>,
        version: impl Into<String>,
        script: impl Into<PathBuf>,
        node: ToolCommand,
        trace_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            description: description.into(),
            version: version.into(),
            script: script.into(),
            report_tool: ReportTool::node(node.clone(), Platform::current()),
            node,
            trace_dir: trace_dir.into(),
            normalizer: TraceNormalizer::v8(),
            config: None,
            traces: Vec::new(),
        }
    }

    /// Trace logs collected by `benchmark`
    pub fn traces(&self) -> &[PathBuf] {
        &self.traces
    }

    async fn run_sampler(&self, config: &RunnerConfig, sample: &Sample) -> AppResult<BenchmarkResult> {
        let output = self
            .node
            .command()
            .arg("--prof")
            .arg(&self.script)
            .arg(&sample.path)
            .current_dir(&self.trace_dir)
            .env(SAMPLER_MIN_ITERATIONS_ENV, config.min_iterations.to_string())
            .env(SAMPLER_MAX_TIME_ENV, config.max_time.as_secs_f64().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                AppError::Sampler(format!(
                    "failed to start {}: {}",
                    self.node.program().display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Sampler(format!(
                "{} exited with {}: {}",
                self.script.display(),
                output.status,
                stderr.chars().take(500).collect::<String>()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        BenchmarkResult::from_sampler_output(&stdout)
            .map_err(|e| AppError::Sampler(format!("unparseable sampler output: {}", e)))
    }

    /// Attribute the single log found after a run to `sample` and move it
    /// into the sample's artifact directory
    async fn collect_trace(
        &self,
        config: &RunnerConfig,
        sample: &Sample,
        found: &[PathBuf],
    ) -> AppResult<PathBuf> {
        let trace = match found {
            [] => {
                return Err(AppError::TraceMissing {
                    dir: self.trace_dir.clone(),
                })
            }
            [trace] => trace,
            _ => {
                return Err(AppError::TraceCollision {
                    dir: self.trace_dir.clone(),
                    count: found.len(),
                })
            }
        };

        let Some(name) = trace.file_name() else {
            return Err(AppError::TraceMissing {
                dir: self.trace_dir.clone(),
            });
        };
        let dest_dir = config.artifact_dir.join(&sample.id);
        fs::create_dir_all(&dest_dir).await?;
        let dest = dest_dir.join(name);
        move_file(trace, &dest).await?;

        Ok(dest)
    }

    /// Normalize one trace and render its report next to it
    async fn process_trace(&self, trace: &Path) -> AppResult<()> {
        let fixed = trace.with_extension(NORMALIZED_TRACE_EXTENSION);
        self.normalizer.normalize_file(trace, &fixed).await?;

        let report = trace.with_extension(REPORT_EXTENSION);
        self.report_tool.render(&fixed, &report).await?;

        tracing::debug!(report = %report.display(), "Wrote profile report");
        Ok(())
    }
}

#[async_trait]
impl BenchmarkRunner for NodeRunner {
    fn language(&self) -> &str {
        languages::JAVASCRIPT
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn initialize(&mut self, config: RunnerConfig) -> AppResult<()> {
        fs::create_dir_all(&config.artifact_dir).await?;
        self.config = Some(config);
        Ok(())
    }

    async fn benchmark(&mut self, sample: &Sample) -> AppResult<BenchmarkResult> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| AppError::NotInitialized(self.title()))?;

        let stray = find_traces(&self.trace_dir).await?;
        if !stray.is_empty() {
            tracing::warn!(
                dir = %self.trace_dir.display(),
                count = stray.len(),
                "Trace logs left over from an earlier run; this sample will not be attributable"
            );
        }

        let sampled = self.run_sampler(&config, sample).await;
        let found = find_traces(&self.trace_dir).await?;

        let collected = match sampled {
            Ok(result) => self
                .collect_trace(&config, sample, &found)
                .await
                .map(|trace| (result, trace)),
            Err(e) => Err(e),
        };

        match collected {
            Ok((result, trace)) => {
                tracing::debug!(sample = %sample.friendly_name, trace = %trace.display(), "Collected trace");
                self.traces.push(trace);
                Ok(result)
            }
            Err(e) => {
                discard_new_traces(&stray, &found).await;
                Err(e)
            }
        }
    }

    /// Every trace is processed to completion even when a sibling fails;
    /// the first failure is returned and the rest are logged.
    async fn analyze(&mut self) -> AppResult<()> {
        let this = &*self;
        let results = join_all(this.traces.iter().map(|t| this.process_trace(t))).await;

        let mut errors = results.into_iter().filter_map(Result::err);
        let first = errors.next();
        for other in errors {
            tracing::error!(runner = %this.title(), code = other.error_code(), "Trace analysis failed: {}", other);
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// V8 logs currently sitting in `dir`, sorted by name
async fn find_traces(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let is_log = entry
            .file_name()
            .to_str()
            .map(|name| V8_LOG_NAME.is_match(name))
            .unwrap_or(false);
        if is_log && entry.file_type().await?.is_file() {
            found.push(entry.path());
        }
    }

    found.sort();
    Ok(found)
}

/// Remove logs that showed up during a failed execution.
///
/// Logs already present before the run are left alone.
async fn discard_new_traces(before: &[PathBuf], after: &[PathBuf]) {
    for trace in after.iter().filter(|t| !before.contains(t)) {
        match fs::remove_file(trace).await {
            Ok(()) => tracing::warn!(trace = %trace.display(), "Discarded trace of failed sample"),
            Err(e) => tracing::warn!(
                trace = %trace.display(),
                error = %e,
                "Failed to discard trace of failed sample"
            ),
        }
    }
}

async fn move_file(src: &Path, dest: &Path) -> AppResult<()> {
    if let Err(e) = fs::rename(src, dest).await {
        if e.kind() != ErrorKind::CrossesDevices {
            return Err(e.into());
        }
        fs::copy(src, dest).await?;
        fs::remove_file(src).await?;
    }
    Ok(())
}
