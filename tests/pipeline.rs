//! End-to-end pipeline run against a fake `node`
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use shootout::{
    benchmark::{
        command::ToolCommand, languages::NodeRunner, ArtifactStore, Phase, PhaseScheduler,
        ProgressEvent, ProgressSender, RunnerRegistry, SampleCorpus,
    },
    config::BenchmarkConfig,
    constants::{DOCUMENT_FILE, TIMES_FILE},
    AppError,
};

/// Stands in for `node --prof` and `node --prof-process`
const FAKE_NODE: &str = r#"
case "$1" in
  --prof)
    printf 'code-creation,LazyCompile,0,0x1,10,render,C:\\src\\%s.js,0x2,~\n' "$(basename "$2" .js)" > "isolate-0x$$-v8.log"
    if [ -n "$FAKE_SAMPLER_FAIL" ]; then echo "boom" >&2; exit 1; fi
    echo "{\"times\":[3.25],\"document\":\"<p>$(basename "$3")</p>\"}"
    ;;
  --prof-process)
    if [ -n "$FAKE_REPORT_FAIL" ]; then echo "cannot parse" >&2; exit 2; fi
    echo "ticks for $3"
    ;;
esac
"#;

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
    script: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        for sub in ["samples", "cwd", "output"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        for sample in ["README.md", "CHANGELOG.md"] {
            std::fs::write(root.join("samples").join(sample), "# Title\n").unwrap();
        }
        let script = root.join("fake-node.sh");
        std::fs::write(&script, FAKE_NODE).unwrap();

        Self {
            _dir: dir,
            root,
            script,
        }
    }

    fn runner(&self, description: &str, envs: &[&str]) -> NodeRunner {
        let mut args: Vec<String> = envs.iter().map(|e| e.to_string()).collect();
        args.push("sh".to_string());
        args.push(self.script.display().to_string());

        NodeRunner::new(
            description,
            "1.0.0",
            format!("{description}.js"),
            ToolCommand::new("env").with_leading_args(args),
            self.root.join("cwd"),
        )
    }

    fn output(&self) -> PathBuf {
        self.root.join("output")
    }
}

fn reports_under(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            found.extend(reports_under(&path));
        } else if path.extension().is_some_and(|e| e == "txt") {
            found.push(path);
        }
    }
    found
}

#[tokio::test]
async fn test_report_failure_is_isolated_and_fails_run() {
    let ws = Workspace::new();

    let mut registry = RunnerRegistry::new();
    registry
        .register(Box::new(ws.runner("alpha", &["FAKE_REPORT_FAIL=1"])))
        .unwrap();
    registry.register(Box::new(ws.runner("beta", &[]))).unwrap();

    let corpus = SampleCorpus::load(&ws.root.join("samples"), &["README.md", "CHANGELOG.md"])
        .await
        .unwrap();

    let store = ArtifactStore::new(ws.output());
    let (progress, mut rx) = ProgressSender::channel();
    let scheduler = PhaseScheduler::new(
        store.clone(),
        BenchmarkConfig {
            min_iterations: 1,
            max_time: Duration::from_secs(1),
        },
    )
    .with_progress(progress);

    let summary = scheduler.run(&mut registry, &corpus).await.unwrap();

    // Every sample was benchmarked and persisted for both runners
    for outcome in &summary.benchmark {
        assert!(outcome.error.is_none(), "{:?}", outcome.error);
        assert_eq!(outcome.completed_samples, 2);
    }
    for description in ["alpha", "beta"] {
        for sample in corpus.samples() {
            let dir = store.sample_dir("javascript", description, sample).unwrap();
            let times = std::fs::read_to_string(dir.join(TIMES_FILE)).unwrap();
            assert_eq!(times, "[3.25]");
            let document = std::fs::read_to_string(dir.join(DOCUMENT_FILE)).unwrap();
            assert_eq!(document, format!("<p>{}</p>", sample.friendly_name));
        }
    }

    // alpha's report tool failed, beta's reports were still written
    assert!(!summary.is_success());
    let failures = summary.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Phase::Analyze);
    assert_eq!(failures[0].1, "alpha (1.0.0) [javascript]");
    assert!(matches!(failures[0].2, AppError::ReportTool { .. }));

    let beta_reports = reports_under(&ws.output().join("javascript").join("beta"));
    assert_eq!(beta_reports.len(), 2);
    for report in beta_reports {
        let text = std::fs::read_to_string(&report).unwrap();
        assert!(text.starts_with("ticks for "));
        assert!(text.trim_end().ends_with(".fixed.log"));
    }

    // Normalized traces carry forward slashes only
    let fixed = std::fs::read_dir(store.sample_dir("javascript", "beta", &corpus.samples()[0]).unwrap())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.to_string_lossy().ends_with(".fixed.log"))
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(fixed).unwrap(),
        "code-creation,LazyCompile,0,0x1,10,render,C:/src/beta.js,0x2,~\n"
    );

    // Trace directory is left clean
    assert_eq!(std::fs::read_dir(ws.root.join("cwd")).unwrap().count(), 0);

    drop(scheduler);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert!(events.contains(&ProgressEvent::TaskFailed {
        phase: Phase::Analyze,
        runner: "alpha (1.0.0) [javascript]".to_string(),
        error: failures[0].2.to_string(),
    }));
    let completed = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::SampleCompleted { .. }))
        .count();
    assert_eq!(completed, 4);
}

#[tokio::test]
async fn test_sampler_crash_does_not_block_later_runners() {
    let ws = Workspace::new();

    let mut registry = RunnerRegistry::new();
    registry
        .register(Box::new(ws.runner("alpha", &["FAKE_SAMPLER_FAIL=1"])))
        .unwrap();
    registry.register(Box::new(ws.runner("beta", &[]))).unwrap();

    let corpus = SampleCorpus::load(&ws.root.join("samples"), &["README.md", "CHANGELOG.md"])
        .await
        .unwrap();
    let store = ArtifactStore::new(ws.output());
    let scheduler = PhaseScheduler::new(
        store.clone(),
        BenchmarkConfig {
            min_iterations: 1,
            max_time: Duration::from_secs(1),
        },
    );

    let summary = scheduler.run(&mut registry, &corpus).await.unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.benchmark[0].completed_samples, 0);
    assert!(matches!(summary.benchmark[0].error, Some(AppError::Sampler(_))));
    assert_eq!(summary.benchmark[1].completed_samples, 2);
    assert!(summary.benchmark[1].error.is_none());
    assert!(summary.analyze.iter().all(|o| o.error.is_none()));

    for sample in corpus.samples() {
        let dir = store.sample_dir("javascript", "beta", sample).unwrap();
        assert!(dir.join(TIMES_FILE).is_file());
    }
    assert_eq!(reports_under(&ws.output().join("javascript").join("beta")).len(), 2);
    assert_eq!(std::fs::read_dir(ws.root.join("cwd")).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_sample_is_rejected_before_running() {
    let ws = Workspace::new();

    let err = SampleCorpus::load(&ws.root.join("samples"), &["README.md", "missing.md"])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Configuration(_)));
}
