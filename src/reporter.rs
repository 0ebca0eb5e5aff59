//! Console reporter
//!
//! Renders progress events and the final run summary on stdout. Logs go to
//! stderr through `tracing`, so the two never interleave on one stream.

use colored::Colorize;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::benchmark::{Phase, ProgressEvent, RunSummary};

const BANNER: &str = r"
     _                 _              _
 ___| |__   ___   ___ | |_ ___  _   _| |_
/ __| '_ \ / _ \ / _ \| __/ _ \| | | | __|
\__ \ | | | (_) | (_) | || (_) | |_| | |_
|___/_| |_|\___/ \___/ \__\___/ \__,_|\__|
";

/// Startup banner with the build version
pub fn banner() -> String {
    format!(
        "{}\n{}\n",
        BANNER.red().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).red()
    )
}

/// Print every event until the sending side is dropped
pub fn spawn(mut rx: UnboundedReceiver<ProgressEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = render(&event) {
                println!("{}", line);
            }
        }
    })
}

/// One console line for an event; `None` for events not worth a line
pub fn render(event: &ProgressEvent) -> Option<String> {
    let line = match event {
        ProgressEvent::PhaseStarted { phase } => {
            format!("{} {}", "==>".blue().bold(), phase.to_string().bold())
        }
        ProgressEvent::TaskStarted { phase, runner } => match phase {
            Phase::Benchmark => format!("  {} {}", "-".dimmed(), runner),
            _ => return None,
        },
        ProgressEvent::SampleCompleted {
            sample,
            completed,
            total,
            ..
        } => format!("    [{}/{}] {}", completed, total, sample.dimmed()),
        ProgressEvent::TaskSucceeded { phase, runner } => {
            format!("  {} {} {}", "ok".green(), runner, format!("({phase})").dimmed())
        }
        ProgressEvent::TaskFailed {
            phase,
            runner,
            error,
        } => format!(
            "  {} {} {}: {}",
            "FAILED".red().bold(),
            runner,
            format!("({phase})").dimmed(),
            error
        ),
        ProgressEvent::PhaseFinished { failures: 0, .. } => return None,
        ProgressEvent::PhaseFinished { phase, failures } => format!(
            "{} {} finished with {} failure(s)",
            "==>".yellow().bold(),
            phase,
            failures
        ),
    };

    Some(line)
}

/// Multi-line summary of a finished run
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Summary".bold()));
    for outcome in &summary.benchmark {
        let status = match outcome.error {
            None => "ok".green(),
            Some(_) => "failed".red(),
        };
        out.push_str(&format!(
            "  {:<40} {} samples  {}\n",
            outcome.runner, outcome.completed_samples, status
        ));
    }

    let failures = summary.failures();
    if !failures.is_empty() {
        out.push_str(&format!("\n{}\n", "Failures".red().bold()));
        for (phase, runner, error) in failures {
            out.push_str(&format!("  [{}] {}: {}\n", phase, runner, error));
        }
    }

    out
}
