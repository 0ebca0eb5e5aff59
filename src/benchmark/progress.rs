//! Progress events streamed from the scheduler to a reporting layer
//!
//! Within the Benchmark phase each runner produces a stream of
//! `SampleCompleted` events terminated by exactly one `TaskSucceeded` or
//! `TaskFailed`. Sending never blocks the scheduler.

use std::fmt;

use tokio::sync::mpsc;

/// One of the three pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Benchmark,
    Analyze,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialize => "Initialize",
            Self::Benchmark => "Benchmark",
            Self::Analyze => "Analyze",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    PhaseStarted {
        phase: Phase,
    },
    TaskStarted {
        phase: Phase,
        runner: String,
    },
    /// Emitted after a sample's artifacts are persisted
    SampleCompleted {
        runner: String,
        sample: String,
        completed: usize,
        total: usize,
    },
    TaskSucceeded {
        phase: Phase,
        runner: String,
    },
    TaskFailed {
        phase: Phase,
        runner: String,
        error: String,
    },
    PhaseFinished {
        phase: Phase,
        failures: usize,
    },
}

/// Sending half of the progress channel
#[derive(Debug, Clone, Default)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
    /// Create a connected sender/receiver pair
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender nobody listens to
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // A reporter that went away must not stop the run
            let _ = tx.send(event);
        }
    }
}
