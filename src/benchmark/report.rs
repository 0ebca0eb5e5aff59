//! Trace report tool
//!
//! Turns a normalized trace into a human-readable profile by shelling out to
//! `node --prof-process`. The report is written once; an existing report is
//! never overwritten.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use tokio::fs::OpenOptions;

use crate::error::{AppError, AppResult};

use super::command::ToolCommand;

/// Host platform as understood by the report tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Mac,
    Windows,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Self::Unix => "--unix",
            Self::Mac => "--mac",
            Self::Windows => "--windows",
        }
    }
}

/// External trace post-processor
#[derive(Debug, Clone)]
pub struct ReportTool {
    command: ToolCommand,
    platform: Platform,
}

impl ReportTool {
    /// `node --prof-process <platform flag> <trace>`
    pub fn node(node: ToolCommand, platform: Platform) -> Self {
        Self {
            command: node.with_leading_args(["--prof-process"]),
            platform,
        }
    }

    /// Process `trace` and write the tool's combined stdout/stderr to `report`.
    ///
    /// Fails with [`AppError::DuplicateOutput`] if `report` already exists and
    /// with [`AppError::ReportTool`] if the tool exits unsuccessfully. The
    /// report file is kept in the latter case so the tool's output can be read.
    pub async fn render(&self, trace: &Path, report: &Path) -> AppResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(report)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => AppError::DuplicateOutput {
                    path: report.to_path_buf(),
                },
                _ => AppError::Io(e),
            })?;

        let stdout = file.into_std().await;
        let stderr = stdout.try_clone()?;

        tracing::debug!(
            trace = %trace.display(),
            report = %report.display(),
            platform = self.platform.flag(),
            "Running report tool"
        );

        let status = self
            .command
            .command()
            .arg(self.platform.flag())
            .arg(trace)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .await?;

        if !status.success() {
            return Err(AppError::ReportTool {
                trace: trace.to_path_buf(),
                status: status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "terminated by signal".to_string()),
            });
        }

        Ok(())
    }
}
