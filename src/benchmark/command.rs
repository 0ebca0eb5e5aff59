//! External tool invocation

use std::ffi::OsString;
use std::path::PathBuf;

use tokio::process::Command;

/// An executable plus the arguments that precede every invocation of it
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments inserted before the per-call arguments (e.g. a wrapper script)
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Fresh command; the child is killed if its handle is dropped
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).kill_on_drop(true);
        cmd
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}
