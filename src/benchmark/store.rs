//! Artifact store - directory layout for benchmark output
//!
//! ```text
//! {output}/{language}/{description}/{sample id}/times.json
//! {output}/{language}/{description}/{sample id}/output.html
//! ```
//!
//! Runners drop their own trace and report files into the same sample
//! directory. Every path component is validated so that distinct
//! (runner, sample) pairs can never resolve to the same directory.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    constants::{DOCUMENT_FILE, TIMES_FILE},
    error::{AppError, AppResult},
    models::{BenchmarkResult, Sample},
};

/// Naming convention and writer for the artifact tree
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{output}/{language}/{description}`
    pub fn runner_dir(&self, language: &str, description: &str) -> AppResult<PathBuf> {
        Ok(self
            .root
            .join(validate_component(language)?)
            .join(validate_component(description)?))
    }

    /// `{output}/{language}/{description}/{sample id}`
    pub fn sample_dir(
        &self,
        language: &str,
        description: &str,
        sample: &Sample,
    ) -> AppResult<PathBuf> {
        Ok(self
            .runner_dir(language, description)?
            .join(validate_component(&sample.id)?))
    }

    /// Create the runner's directory if needed and return it
    pub async fn ensure_runner_dir(&self, language: &str, description: &str) -> AppResult<PathBuf> {
        let dir = self.runner_dir(language, description)?;
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Write `times.json` and `output.html` for one (runner, sample) pair.
    ///
    /// Takes ownership of the result; nothing else keeps it once persisted.
    pub async fn persist(
        &self,
        language: &str,
        description: &str,
        sample: &Sample,
        result: BenchmarkResult,
    ) -> AppResult<PathBuf> {
        let dir = self.sample_dir(language, description, sample)?;
        fs::create_dir_all(&dir).await?;

        let times = serde_json::to_vec(&result.times)?;
        tokio::try_join!(
            fs::write(dir.join(TIMES_FILE), times),
            fs::write(dir.join(DOCUMENT_FILE), result.document.as_bytes()),
        )?;

        tracing::debug!(
            dir = %dir.display(),
            samples = result.times.len(),
            "Persisted benchmark artifacts"
        );

        Ok(dir)
    }
}

fn validate_component(component: &str) -> AppResult<&str> {
    let invalid = component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\']);

    if invalid {
        return Err(AppError::InvalidArtifactKey(component.to_string()));
    }
    Ok(component)
}
