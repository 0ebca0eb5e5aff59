//! Sample corpus

use std::collections::HashSet;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::Sample,
};

/// Fixed, ordered, read-only set of samples
#[derive(Debug, Clone)]
pub struct SampleCorpus {
    samples: Vec<Sample>,
}

impl SampleCorpus {
    /// Build the corpus from file names inside `dir`, keeping their order.
    ///
    /// Duplicate names are rejected since they would share an artifact directory.
    pub fn from_names<S: AsRef<str>>(dir: &Path, names: &[S]) -> AppResult<Self> {
        let mut seen = HashSet::new();
        let mut samples = Vec::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(AppError::Configuration(format!(
                    "Duplicate sample: {}",
                    name
                )));
            }
            samples.push(Sample::new(dir, name));
        }

        Ok(Self { samples })
    }

    /// Like [`SampleCorpus::from_names`], but every sample file must exist
    pub async fn load<S: AsRef<str>>(dir: &Path, names: &[S]) -> AppResult<Self> {
        let corpus = Self::from_names(dir, names)?;

        for sample in &corpus.samples {
            let is_file = tokio::fs::metadata(&sample.path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                return Err(AppError::Configuration(format!(
                    "Sample not found: {}",
                    sample.path.display()
                )));
            }
        }

        tracing::debug!(samples = corpus.samples.len(), dir = %dir.display(), "Loaded sample corpus");
        Ok(corpus)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
