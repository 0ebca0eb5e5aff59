//! Sample models

use std::path::{Path, PathBuf};

use crate::utils::hash_string;

/// A fixed input document benchmarked against every runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Content hash of `friendly_name`; names the sample's artifact directory
    pub id: String,
    pub friendly_name: String,
    pub path: PathBuf,
}

impl Sample {
    /// Create a sample named `name` located in `dir`
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            id: hash_string(name),
            friendly_name: name.to_string(),
            path: dir.join(name),
        }
    }
}
