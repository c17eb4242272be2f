//! Model provider configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the model provider.
///
/// All paths are explicit so callers (and tests) can redirect the dataset
/// and the artifact cache to any location; there are no process-wide fixed
/// paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the employee dataset CSV
    pub data_path: PathBuf,

    /// Directory holding the three cached artifacts
    pub cache_dir: PathBuf,

    /// Number of trees in the forest
    pub n_estimators: usize,

    /// Maximum tree depth (None = unconstrained)
    pub max_depth: Option<usize>,

    /// Fraction of rows held out for evaluation
    pub test_split: f64,

    /// Random seed for the split and the forest
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("employee_data.csv"),
            cache_dir: PathBuf::from("model_artifacts"),
            n_estimators: 400,
            max_depth: None,
            test_split: 0.2,
            seed: 42,
        }
    }
}

impl ModelConfig {
    pub fn new(data_path: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_test_split(mut self, fraction: f64) -> Self {
        self.test_split = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Path of the serialized forest artifact
    pub fn model_path(&self) -> PathBuf {
        self.cache_dir.join("salary_model.json")
    }

    /// Path of the serialized encoder artifact
    pub fn encoder_path(&self) -> PathBuf {
        self.cache_dir.join("encoder.json")
    }

    /// Path of the metric record artifact
    pub fn metric_path(&self) -> PathBuf {
        self.cache_dir.join("metrics.json")
    }

    /// All three artifact paths, created and read together
    pub fn artifact_paths(&self) -> [PathBuf; 3] {
        [self.model_path(), self.encoder_path(), self.metric_path()]
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_training_contract() {
        let config = ModelConfig::default();
        assert_eq!(config.n_estimators, 400);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.test_split, 0.2);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_artifact_paths_share_cache_dir() {
        let config = ModelConfig::new("data.csv", "/tmp/cache");
        for path in config.artifact_paths() {
            assert_eq!(path.parent().unwrap(), Path::new("/tmp/cache"));
        }
    }
}
