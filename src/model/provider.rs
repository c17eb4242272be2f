//! Train-or-load model provider
//!
//! The provider owns the on-disk artifact cache. `train_or_load` returns a
//! ready predictor plus its evaluation metric on every call: from the cache
//! when all three artifacts are present and readable, otherwise by training
//! from the dataset and persisting fresh artifacts. Artifacts are written
//! via temp-file-and-rename and validated together on load, so a torn or
//! corrupt cache is retrained instead of trusted.

use super::config::ModelConfig;
use super::encoder::FeatureEncoder;
use super::forest::RandomForestRegressor;
use super::metrics::{r2_score, MetricRecord};
use super::split::train_test_split;
use crate::data::{self, EmployeeFeatures, TARGET_COLUMN};
use crate::error::{Result, SalaryError};
use ndarray::Array1;
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fitted encoder + forest, the unit that predicts a salary
#[derive(Debug, Clone)]
pub struct SalaryPredictor {
    forest: RandomForestRegressor,
    encoder: FeatureEncoder,
}

impl SalaryPredictor {
    /// Predict the salary for a single employee input.
    ///
    /// Unknown categorical values are allowed; they encode as all-zero
    /// blocks per the encoder's ignore-unknown policy.
    pub fn predict(&self, input: &EmployeeFeatures) -> Result<f64> {
        let x = self.encoder.transform_row(input)?;
        let predictions = self.forest.predict(&x)?;
        Ok(predictions[0])
    }

    /// The fitted encoding transform
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// The fitted forest
    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }
}

/// Everything a training run (or cache hit) yields
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub predictor: SalaryPredictor,
    pub metric: MetricRecord,
}

/// Loads, trains, and caches the salary model
#[derive(Debug, Clone)]
pub struct ModelProvider {
    config: ModelConfig,
}

impl ModelProvider {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Return the cached predictor, or train a fresh one.
    ///
    /// With `force` set, any cached artifacts are ignored and replaced.
    /// A cache hit performs no writes.
    pub fn train_or_load(&self, force: bool) -> Result<TrainedArtifacts> {
        if !force {
            if let Some(artifacts) = self.load_cached()? {
                info!(r2 = artifacts.metric.r2, "loaded cached salary model");
                return Ok(artifacts);
            }
        }
        self.train()
    }

    /// Train from the dataset and persist all three artifacts.
    pub fn train(&self) -> Result<TrainedArtifacts> {
        let df = data::load_dataset(&self.config.data_path)?;
        let n_rows = df.height();
        info!(n_rows, n_estimators = self.config.n_estimators, "training salary model");

        let y = salary_targets(&df)?;
        let features = df.drop(TARGET_COLUMN)?;

        let split = train_test_split(n_rows, self.config.test_split, self.config.seed)?;
        let train_df = take_rows(&features, &split.train)?;
        let test_df = take_rows(&features, &split.test)?;
        let y_train = select_targets(&y, &split.train);
        let y_test = select_targets(&y, &split.test);

        let mut encoder = FeatureEncoder::new();
        encoder.fit(&train_df)?;
        let x_train = encoder.transform(&train_df)?;
        let x_test = encoder.transform(&test_df)?;

        let mut forest =
            RandomForestRegressor::new(self.config.n_estimators).with_seed(self.config.seed);
        if let Some(depth) = self.config.max_depth {
            forest = forest.with_max_depth(depth);
        }
        forest.fit(&x_train, &y_train)?;

        let y_pred = forest.predict(&x_test)?;
        let metric = MetricRecord {
            r2: r2_score(&y_test, &y_pred),
            n_rows,
        };
        info!(r2 = metric.r2, "salary model trained");

        self.persist(&forest, &encoder, &metric)?;

        Ok(TrainedArtifacts {
            predictor: SalaryPredictor { forest, encoder },
            metric,
        })
    }

    /// Load the cache if, and only if, it is complete and readable.
    fn load_cached(&self) -> Result<Option<TrainedArtifacts>> {
        if !self.config.artifact_paths().iter().all(|p| p.exists()) {
            debug!("artifact cache incomplete, will train");
            return Ok(None);
        }

        let forest = read_artifact::<RandomForestRegressor>(&self.config.model_path());
        let encoder = read_artifact::<FeatureEncoder>(&self.config.encoder_path());
        let metric = read_artifact::<MetricRecord>(&self.config.metric_path());

        match (forest, encoder, metric) {
            (Ok(forest), Ok(encoder), Ok(metric)) => Ok(Some(TrainedArtifacts {
                predictor: SalaryPredictor { forest, encoder },
                metric,
            })),
            (forest, encoder, metric) => {
                for err in [forest.err(), encoder.err(), metric.err()].into_iter().flatten() {
                    warn!(error = %err, "cached artifact unreadable, retraining");
                }
                Ok(None)
            }
        }
    }

    fn persist(
        &self,
        forest: &RandomForestRegressor,
        encoder: &FeatureEncoder,
        metric: &MetricRecord,
    ) -> Result<()> {
        fs::create_dir_all(&self.config.cache_dir).map_err(|e| {
            SalaryError::PersistenceError(format!(
                "create {}: {}",
                self.config.cache_dir.display(),
                e
            ))
        })?;

        // Stage every artifact before replacing any, so a failed run
        // leaves the prior cache intact
        let staged = [
            stage_artifact(&self.config.model_path(), forest)?,
            stage_artifact(&self.config.encoder_path(), encoder)?,
            stage_artifact(&self.config.metric_path(), metric)?,
        ];
        for (_, path) in &staged {
            if path.is_dir() {
                return Err(SalaryError::PersistenceError(format!(
                    "artifact path {} is a directory",
                    path.display()
                )));
            }
        }
        for (tmp, path) in &staged {
            fs::rename(tmp, path).map_err(|e| {
                SalaryError::PersistenceError(format!("{}: {}", path.display(), e))
            })?;
        }
        debug!(cache_dir = %self.config.cache_dir.display(), "persisted artifacts");
        Ok(())
    }
}

// A null target here means the row filter was bypassed; refuse to train
// rather than fabricate a value
fn salary_targets(df: &DataFrame) -> Result<Array1<f64>> {
    let target = data::required_column(df, TARGET_COLUMN)?.cast(&DataType::Float64)?;
    let salary = target
        .f64()
        .map_err(|e| SalaryError::DataError(e.to_string()))?;
    if salary.null_count() > 0 {
        return Err(SalaryError::DataError(format!(
            "{} rows have a null {} value",
            salary.null_count(),
            TARGET_COLUMN
        )));
    }
    Ok(salary.into_no_null_iter().collect())
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: IdxCa = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    df.take(&idx)
        .map_err(|e| SalaryError::DataError(e.to_string()))
}

fn select_targets(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_vec(indices.iter().map(|&i| y[i]).collect())
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .map_err(|e| SalaryError::PersistenceError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        SalaryError::PersistenceError(format!("corrupt artifact {}: {}", path.display(), e))
    })
}

// Serialize to a temp sibling; the caller renames into place once every
// artifact of the run is staged
fn stage_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(PathBuf, PathBuf)> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .map_err(|e| SalaryError::PersistenceError(format!("{}: {}", tmp.display(), e)))?;
    Ok((tmp, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_sample_csv(dir: &Path, rows: usize) -> std::path::PathBuf {
        let path = dir.join("employee_data.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Education,Experience,Role,Department,Location,Salary").unwrap();
        for i in 0..rows {
            let education = ["Bachelors", "Masters", "PhD"][i % 3];
            let role = ["Engineer", "Analyst"][i % 2];
            let experience = i % 15;
            let salary = 20000 + 3000 * experience + 5000 * (i % 3) + 2000 * (i % 2);
            writeln!(
                file,
                "{},{},{},{},{},{}",
                education,
                experience,
                role,
                "IT",
                "Pune",
                salary
            )
            .unwrap();
        }
        path
    }

    fn small_provider(dir: &Path) -> ModelProvider {
        let data_path = write_sample_csv(dir, 60);
        let config = ModelConfig::new(data_path, dir.join("artifacts")).with_n_estimators(10);
        ModelProvider::new(config)
    }

    #[test]
    fn test_train_writes_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let provider = small_provider(dir.path());

        let artifacts = provider.train_or_load(true).unwrap();
        assert_eq!(artifacts.metric.n_rows, 60);
        for path in provider.config().artifact_paths() {
            assert!(path.exists(), "missing artifact {}", path.display());
        }
    }

    #[test]
    fn test_cache_hit_returns_same_metric() {
        let dir = tempfile::tempdir().unwrap();
        let provider = small_provider(dir.path());

        let trained = provider.train_or_load(true).unwrap();
        let cached = provider.train_or_load(false).unwrap();
        assert_eq!(trained.metric, cached.metric);
        assert_eq!(trained.metric.r2.to_bits(), cached.metric.r2.to_bits());
    }

    #[test]
    fn test_corrupt_metric_triggers_retrain() {
        let dir = tempfile::tempdir().unwrap();
        let provider = small_provider(dir.path());

        provider.train_or_load(true).unwrap();
        fs::write(provider.config().metric_path(), "{not json").unwrap();

        let artifacts = provider.train_or_load(false).unwrap();
        assert_eq!(artifacts.metric.n_rows, 60);
        // Cache was rewritten and is valid again
        let metric: MetricRecord = read_artifact(&provider.config().metric_path()).unwrap();
        assert_eq!(metric, artifacts.metric);
    }

    #[test]
    fn test_missing_artifact_triggers_retrain() {
        let dir = tempfile::tempdir().unwrap();
        let provider = small_provider(dir.path());

        provider.train_or_load(true).unwrap();
        fs::remove_file(provider.config().encoder_path()).unwrap();

        let artifacts = provider.train_or_load(false).unwrap();
        assert!(provider.config().encoder_path().exists());
        assert_eq!(artifacts.metric.n_rows, 60);
    }

    #[test]
    fn test_failed_persist_leaves_prior_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = write_sample_csv(dir.path(), 60);
        let cache = dir.path().join("artifacts");

        let first = ModelProvider::new(
            ModelConfig::new(&data_path, &cache).with_n_estimators(5),
        );
        first.train_or_load(true).unwrap();
        let model_before = fs::read(first.config().model_path()).unwrap();
        let metric_before = fs::read(first.config().metric_path()).unwrap();

        // Block the encoder artifact path with a non-empty directory so
        // the retrain cannot replace it
        fs::remove_file(first.config().encoder_path()).unwrap();
        fs::create_dir(first.config().encoder_path()).unwrap();
        fs::write(first.config().encoder_path().join("keep"), "x").unwrap();

        let second = ModelProvider::new(
            ModelConfig::new(&data_path, &cache).with_n_estimators(7),
        );
        assert!(matches!(
            second.train_or_load(true),
            Err(SalaryError::PersistenceError(_))
        ));

        assert_eq!(fs::read(second.config().model_path()).unwrap(), model_before);
        assert_eq!(fs::read(second.config().metric_path()).unwrap(), metric_before);
    }

    #[test]
    fn test_null_salary_target_refused() {
        let df = df!(
            "Education" => &["Bachelors", "Masters"],
            "Experience" => &[3i64, 5],
            "Role" => &["Engineer", "Analyst"],
            "Department" => &["IT", "Finance"],
            "Location" => &["Pune", "Mumbai"],
            "Salary" => &[Some(50000.0), None],
        )
        .unwrap();

        assert!(matches!(
            salary_targets(&df),
            Err(SalaryError::DataError(_))
        ));
    }

    #[test]
    fn test_missing_dataset_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig::new(dir.path().join("nope.csv"), dir.path().join("artifacts"));
        let provider = ModelProvider::new(config);

        assert!(matches!(
            provider.train_or_load(true),
            Err(SalaryError::DataError(_))
        ));
    }
}
