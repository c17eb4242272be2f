//! Model provider: encoding, training, evaluation, and the artifact cache

mod config;
mod encoder;
mod forest;
mod metrics;
mod provider;
mod split;
pub mod tree;

pub use config::ModelConfig;
pub use encoder::FeatureEncoder;
pub use forest::RandomForestRegressor;
pub use metrics::{r2_score, MetricRecord};
pub use provider::{ModelProvider, SalaryPredictor, TrainedArtifacts};
pub use split::{train_test_split, SplitIndices};
