//! Evaluation metric for the trained predictor

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metric record persisted alongside the predictor.
///
/// `r2` is the coefficient of determination on the held-out split;
/// `n_rows` is the row count of the full dataset the run trained on.
/// Computed once per training run and read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub r2: f64,
    pub n_rows: usize,
}

/// Coefficient of determination.
///
/// 1.0 is a perfect fit; values go negative when the predictor is worse
/// than a constant-mean baseline. A zero-variance target scores 0.0.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let y_mean: f64 = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}
