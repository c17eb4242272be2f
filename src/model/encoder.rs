//! Categorical feature encoding
//!
//! One-hot encodes the four categorical columns and passes Experience
//! through as-is, producing the dense matrix the forest consumes. A
//! category never seen during fitting encodes as an all-zero block rather
//! than an error; this keeps prediction robust to novel inputs at the cost
//! of a degraded encoding for them.

use crate::data::{EmployeeFeatures, CATEGORICAL_COLUMNS, EXPERIENCE_COLUMN};
use crate::error::{Result, SalaryError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Fitted category table for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnMapping {
    column: String,
    /// Categories in sorted order; position = one-hot slot
    categories: Vec<String>,
    /// category -> position, rebuilt from `categories` semantics but
    /// persisted directly to keep load cheap
    index: HashMap<String, usize>,
}

impl ColumnMapping {
    fn from_sorted(column: &str, categories: Vec<String>) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            column: column.to_string(),
            categories,
            index,
        }
    }
}

/// One-hot encoder over the categorical feature columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    mappings: Vec<ColumnMapping>,
    is_fitted: bool,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit category tables from a feature dataframe.
    ///
    /// Categories are recorded in sorted order so the feature layout is
    /// stable across runs on the same data.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.mappings = CATEGORICAL_COLUMNS
            .iter()
            .map(|&col| {
                let ca = crate::data::required_column(df, col)?
                    .str()
                    .map_err(|e| SalaryError::DataError(e.to_string()))?;
                let unique: BTreeSet<&str> = ca.into_iter().flatten().collect();
                let categories: Vec<String> = unique.into_iter().map(String::from).collect();
                Ok(ColumnMapping::from_sorted(col, categories))
            })
            .collect::<Result<_>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Total encoded width: one slot per known category plus Experience
    pub fn n_features(&self) -> usize {
        self.mappings.iter().map(|m| m.categories.len()).sum::<usize>() + 1
    }

    /// Encoded column names, in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .mappings
            .iter()
            .flat_map(|m| {
                m.categories
                    .iter()
                    .map(move |c| format!("{}_{}", m.column, c))
            })
            .collect();
        names.push(EXPERIENCE_COLUMN.to_string());
        names
    }

    /// Encode a feature dataframe into the forest's input matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(SalaryError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut x = Array2::zeros((n_rows, self.n_features()));

        let mut offset = 0usize;
        for mapping in &self.mappings {
            let ca = crate::data::required_column(df, &mapping.column)?
                .str()
                .map_err(|e| SalaryError::DataError(e.to_string()))?;

            for (row, value) in ca.into_iter().enumerate() {
                // Unknown or missing category: leave the block all-zero
                if let Some(slot) = value.and_then(|v| mapping.index.get(v)) {
                    x[[row, offset + slot]] = 1.0;
                }
            }
            offset += mapping.categories.len();
        }

        let experience = crate::data::required_column(df, EXPERIENCE_COLUMN)?
            .cast(&DataType::Float64)?;
        let experience = experience
            .f64()
            .map_err(|e| SalaryError::DataError(e.to_string()))?;
        for (row, value) in experience.into_iter().enumerate() {
            x[[row, offset]] = value.unwrap_or(0.0);
        }

        Ok(x)
    }

    /// Encode a single employee input as a 1-row matrix
    pub fn transform_row(&self, input: &EmployeeFeatures) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(SalaryError::ModelNotFitted);
        }

        let mut x = Array2::zeros((1, self.n_features()));

        let mut offset = 0usize;
        for mapping in &self.mappings {
            let value = input.categorical(&mapping.column)?;
            if let Some(slot) = mapping.index.get(value) {
                x[[0, offset + slot]] = 1.0;
            }
            offset += mapping.categories.len();
        }
        x[[0, offset]] = input.experience as f64;

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_df() -> DataFrame {
        df!(
            "Education" => &["Bachelors", "Masters", "Bachelors"],
            "Experience" => &[3i64, 8, 1],
            "Role" => &["Engineer", "Analyst", "Engineer"],
            "Department" => &["IT", "Finance", "IT"],
            "Location" => &["Pune", "Mumbai", "Pune"],
        )
        .unwrap()
    }

    #[test]
    fn test_width_counts_categories_plus_experience() {
        let df = feature_df();
        let mut encoder = FeatureEncoder::new();
        encoder.fit(&df).unwrap();

        // 2 educations + 2 roles + 2 departments + 2 locations + experience
        assert_eq!(encoder.n_features(), 9);
        assert_eq!(encoder.feature_names().len(), 9);
        assert_eq!(encoder.feature_names().last().unwrap(), "Experience");
    }

    #[test]
    fn test_transform_one_hot_rows() {
        let df = feature_df();
        let mut encoder = FeatureEncoder::new();
        encoder.fit(&df).unwrap();

        let x = encoder.transform(&df).unwrap();
        assert_eq!(x.nrows(), 3);

        // Every row sets exactly one slot per categorical column
        for row in 0..3 {
            let one_hot_sum: f64 = x.row(row).iter().take(8).sum();
            assert_eq!(one_hot_sum, 4.0);
        }
        // Experience passes through numerically
        assert_eq!(x[[0, 8]], 3.0);
        assert_eq!(x[[1, 8]], 8.0);
    }

    #[test]
    fn test_unknown_category_encodes_all_zero() {
        let df = feature_df();
        let mut encoder = FeatureEncoder::new();
        encoder.fit(&df).unwrap();

        let input = EmployeeFeatures {
            education: "Bootcamp".to_string(), // never seen
            experience: 5,
            role: "Engineer".to_string(),
            department: "IT".to_string(),
            location: "Pune".to_string(),
        };
        let x = encoder.transform_row(&input).unwrap();

        // Education block (first two slots) stays zero, the rest encode
        assert_eq!(x[[0, 0]], 0.0);
        assert_eq!(x[[0, 1]], 0.0);
        let one_hot_sum: f64 = x.row(0).iter().take(8).sum();
        assert_eq!(one_hot_sum, 3.0);
        assert_eq!(x[[0, 8]], 5.0);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let encoder = FeatureEncoder::new();
        assert!(matches!(
            encoder.transform(&feature_df()),
            Err(SalaryError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_serde_round_trip_keeps_layout() {
        let df = feature_df();
        let mut encoder = FeatureEncoder::new();
        encoder.fit(&df).unwrap();

        let json = serde_json::to_string(&encoder).unwrap();
        let restored: FeatureEncoder = serde_json::from_str(&json).unwrap();

        assert_eq!(encoder.feature_names(), restored.feature_names());
    }
}
