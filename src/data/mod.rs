//! Dataset loading and column schema
//!
//! The dataset is a row-oriented CSV with the columns
//! `Education, Experience, Role, Department, Location, Salary`.
//! Loading enforces the row-filtering invariant: rows with a missing
//! Salary or a non-integer-coercible Experience are dropped, not repaired.

use crate::error::{Result, SalaryError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

/// Target column (the value being predicted)
pub const TARGET_COLUMN: &str = "Salary";

/// The single numeric feature column
pub const EXPERIENCE_COLUMN: &str = "Experience";

/// Categorical feature columns, in schema order
pub const CATEGORICAL_COLUMNS: [&str; 4] = ["Education", "Role", "Department", "Location"];

/// A single employee input for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeFeatures {
    pub education: String,
    pub experience: i64,
    pub role: String,
    pub department: String,
    pub location: String,
}

impl EmployeeFeatures {
    /// Value of a categorical field by column name
    pub fn categorical(&self, column: &str) -> Result<&str> {
        match column {
            "Education" => Ok(&self.education),
            "Role" => Ok(&self.role),
            "Department" => Ok(&self.department),
            "Location" => Ok(&self.location),
            _ => Err(SalaryError::ColumnNotFound(column.to_string())),
        }
    }

    /// Key-value pairs for display and reporting, in schema order
    pub fn as_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("Education".to_string(), self.education.clone()),
            ("Experience".to_string(), self.experience.to_string()),
            ("Role".to_string(), self.role.clone()),
            ("Department".to_string(), self.department.clone()),
            ("Location".to_string(), self.location.clone()),
        ]
    }
}

/// Load the employee dataset from a CSV file.
///
/// Drops rows with a null Salary, coerces Experience to integer (dropping
/// rows where the coercion fails), and errors if the file is unreadable or
/// no rows survive filtering.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| SalaryError::DataError(format!("{}: {}", path.display(), e)))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| SalaryError::DataError(e.to_string()))?;

    clean_dataset(df)
}

/// Apply the row-filtering invariant to a raw dataframe.
pub fn clean_dataset(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;

    // Salary: numeric target, rows without it are useless
    let salary = required_column(&df, TARGET_COLUMN)?.cast(&DataType::Float64)?;
    df.with_column(salary)?;
    let mask = required_column(&df, TARGET_COLUMN)?.is_not_null();
    let mut df = df.filter(&mask)?;

    // Experience: integer years; non-strict cast turns bad values into nulls
    let experience = required_column(&df, EXPERIENCE_COLUMN)?.cast(&DataType::Int64)?;
    df.with_column(experience)?;
    let mask = required_column(&df, EXPERIENCE_COLUMN)?.is_not_null();
    let df = df.filter(&mask)?;

    for col in CATEGORICAL_COLUMNS {
        required_column(&df, col)?;
    }

    if df.height() == 0 {
        return Err(SalaryError::DataError(
            "no usable rows after dropping missing Salary/Experience".to_string(),
        ));
    }

    Ok(df)
}

/// Sorted unique values of each categorical column.
pub fn column_domains(df: &DataFrame) -> Result<Vec<(String, Vec<String>)>> {
    CATEGORICAL_COLUMNS
        .iter()
        .map(|&col| {
            let ca = required_column(df, col)?
                .str()
                .map_err(|e| SalaryError::DataError(e.to_string()))?;
            let unique: BTreeSet<&str> = ca.into_iter().flatten().collect();
            Ok((col.to_string(), unique.into_iter().map(String::from).collect()))
        })
        .collect()
}

pub(crate) fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| SalaryError::ColumnNotFound(name.to_string()))
}
