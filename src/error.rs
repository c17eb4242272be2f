//! Error types for the smart-salary crate

use thiserror::Error;

/// Result type alias for salary prediction operations
pub type Result<T> = std::result::Result<T, SalaryError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum SalaryError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("History error: {0}")]
    HistoryError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for SalaryError {
    fn from(err: polars::error::PolarsError) -> Self {
        SalaryError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SalaryError {
    fn from(err: serde_json::Error) -> Self {
        SalaryError::SerializationError(err.to_string())
    }
}

impl From<rusqlite::Error> for SalaryError {
    fn from(err: rusqlite::Error) -> Self {
        SalaryError::HistoryError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SalaryError::DataError("bad rows".to_string());
        assert_eq!(err.to_string(), "Data error: bad rows");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SalaryError = io_err.into();
        assert!(matches!(err, SalaryError::IoError(_)));
    }
}
