//! Smart Salary - employee salary prediction
//!
//! Predicts an employee's salary from categorical and numeric attributes
//! with a random-forest regressor trained on demand. Artifacts (forest,
//! encoder, evaluation metric) are cached on disk and reloaded on
//! subsequent runs unless a retrain is forced.
//!
//! # Modules
//!
//! - [`data`] - Dataset loading and the row-filtering invariant
//! - [`model`] - The model provider: encoder, forest, split, metrics, cache
//! - [`history`] - SQLite prediction history
//! - [`insights`] - Role comparison and career suggestions
//! - [`report`] - PDF salary report rendering
//! - [`cli`] - Command-line interface

pub mod error;

pub mod data;
pub mod model;

pub mod history;
pub mod insights;
pub mod report;

pub mod cli;

pub use error::{Result, SalaryError};
