//! Dataset insights: role comparison and career suggestions

use crate::data::{required_column, EmployeeFeatures, TARGET_COLUMN};
use crate::error::{Result, SalaryError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Salary statistics for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleStats {
    pub role: String,
    pub avg_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }
}

fn accumulate_by(df: &DataFrame, column: &str) -> Result<HashMap<String, Accumulator>> {
    let groups = required_column(df, column)?
        .str()
        .map_err(|e| SalaryError::DataError(e.to_string()))?;
    let salary = required_column(df, TARGET_COLUMN)?
        .f64()
        .map_err(|e| SalaryError::DataError(e.to_string()))?;

    let mut stats: HashMap<String, Accumulator> = HashMap::new();
    for (group, value) in groups.into_iter().zip(salary.into_iter()) {
        if let (Some(group), Some(value)) = (group, value) {
            stats.entry(group.to_string()).or_default().observe(value);
        }
    }
    Ok(stats)
}

/// Per-role salary statistics for the selected roles, sorted by role name.
/// Roles absent from the dataset are skipped.
pub fn compare_roles(df: &DataFrame, roles: &[String]) -> Result<Vec<RoleStats>> {
    let stats = accumulate_by(df, "Role")?;

    let mut selected: Vec<RoleStats> = roles
        .iter()
        .filter_map(|role| {
            stats.get(role).map(|acc| RoleStats {
                role: role.clone(),
                avg_salary: acc.sum / acc.count as f64,
                min_salary: acc.min,
                max_salary: acc.max,
                count: acc.count,
            })
        })
        .collect();
    selected.sort_by(|a, b| a.role.cmp(&b.role));
    selected.dedup_by(|a, b| a.role == b.role);
    Ok(selected)
}

/// Mean salary grouped by a categorical column, highest first.
pub fn average_salary_by(df: &DataFrame, column: &str) -> Result<Vec<(String, f64)>> {
    let stats = accumulate_by(df, column)?;
    let mut averages: Vec<(String, f64)> = stats
        .into_iter()
        .map(|(group, acc)| (group, acc.sum / acc.count as f64))
        .collect();
    averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(averages)
}

/// Mean salary for one role.
pub fn average_salary_for_role(df: &DataFrame, role: &str) -> Result<f64> {
    let stats = accumulate_by(df, "Role")?;
    stats
        .get(role)
        .map(|acc| acc.sum / acc.count as f64)
        .ok_or_else(|| SalaryError::ValidationError(format!("role not in dataset: {}", role)))
}

/// Rule-based career suggestions for an employee input.
///
/// `avg_role_salary` is the dataset mean for the input's role;
/// `predicted_salary` is optional so the rules also work without a model.
pub fn career_suggestions(
    features: &EmployeeFeatures,
    avg_role_salary: f64,
    predicted_salary: Option<f64>,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let Some(salary) = predicted_salary {
        if salary < 0.8 * avg_role_salary {
            suggestions.push(
                "Your predicted salary is below the typical range for this role. \
                 Consider upskilling or negotiation."
                    .to_string(),
            );
        }
    }

    if features.experience < 3 {
        suggestions.push(
            "Early career: build foundational skills, take certifications, and \
             contribute to open-source."
                .to_string(),
        );
    } else if features.experience < 7 {
        suggestions.push(
            "Mid-level: target specialization (e.g., ML, cloud), pursue advanced \
             courses, mentor juniors."
                .to_string(),
        );
    } else {
        suggestions.push(
            "Senior: focus on leadership, architecture, and cross-functional \
             impact to command higher pay."
                .to_string(),
        );
    }

    let education = features.education.to_lowercase();
    if education == "high school" || education == "diploma" {
        suggestions.push(
            "Higher degree or professional certification could significantly \
             increase earning potential."
                .to_string(),
        );
    }

    if suggestions.is_empty() {
        suggestions.push(
            "You are well-positioned. Keep tracking market salaries and negotiate \
             during reviews."
                .to_string(),
        );
    }

    suggestions
}
