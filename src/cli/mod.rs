//! Command-line interface
//!
//! Subcommands for training, predicting, browsing history, comparing roles,
//! and inspecting the dataset.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use crate::data::{self, EmployeeFeatures};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::insights;
use crate::model::{ModelConfig, ModelProvider};
use crate::report::{format_salary, generate_salary_report, SalaryReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(110, 110, 110)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {} {}", dim(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "smart-salary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Employee salary prediction with a train-or-load model cache")]
pub struct Cli {
    /// Employee dataset CSV
    #[arg(long, global = true, default_value = "employee_data.csv")]
    pub data: PathBuf,

    /// Directory for cached model artifacts
    #[arg(long, global = true, default_value = "model_artifacts")]
    pub cache_dir: PathBuf,

    /// Prediction history database
    #[arg(long, global = true, default_value = "salary_history.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the model (or reuse the cached one)
    Train {
        /// Discard cached artifacts and retrain
        #[arg(long)]
        force: bool,
    },

    /// Predict a salary for one employee
    Predict {
        #[arg(long)]
        education: String,

        /// Experience in years
        #[arg(long)]
        experience: i64,

        #[arg(long)]
        role: String,

        #[arg(long)]
        department: String,

        #[arg(long)]
        location: String,

        /// Also render a PDF report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show or clear the prediction history
    History {
        /// Delete all history records
        #[arg(long)]
        clear: bool,

        /// Show at most N records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Compare salary statistics across roles
    Compare {
        /// Roles to compare, comma-separated
        #[arg(long, value_delimiter = ',')]
        roles: Vec<String>,
    },

    /// Summarize the dataset and the current model
    Info,
}

fn provider_for(data: &Path, cache_dir: &Path) -> ModelProvider {
    ModelProvider::new(ModelConfig::new(data, cache_dir))
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data: &Path, cache_dir: &Path, force: bool) -> Result<()> {
    let provider = provider_for(data, cache_dir);

    section(if force { "Retraining model" } else { "Training model" });
    let artifacts = provider.train_or_load(force)?;

    step_ok("model ready");
    kv("r2      ", &format!("{:.4}", artifacts.metric.r2));
    kv("rows    ", &artifacts.metric.n_rows.to_string());
    kv("trees   ", &artifacts.predictor.forest().n_trees().to_string());
    kv("cache   ", &cache_dir.display().to_string());
    Ok(())
}

pub fn cmd_predict(
    data: &Path,
    cache_dir: &Path,
    db: &Path,
    features: EmployeeFeatures,
    report: Option<&Path>,
) -> Result<()> {
    let provider = provider_for(data, cache_dir);
    let artifacts = provider.train_or_load(false)?;

    let predicted = artifacts.predictor.predict(&features)?;

    section("Prediction");
    for (key, value) in features.as_pairs() {
        kv(&format!("{:<12}", key), &value);
    }
    println!();
    println!(
        "  {} {}",
        accent("Predicted salary:"),
        format_salary(predicted).white().bold()
    );
    println!("  {}", dim(&format!("model r2 {:.4}", artifacts.metric.r2)));

    let store = HistoryStore::open(db)?;
    store.insert(&features, predicted, artifacts.metric.r2)?;
    step_ok("recorded to history");

    if let Some(report_path) = report {
        write_report(data, report_path, &features, predicted, artifacts.metric.r2)?;
        step_ok(&format!("report written to {}", report_path.display()));
    }

    Ok(())
}

fn write_report(
    data: &Path,
    report_path: &Path,
    features: &EmployeeFeatures,
    predicted: f64,
    r2: f64,
) -> Result<()> {
    let df = data::load_dataset(data)?;

    let (comparison, avg_role_salary) =
        match insights::average_salary_for_role(&df, &features.role) {
            Ok(avg) => {
                let stats = insights::compare_roles(&df, &[features.role.clone()])?;
                let text = stats
                    .iter()
                    .map(|s| {
                        format!(
                            "{}: avg {} (min {}, max {}, {} rows)",
                            s.role,
                            format_salary(s.avg_salary),
                            format_salary(s.min_salary),
                            format_salary(s.max_salary),
                            s.count
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                (text, avg)
            }
            // Unknown role: the encoder still predicts, the report just says so
            Err(_) => (
                format!("Role {} is not present in the dataset.", features.role),
                predicted,
            ),
        };

    let suggestions =
        insights::career_suggestions(features, avg_role_salary, Some(predicted)).join("\n");

    let report = SalaryReport::new(features.as_pairs(), predicted, r2)
        .with_comparison(comparison)
        .with_suggestions(suggestions);
    generate_salary_report(report_path, &report)
}

pub fn cmd_history(db: &Path, clear: bool, limit: Option<usize>) -> Result<()> {
    let store = HistoryStore::open(db)?;

    if clear {
        let removed = store.clear()?;
        step_ok(&format!("cleared {} records", removed));
        return Ok(());
    }

    let records = store.fetch(limit)?;
    if records.is_empty() {
        println!("  {}", dim("no predictions yet"));
        return Ok(());
    }

    section("Prediction history");
    for record in records {
        println!(
            "  {} {} {} {} {} {}",
            dim(&record.ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            record.features.role.white(),
            dim(&record.features.education),
            dim(&format!("{}y", record.features.experience)),
            format_salary(record.predicted_salary).white().bold(),
            dim(&format!("r2 {:.4}", record.model_r2)),
        );
    }
    Ok(())
}

pub fn cmd_compare(data: &Path, roles: &[String]) -> Result<()> {
    let df = data::load_dataset(data)?;
    let stats = insights::compare_roles(&df, roles)?;

    if stats.is_empty() {
        println!("  {}", dim("none of the given roles are in the dataset"));
        return Ok(());
    }

    section("Role comparison");
    for s in stats {
        println!(
            "  {:<20} {} {}",
            s.role.white(),
            format_salary(s.avg_salary).white().bold(),
            dim(&format!(
                "min {} / max {} / {} rows",
                format_salary(s.min_salary),
                format_salary(s.max_salary),
                s.count
            )),
        );
    }
    Ok(())
}

pub fn cmd_info(data: &Path, cache_dir: &Path) -> Result<()> {
    let df = data::load_dataset(data)?;
    let provider = provider_for(data, cache_dir);
    let artifacts = provider.train_or_load(false)?;

    section("Dataset");
    kv("rows    ", &df.height().to_string());
    kv("columns ", &df.width().to_string());
    kv("model r2", &format!("{:.4}", artifacts.metric.r2));

    section("Domains");
    for (column, values) in data::column_domains(&df)? {
        kv(&format!("{:<12}", column), &values.join(", "));
    }

    section("Average salary by role");
    for (role, avg) in insights::average_salary_by(&df, "Role")? {
        println!("  {:<20} {}", role.white(), format_salary(avg));
    }

    section("Average salary by location");
    for (location, avg) in insights::average_salary_by(&df, "Location")? {
        println!("  {:<20} {}", location.white(), format_salary(avg));
    }
    Ok(())
}
