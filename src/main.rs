//! Smart Salary - main entry point

use clap::Parser;
use smart_salary::cli::{cmd_compare, cmd_history, cmd_info, cmd_predict, cmd_train, Cli, Commands};
use smart_salary::data::EmployeeFeatures;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_salary=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let (data, cache_dir, db) = (cli.data, cli.cache_dir, cli.db);

    match cli.command {
        Commands::Train { force } => {
            cmd_train(&data, &cache_dir, force)?;
        }
        Commands::Predict {
            education,
            experience,
            role,
            department,
            location,
            report,
        } => {
            let features = EmployeeFeatures {
                education,
                experience,
                role,
                department,
                location,
            };
            cmd_predict(&data, &cache_dir, &db, features, report.as_deref())?;
        }
        Commands::History { clear, limit } => {
            cmd_history(&db, clear, limit)?;
        }
        Commands::Compare { roles } => {
            cmd_compare(&data, &roles)?;
        }
        Commands::Info => {
            cmd_info(&data, &cache_dir)?;
        }
    }

    Ok(())
}
