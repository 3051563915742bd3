//! Plan generation CLI
//!
//! Reads a natal chart and an exercise catalog and prints the plan as JSON.
//!
//! # Usage
//!
//! ```bash
//! generate_plan chart.json exercise_catalog.json [astroplan.toml]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level written to stderr (default: warn)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use astroplan_rust::catalog::repository::{CatalogRepository, FileCatalogRepository};
use astroplan_rust::config::PlanConfig;
use astroplan_rust::io::loaders::{plan_to_json, ChartLoader};
use astroplan_rust::logging::LogFacadeLogger;
use astroplan_rust::services::generate_plan_async;
use astroplan_rust::PlanError;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::WARN),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        anyhow::bail!("usage: {} <chart.json> <catalog.json> [config.toml]", args[0]);
    }
    let chart_path = PathBuf::from(&args[1]);
    let catalog_path = PathBuf::from(&args[2]);

    let config = match args.get(3) {
        Some(path) => PlanConfig::from_file(path).context("Failed to load configuration")?,
        None => PlanConfig::from_default_location().unwrap_or_else(|e| {
            info!("Using default configuration: {}", e);
            PlanConfig::default()
        }),
    };

    let chart = ChartLoader::load_from_file(&chart_path)?;
    info!(
        "Loaded chart {} ({} planets, {} aspects)",
        chart_path.display(),
        chart.num_planets,
        chart.num_aspects
    );

    let catalog = FileCatalogRepository::new(catalog_path)
        .load_catalog()
        .await
        .context("Failed to load exercise catalog")?;
    info!("Loaded {} exercises", catalog.len());

    match generate_plan_async(chart.chart, catalog, config, Arc::new(LogFacadeLogger)).await {
        Ok(plan) => {
            println!("{}", plan_to_json(&plan)?);
            Ok(())
        }
        Err(PlanError::Validation { errors, warnings }) => {
            for warning in &warnings {
                eprintln!("warning: {}", warning);
            }
            for error in &errors {
                eprintln!("error: {}", error);
            }
            anyhow::bail!("Chart validation failed with {} error(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}
