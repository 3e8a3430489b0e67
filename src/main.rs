//! Macro Charts - Irish and Euro Area macro data analysis
//!
//! Cleans the GDP/consumption index, inflation and government spending tables,
//! writes three PNG charts and prints the inflation-on-spending regression.

mod charts;
mod config;
mod data;
mod pipeline;
mod stats;

use anyhow::Result;
use charts::PlottersRenderer;
use config::{AnalysisConfig, CONFIG_FILE_NAME};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the summary
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?;
    info!(data_dir = %config.data_dir.display(), "starting analysis");

    let mut renderer = PlottersRenderer::default();
    let report = pipeline::run(&config, &mut renderer)?;
    info!(countries = report.pairs.len(), "analysis complete");

    println!("\n--- Final Regression Results (INF vs. G_EXP) ---");
    println!("Slope (Impact of G_EXP): {:.3}", report.fit.slope);
    println!("Intercept: {:.3}", report.fit.intercept);

    let names: Vec<String> = report
        .charts
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    println!("\nPlots generated successfully: {}", names.join(", "));

    Ok(())
}
