//! Preview command: sample once and print the report locally.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::config::Config;
use crate::core::report::Report;
use crate::core::sampler::{MetricSampler, SamplerConfig};

pub fn execute(config_path: Option<&Path>, json_output: bool) -> Result<()> {
    let sampler = MetricSampler::new(load_sampler_config(config_path));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let snapshot = runtime
        .block_on(sampler.sample())
        .context("Failed to sample system metrics")?;

    // JSON mode is for scripting
    if json_output {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_report(&Report::from_snapshot(&snapshot));
    Ok(())
}

/// Sampling options from the config file when one is readable; the token
/// and channel are not needed here.
fn load_sampler_config(config_path: Option<&Path>) -> SamplerConfig {
    let config = Config::resolve_path(config_path)
        .and_then(|path| Config::read(&path));

    match config {
        Ok(config) => SamplerConfig::from_config(&config),
        Err(e) => {
            log::debug!("Using default sampling options: {}", e);
            SamplerConfig::default()
        }
    }
}

fn print_report(report: &Report) {
    println!("{}", report.title.bold());
    println!();

    for field in &report.fields {
        println!("{}", field.name.cyan().bold());
        for line in field.value.lines() {
            println!("  {}", line);
        }
    }

    println!();
    println!("{}", report.footer.dimmed());
}
