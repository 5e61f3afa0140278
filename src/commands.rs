//! Subcommand dispatch for the `loan-etl` binary.

use crate::analysis::Analyzer;
use crate::cli::{Args, Command, setup_logging};
use crate::config::PipelineConfig;
use crate::processor::EtlProcessor;

use anyhow::{Context, Result};
use colored::*;

/// Run the selected subcommand to completion
pub async fn run(args: Args, command: Command) -> Result<()> {
    setup_logging(&args);
    let config = args.to_config().context("Invalid configuration")?;

    match command {
        Command::Etl => run_etl(&config).await,
        Command::Analyze => run_analyze(&config).await,
        Command::Export => run_export(&config).await,
        Command::Run => {
            run_etl(&config).await?;
            println!("\n{}", "=".repeat(50));
            run_analyze(&config).await
        }
    }
}

async fn run_etl(config: &PipelineConfig) -> Result<()> {
    let processor = EtlProcessor::new(config.clone())
        .with_context(|| format!("Cannot start ETL for {}", config.input_path().display()))?;
    processor.process().await.context("ETL run failed")?;
    Ok(())
}

async fn run_analyze(config: &PipelineConfig) -> Result<()> {
    let analyzer = Analyzer::new(config.clone());
    analyzer.analyze().await.context("Analysis failed")?;

    println!("\n{}", "=".repeat(50));
    analyzer
        .export_full()
        .await
        .context("Exporting full dataset failed")?;

    print_generated_files(config, false);
    Ok(())
}

async fn run_export(config: &PipelineConfig) -> Result<()> {
    let analyzer = Analyzer::new(config.clone());
    analyzer
        .export_full()
        .await
        .context("Exporting full dataset failed")?;

    println!();
    analyzer
        .export_sample()
        .await
        .context("Exporting sample failed")?;

    print_generated_files(config, true);
    Ok(())
}

fn print_generated_files(config: &PipelineConfig, with_sample: bool) {
    println!("\n{}", "Generated files:".bright_green().bold());
    println!("  - Full dataset: {}", config.export_path().display());
    if with_sample {
        println!("  - Sample data: {}", config.sample_path().display());
    } else {
        println!("  - Analysis results: {}", config.summary_path().display());
    }
    println!("  - Parquet: {}", config.output_path().display());
}
