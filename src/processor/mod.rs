//! Transform-and-persist engine.
//!
//! Orchestrates one ETL run: read the raw loan file, clean it through the
//! row transform, and replace the Parquet output with the result.

pub mod transform;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::transform::{TransformOutcome, read_raw_csv, transform};
use self::writer::{ColumnarSink, ParquetSink};

use crate::config::PipelineConfig;
use crate::error::{LoanEtlError, Result};
use crate::models::EtlStats;

use colored::*;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info};

/// Runs the ETL stage for one configuration
#[derive(Debug)]
pub struct EtlProcessor {
    input_path: PathBuf,
    output_path: PathBuf,
    config: PipelineConfig,
    sink: ParquetSink,
}

impl EtlProcessor {
    /// Create a processor; fails if the raw input does not exist
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let input_path = config.input_path();
        if !input_path.exists() {
            return Err(LoanEtlError::InputNotFound { path: input_path });
        }

        Ok(Self {
            output_path: config.output_path(),
            sink: ParquetSink::from_config(&config),
            input_path,
            config,
        })
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<EtlStats> {
        let start_time = Instant::now();
        println!("{}", "Starting loan ETL".bright_green().bold());
        println!(
            "  {} {}",
            "Input:".bright_cyan(),
            self.input_path.display()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.output_path.display()
        );

        println!("\n{}", "Transforming records...".bright_yellow());
        let input_path = self.input_path.clone();
        let outcome = task::spawn_blocking(move || {
            let raw = read_raw_csv(&input_path)?;
            transform(&raw, &input_path)
        })
        .await
        .map_err(|e| LoanEtlError::ProcessingFailed {
            path: self.input_path.clone(),
            reason: format!("Failed to spawn transform task: {}", e),
        })??;

        let TransformOutcome {
            mut frame,
            rows_read,
            rows_dropped,
            null_counts,
        } = outcome;

        println!("\n{}", "Writing Parquet...".bright_yellow());
        let rows_written = self.write(&mut frame).await?;

        self.print_preview(&frame);

        let total_time = start_time.elapsed().as_millis();
        println!("\n{}", "Processing Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            total_time.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Records read:".bright_cyan(),
            rows_read.to_string().bright_white()
        );
        if rows_dropped > 0 {
            println!(
                "  {} {}",
                "Dropped (no loan status):".bright_red(),
                rows_dropped.to_string().bright_red().bold()
            );
        }
        println!(
            "  {} {}",
            "Records written:".bright_cyan(),
            rows_written.to_string().bright_white().bold()
        );

        info!(
            "ETL completed: {} rows written to {}",
            rows_written,
            self.output_path.display()
        );

        Ok(EtlStats {
            rows_read,
            rows_written,
            rows_dropped,
            null_counts,
            output_path: self.output_path.clone(),
            processing_time_ms: total_time,
        })
    }

    async fn write(&self, frame: &mut DataFrame) -> Result<usize> {
        let sink = self.sink.clone();
        let destination = self.output_path.clone();
        let mut owned = std::mem::take(frame);

        let (rows, owned) = task::spawn_blocking(move || {
            let rows = sink.write(&mut owned, &destination);
            (rows, owned)
        })
        .await
        .map_err(|e| LoanEtlError::ProcessingFailed {
            path: self.output_path.clone(),
            reason: format!("Failed to spawn parquet write task: {}", e),
        })?;

        *frame = owned;
        rows
    }

    fn print_preview(&self, frame: &DataFrame) {
        if self.config.preview_rows == 0 || frame.height() == 0 {
            return;
        }
        debug!("Previewing {} rows", self.config.preview_rows);
        println!("\n{}", "Sample of processed data:".bright_cyan());
        println!("{}", frame.head(Some(self.config.preview_rows)));
    }
}
