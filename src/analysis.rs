//! Grade summary and CSV exports over the persisted loan data.
//!
//! The summary groups by the observed `grade` values. Records without a
//! grade form their own group, which sorts after every named grade. Means
//! skip null values.

use crate::config::PipelineConfig;
use crate::error::{LoanEtlError, Result};
use crate::models::{ExportStats, SummaryRow};
use crate::processor::writer::{ColumnarSink, ParquetSink, write_csv};
use crate::schema::{GRADE, INT_RATE, LOAN_AMNT};

use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::info;

pub const NUM_LOANS: &str = "num_loans";
pub const AVG_LOAN_AMOUNT: &str = "avg_loan_amount";
pub const AVG_INTEREST_RATE: &str = "avg_interest_rate";

/// Count and mean loan amount and interest rate per grade, sorted by grade
pub fn summarize_by_grade(frame: LazyFrame) -> Result<DataFrame> {
    let summary = frame
        .group_by([col(GRADE)])
        .agg([
            len().alias(NUM_LOANS),
            col(LOAN_AMNT).mean().alias(AVG_LOAN_AMOUNT),
            col(INT_RATE).mean().alias(AVG_INTEREST_RATE),
        ])
        .sort(
            [GRADE],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(summary)
}

/// Run polars work for `source` on the blocking pool
async fn run_blocking<T, F>(source: &Path, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| LoanEtlError::ProcessingFailed {
            path: source.to_path_buf(),
            reason: format!("Failed to spawn analysis task: {}", e),
        })?
}

/// Reads the cleaned Parquet output and produces reports from it
#[derive(Debug)]
pub struct Analyzer {
    config: PipelineConfig,
    sink: ParquetSink,
}

impl Analyzer {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            sink: ParquetSink::from_config(&config),
            config,
        }
    }

    /// Summarize by grade, print the table and write the summary report
    pub async fn analyze(&self) -> Result<Vec<SummaryRow>> {
        let source = self.config.output_path();
        let destination = self.config.summary_path();
        println!(
            "{}",
            "Querying processed data...".bright_yellow()
        );

        let sink = self.sink.clone();
        let read_from = source.clone();
        let (summary, destination) = run_blocking(&source, move || {
            let frame = sink.read(&read_from)?;
            let mut summary = summarize_by_grade(frame.lazy())?;
            write_csv(&mut summary, &destination)?;
            Ok((summary, destination))
        })
        .await?;

        println!("{}", "Analysis Results by Loan Grade:".bright_green().bold());
        println!("{}", summary);
        println!(
            "\n  {} {}",
            "Analysis results exported to:".bright_cyan(),
            destination.display()
        );
        info!("Summarized {} grade groups", summary.height());

        SummaryRow::from_frame(&summary)
    }

    /// Dump the full cleaned data set to CSV
    pub async fn export_full(&self) -> Result<ExportStats> {
        let destination = self.config.export_path();
        println!("{}", "Exporting full dataset to CSV...".bright_yellow());
        let stats = self.export(None, destination).await?;

        println!(
            "  {} {} records",
            "Exported".bright_green(),
            stats.rows_exported.to_string().bright_white().bold()
        );
        println!(
            "  {} {}",
            "CSV file saved to:".bright_cyan(),
            stats.output_path.display()
        );
        println!(
            "  {} {}",
            "Columns:".bright_cyan(),
            stats.columns.join(", ")
        );
        println!(
            "  {} {:.1} KB",
            "File size:".bright_cyan(),
            stats.file_size_bytes as f64 / 1024.0
        );
        Ok(stats)
    }

    /// Dump the first `sample_rows` cleaned records to CSV
    pub async fn export_sample(&self) -> Result<ExportStats> {
        let destination = self.config.sample_path();
        let limit = self.config.sample_rows;
        println!("{}", "Exporting sample to CSV...".bright_yellow());
        let stats = self.export(Some(limit), destination).await?;

        println!(
            "  {} sample of {} records to {}",
            "Exported".bright_green(),
            stats.rows_exported.to_string().bright_white().bold(),
            stats.output_path.display()
        );
        Ok(stats)
    }

    async fn export(&self, limit: Option<usize>, destination: PathBuf) -> Result<ExportStats> {
        let source = self.config.output_path();
        let sink = self.sink.clone();
        let read_from = source.clone();

        let stats = run_blocking(&source, move || {
            let frame = sink.read(&read_from)?;
            let mut frame = match limit {
                Some(rows) => frame.head(Some(rows)),
                None => frame,
            };
            let file_size_bytes = write_csv(&mut frame, &destination)?;
            Ok(ExportStats {
                rows_exported: frame.height(),
                columns: frame
                    .get_column_names()
                    .into_iter()
                    .map(|name| name.to_string())
                    .collect(),
                output_path: destination,
                file_size_bytes,
            })
        })
        .await?;

        info!(
            "Exported {} records to {}",
            stats.rows_exported,
            stats.output_path.display()
        );
        Ok(stats)
    }
}
