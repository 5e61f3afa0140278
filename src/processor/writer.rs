//! Columnar sink for cleaned loan data
//!
//! Persists cleaned frames to Parquet with full-overwrite semantics, reads
//! them back for analysis, and dumps frames to flat CSV files.

use crate::config::{CompressionAlgorithm, PipelineConfig};
use crate::error::{LoanEtlError, Result};

use polars::prelude::{
    CsvWriter, DataFrame, ParquetReader, ParquetWriter as PolarsParquetWriter, SerReader,
    SerWriter, StatisticsOptions,
};
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// Store used to persist and re-read cleaned record sets
pub trait ColumnarSink {
    /// Replace `destination` with `frame`, returning the number of rows written
    fn write(&self, frame: &mut DataFrame, destination: &Path) -> Result<usize>;

    /// Read a previously written record set
    fn read(&self, source: &Path) -> Result<DataFrame>;
}

/// Parquet-backed sink
#[derive(Debug, Clone)]
pub struct ParquetSink {
    compression: CompressionAlgorithm,
    enable_statistics: bool,
}

impl Default for ParquetSink {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

impl ParquetSink {
    pub fn new(compression: CompressionAlgorithm, enable_statistics: bool) -> Self {
        Self {
            compression,
            enable_statistics,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.compression, config.enable_statistics)
    }
}

impl ColumnarSink for ParquetSink {
    fn write(&self, frame: &mut DataFrame, destination: &Path) -> Result<usize> {
        create_parent_dir(destination)?;

        // File::create truncates, so a previous run's file is replaced whole.
        let file = File::create(destination)?;
        let statistics = if self.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        };

        PolarsParquetWriter::new(file)
            .with_compression(self.compression.to_polars_compression())
            .with_statistics(statistics)
            .finish(frame)
            .map_err(|e| LoanEtlError::ProcessingFailed {
                path: destination.to_path_buf(),
                reason: format!("Failed to write parquet: {}", e),
            })?;

        debug!(
            "Wrote {} rows to {} ({:?})",
            frame.height(),
            destination.display(),
            self.compression
        );
        Ok(frame.height())
    }

    fn read(&self, source: &Path) -> Result<DataFrame> {
        if !source.exists() {
            return Err(LoanEtlError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let file = File::open(source)?;
        let frame = ParquetReader::new(file)
            .finish()
            .map_err(|e| LoanEtlError::ProcessingFailed {
                path: source.to_path_buf(),
                reason: format!("Failed to read parquet: {}", e),
            })?;

        debug!("Read {} rows from {}", frame.height(), source.display());
        Ok(frame)
    }
}

/// Write `frame` verbatim to `destination` as CSV with a header row
pub fn write_csv(frame: &mut DataFrame, destination: &Path) -> Result<u64> {
    create_parent_dir(destination)?;

    let mut file = File::create(destination)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .map_err(|e| LoanEtlError::ProcessingFailed {
            path: destination.to_path_buf(),
            reason: format!("Failed to write CSV: {}", e),
        })?;

    let size = fs::metadata(destination)?.len();
    debug!(
        "Wrote {} rows ({} bytes) to {}",
        frame.height(),
        size,
        destination.display()
    );
    Ok(size)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
