//! Configuration management and validation.
//!
//! Provides the pipeline configuration: file locations relative to a
//! project root, Parquet output settings, and export sizing.

use crate::error::{LoanEtlError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default raw input location, relative to the project root
pub const DEFAULT_INPUT: &str = "data/raw/loans.csv";
/// Default cleaned Parquet location, relative to the project root
pub const DEFAULT_OUTPUT: &str = "data/processed/loans_processed.parquet";
pub const DEFAULT_SUMMARY: &str = "data/processed/analysis_results.csv";
pub const DEFAULT_EXPORT: &str = "data/processed/loans_processed.csv";
pub const DEFAULT_SAMPLE: &str = "data/processed/loans_sample.csv";

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Parse a compression name as accepted on the command line
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => Err(LoanEtlError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }

    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Global configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory every relative path below is resolved against
    pub project_root: PathBuf,

    /// Raw delimited input file
    pub input: PathBuf,

    /// Cleaned Parquet output file
    pub output: PathBuf,

    /// Grade summary report
    pub summary: PathBuf,

    /// Full verbatim CSV dump of the cleaned data
    pub export: PathBuf,

    /// CSV dump of the first `sample_rows` cleaned records
    pub sample: PathBuf,

    /// Number of rows in the sample export
    pub sample_rows: usize,

    /// Number of rows shown in console previews
    pub preview_rows: usize,

    /// Parquet compression algorithm
    pub compression: CompressionAlgorithm,

    /// Write column statistics into the Parquet file
    pub enable_statistics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            summary: PathBuf::from(DEFAULT_SUMMARY),
            export: PathBuf::from(DEFAULT_EXPORT),
            sample: PathBuf::from(DEFAULT_SAMPLE),
            sample_rows: 100,
            preview_rows: 5,
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

impl PipelineConfig {
    /// Default layout under the given project root
    pub fn for_project_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    /// Override the raw input file
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Override the cleaned Parquet output file
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    pub fn without_statistics(mut self) -> Self {
        self.enable_statistics = false;
        self
    }

    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.input)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.resolve(&self.summary)
    }

    pub fn export_path(&self) -> PathBuf {
        self.resolve(&self.export)
    }

    pub fn sample_path(&self) -> PathBuf {
        self.resolve(&self.sample)
    }

    /// Check settings that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        if self.sample_rows == 0 {
            return Err(LoanEtlError::Configuration {
                message: "sample_rows must be at least 1".to_string(),
            });
        }
        if self.input_path() == self.output_path() {
            return Err(LoanEtlError::Configuration {
                message: format!(
                    "Input and output resolve to the same file: {}",
                    self.input_path().display()
                ),
            });
        }
        debug!("Configuration validated: {:?}", self);
        Ok(())
    }

    // Absolute paths win over the project root in `Path::join`.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_relative_to_root() {
        let config = PipelineConfig::for_project_root("/srv/loans");

        assert_eq!(
            config.input_path(),
            PathBuf::from("/srv/loans/data/raw/loans.csv")
        );
        assert_eq!(
            config.output_path(),
            PathBuf::from("/srv/loans/data/processed/loans_processed.parquet")
        );
        assert_eq!(
            config.summary_path(),
            PathBuf::from("/srv/loans/data/processed/analysis_results.csv")
        );
    }

    #[test]
    fn test_absolute_override_ignores_root() {
        let config = PipelineConfig::for_project_root("/srv/loans").with_input("/tmp/raw.csv");

        assert_eq!(config.input_path(), PathBuf::from("/tmp/raw.csv"));
    }

    #[test]
    fn test_compression_names() {
        assert_eq!(
            CompressionAlgorithm::from_name("ZSTD").unwrap(),
            CompressionAlgorithm::Zstd
        );
        assert_eq!(
            CompressionAlgorithm::from_name("none").unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!(CompressionAlgorithm::from_name("brotli").is_err());
    }

    #[test]
    fn test_validate_rejects_same_input_and_output() {
        let config = PipelineConfig::default()
            .with_input("data/loans.parquet")
            .with_output("data/loans.parquet");

        assert!(matches!(
            config.validate(),
            Err(LoanEtlError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_sample() {
        let config = PipelineConfig::default().with_sample_rows(0);
        assert!(config.validate().is_err());
    }
}
