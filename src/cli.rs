//! Command-line interface components.

use crate::config::{CompressionAlgorithm, PipelineConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "loan-etl")]
#[command(about = "Clean raw loan CSV data into typed Parquet and summarize it by grade")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory that relative input and output paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    /// Raw loan CSV file (default: data/raw/loans.csv)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Cleaned Parquet file (default: data/processed/loans_processed.parquet)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, global = true, default_value = "snappy")]
    pub compression: String,

    /// Number of records in the sample export
    #[arg(long, global = true, default_value_t = 100)]
    pub sample_rows: usize,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Transform the raw CSV and write the cleaned Parquet file
    Etl,
    /// Summarize the cleaned data by grade, then export it to CSV
    Analyze,
    /// Export the cleaned data and a sample of it to CSV
    Export,
    /// Run etl followed by analyze
    Run,
}

impl Args {
    /// Build the pipeline configuration from the parsed arguments
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::for_project_root(&self.project_root)
            .with_compression(CompressionAlgorithm::from_name(&self.compression)?)
            .with_sample_rows(self.sample_rows);

        if let Some(input) = &self.input {
            config = config.with_input(input);
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("loan_etl={}", log_level)));

    // try_init so a second call (tests, embedding) keeps the first subscriber.
    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommand_and_globals() {
        let args = Args::try_parse_from([
            "loan-etl",
            "etl",
            "--project-root",
            "/srv/loans",
            "--compression",
            "zstd",
        ])
        .unwrap();

        assert_eq!(args.command, Some(Command::Etl));
        let config = args.to_config().unwrap();
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert_eq!(
            config.output_path(),
            PathBuf::from("/srv/loans/data/processed/loans_processed.parquet")
        );
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let args = Args::try_parse_from(["loan-etl"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let args = Args::try_parse_from(["loan-etl", "etl", "--compression", "gzip2"]).unwrap();
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_log_levels() {
        let verbose = Args::try_parse_from(["loan-etl", "run", "-v"]).unwrap();
        let quiet = Args::try_parse_from(["loan-etl", "run", "-q"]).unwrap();
        assert_eq!(verbose.get_log_level(), "debug");
        assert_eq!(quiet.get_log_level(), "warn");
        assert!(Args::try_parse_from(["loan-etl", "run", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_input_and_output_overrides() {
        let args = Args::try_parse_from([
            "loan-etl",
            "run",
            "--input",
            "/tmp/raw.csv",
            "--output",
            "out/clean.parquet",
        ])
        .unwrap();

        let config = args.to_config().unwrap();
        assert_eq!(config.input_path(), PathBuf::from("/tmp/raw.csv"));
        assert_eq!(config.output_path(), PathBuf::from("./out/clean.parquet"));
    }
}
