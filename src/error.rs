//! Error handling for loan ETL operations.
//!
//! Field-level parse failures never reach this type: they resolve to nulls
//! inside the normalizers. Everything here aborts the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoanEtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input file not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Input file {path} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Record {row} has no usable value in required field {column}: {value:?}")]
    MissingRequired {
        column: String,
        row: usize,
        value: Option<String>,
    },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Cleaned frame is invalid: {reason}")]
    InvalidFrame { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, LoanEtlError>;
