//! Loan ETL Library
//!
//! A Rust library for cleaning raw loan application records from CSV into a
//! strongly typed Apache Parquet file, and for summarizing the cleaned data.
//!
//! This library provides tools for:
//! - Normalizing free-form string fields with explicit null policies
//! - Transforming raw rows into the cleaned schema and filtering them
//! - Persisting cleaned records to Parquet with full-overwrite semantics
//! - Summarizing loans by grade and exporting reports to CSV
//!
//! Processing is a single in-memory pass: the raw file must fit in memory.

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod normalizers;
pub mod processor;
pub mod schema;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{LoanEtlError, Result};
pub use models::{CleanRecord, SummaryRow};
