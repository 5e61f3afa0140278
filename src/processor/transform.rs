//! Row transform for raw loan records
//!
//! Reads the raw delimited file with every column as a string, runs each
//! column through its normalizer from `FIELD_RULES`, assembles the cleaned
//! frame and drops rows without a loan status.
//!
//! The whole input is held in memory for the duration of the transform.
//! That bounds the input size by available RAM.

use crate::error::{LoanEtlError, Result};
use crate::models::epoch_days;
use crate::normalizers::{
    parse_emp_years, parse_month_year, parse_numeric, parse_percentage, parse_term_months,
    passthrough,
};
use crate::schema::{
    FIELD_RULES, FieldKind, FieldRule, LOAN_STATUS, NullPolicy, missing_raw_columns,
};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Cleaned frame plus the counts gathered while building it
#[derive(Debug)]
pub struct TransformOutcome {
    pub frame: DataFrame,
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Null count per cleaned column after filtering, in persisted order
    pub null_counts: Vec<(String, usize)>,
}

/// Read a raw loan file with every column typed as a string
pub fn read_raw_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LoanEtlError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!("Reading raw loans from {}", path.display());

    // A zero-row inference window makes polars read every column as String,
    // so typing is decided by the normalizers alone. Invalid UTF-8 bytes are
    // replaced rather than failing the read.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|options| options.with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows and {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Clean a raw frame.
///
/// `source` only labels errors. Extra columns in `raw` are ignored; a
/// missing required column or a term without a month count fails the whole
/// transform.
pub fn transform(raw: &DataFrame, source: &Path) -> Result<TransformOutcome> {
    let available = raw.get_column_names();
    let missing = missing_raw_columns(available.iter().map(|name| name.as_str()));
    if !missing.is_empty() {
        return Err(LoanEtlError::MissingColumns {
            path: source.to_path_buf(),
            columns: missing,
        });
    }

    let rows_read = raw.height();

    let pb = ProgressBar::new(FIELD_RULES.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut columns = Vec::with_capacity(FIELD_RULES.len());
    for rule in &FIELD_RULES {
        pb.set_message(format!("Normalizing: {}", rule.target));
        let values = raw.column(rule.source)?.cast(&DataType::String)?;
        columns.push(normalize_column(rule, values.str()?)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Consumed raw columns are simply never copied into the cleaned frame.
    let cleaned = DataFrame::new(columns)?;

    let keep = cleaned.column(LOAN_STATUS)?.is_not_null();
    let frame = cleaned.filter(&keep)?;
    let rows_dropped = rows_read - frame.height();

    let null_counts: Vec<(String, usize)> = frame
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), column.null_count()))
        .collect();

    info!(
        "Transformed {} records: {} kept, {} dropped without loan status",
        rows_read,
        frame.height(),
        rows_dropped
    );
    for (name, nulls) in &null_counts {
        debug!("Column {}: {} nulls", name, nulls);
    }

    Ok(TransformOutcome {
        frame,
        rows_read,
        rows_dropped,
        null_counts,
    })
}

/// Run one rule over its raw column, then resolve its failures by the rule's
/// null policy
fn normalize_column(rule: &FieldRule, values: &StringChunked) -> Result<Column> {
    let name: PlSmallStr = rule.target.into();

    let parsed = match rule.kind {
        FieldKind::Numeric => values
            .into_iter()
            .map(parse_numeric)
            .collect::<Float64Chunked>()
            .with_name(name)
            .into_series(),
        FieldKind::Percentage => values
            .into_iter()
            .map(parse_percentage)
            .collect::<Float64Chunked>()
            .with_name(name)
            .into_series(),
        FieldKind::MonthYear => values
            .into_iter()
            .map(|value| parse_month_year(value).map(epoch_days))
            .collect::<Int32Chunked>()
            .with_name(name)
            .into_series()
            .cast(&DataType::Date)?,
        FieldKind::TermMonths => values
            .into_iter()
            .map(parse_term_months)
            .collect::<Int32Chunked>()
            .with_name(name)
            .into_series(),
        FieldKind::EmploymentYears => values
            .into_iter()
            .map(parse_emp_years)
            .collect::<Int32Chunked>()
            .with_name(name)
            .into_series(),
        FieldKind::Categorical => values
            .into_iter()
            .map(passthrough)
            .collect::<StringChunked>()
            .with_name(name)
            .into_series(),
    };

    Ok(apply_null_policy(rule, values, parsed)?.into_column())
}

fn apply_null_policy(rule: &FieldRule, raw: &StringChunked, parsed: Series) -> Result<Series> {
    match rule.null_policy {
        NullPolicy::NullOnFailure => Ok(parsed),
        NullPolicy::Required => {
            let first_null = parsed
                .is_null()
                .into_iter()
                .position(|is_null| is_null == Some(true));
            match first_null {
                Some(index) => Err(LoanEtlError::MissingRequired {
                    column: rule.source.to_string(),
                    row: index + 1,
                    value: raw.get(index).map(str::to_string),
                }),
                None => Ok(parsed),
            }
        }
        NullPolicy::DefaultTo(default) => {
            let values = parsed.i32().map_err(|_| LoanEtlError::Configuration {
                message: format!(
                    "Default value for {} needs an Int32 column, got {}",
                    rule.target,
                    parsed.dtype()
                ),
            })?;
            let filled: Vec<i32> = values
                .into_iter()
                .map(|value| value.unwrap_or(default))
                .collect();
            Ok(Int32Chunked::from_vec(parsed.name().clone(), filled).into_series())
        }
    }
}
