//! Core data structures for loan processing.
//!
//! Typed views of the cleaned records and the grade summary, plus the run
//! statistics returned by each pipeline stage.

use crate::error::{LoanEtlError, Result};
use crate::schema::{
    ADDR_STATE, ANNUAL_INC, DTI, EMP_YEARS, GRADE, HOME_OWNERSHIP, INT_RATE, ISSUE_D, LOAN_AMNT,
    LOAN_STATUS, PURPOSE, TERM_MONTHS, VERIFICATION_STATUS,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::PathBuf;

/// One cleaned loan application
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub loan_amnt: Option<f64>,
    pub int_rate: Option<f64>,
    pub grade: Option<String>,
    pub home_ownership: Option<String>,
    pub annual_inc: Option<f64>,
    pub verification_status: Option<String>,
    pub issue_d: Option<NaiveDate>,
    pub loan_status: String,
    pub purpose: Option<String>,
    pub addr_state: Option<String>,
    pub dti: Option<f64>,
    pub term_months: i32,
    pub emp_years: i32,
}

impl CleanRecord {
    /// Materialize every row of a cleaned frame.
    ///
    /// Fails if a column is missing or has the wrong type, or if one of the
    /// non-null columns carries a null.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let loan_amnt = df.column(LOAN_AMNT)?.f64()?;
        let int_rate = df.column(INT_RATE)?.f64()?;
        let grade = df.column(GRADE)?.str()?;
        let home_ownership = df.column(HOME_OWNERSHIP)?.str()?;
        let annual_inc = df.column(ANNUAL_INC)?.f64()?;
        let verification_status = df.column(VERIFICATION_STATUS)?.str()?;
        let issue_days = df.column(ISSUE_D)?.cast(&DataType::Int32)?;
        let issue_days = issue_days.i32()?;
        let loan_status = df.column(LOAN_STATUS)?.str()?;
        let purpose = df.column(PURPOSE)?.str()?;
        let addr_state = df.column(ADDR_STATE)?.str()?;
        let dti = df.column(DTI)?.f64()?;
        let term_months = df.column(TERM_MONTHS)?.i32()?;
        let emp_years = df.column(EMP_YEARS)?.i32()?;

        let owned = |v: Option<&str>| v.map(str::to_string);

        (0..df.height())
            .map(|i| {
                Ok(Self {
                    loan_amnt: loan_amnt.get(i),
                    int_rate: int_rate.get(i),
                    grade: owned(grade.get(i)),
                    home_ownership: owned(home_ownership.get(i)),
                    annual_inc: annual_inc.get(i),
                    verification_status: owned(verification_status.get(i)),
                    issue_d: issue_days.get(i).and_then(date_from_epoch_days),
                    loan_status: owned(loan_status.get(i))
                        .ok_or_else(|| null_in_required(LOAN_STATUS, i))?,
                    purpose: owned(purpose.get(i)),
                    addr_state: owned(addr_state.get(i)),
                    dti: dti.get(i),
                    term_months: term_months
                        .get(i)
                        .ok_or_else(|| null_in_required(TERM_MONTHS, i))?,
                    emp_years: emp_years
                        .get(i)
                        .ok_or_else(|| null_in_required(EMP_YEARS, i))?,
                })
            })
            .collect()
    }
}

/// Days since the Unix epoch, the physical representation of a polars Date
pub fn epoch_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}

fn null_in_required(column: &str, row: usize) -> LoanEtlError {
    LoanEtlError::InvalidFrame {
        reason: format!("null value in non-null column '{}' at row {}", column, row),
    }
}

/// Aggregate statistics for one grade
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// `None` is the group of records without a grade
    pub grade: Option<String>,
    pub num_loans: u64,
    pub avg_loan_amount: Option<f64>,
    pub avg_interest_rate: Option<f64>,
}

impl SummaryRow {
    /// Read rows from a frame with the summary report layout
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let grade = df.column(GRADE)?.str()?;
        let num_loans = df.column("num_loans")?.cast(&DataType::UInt64)?;
        let num_loans = num_loans.u64()?;
        let avg_loan_amount = df.column("avg_loan_amount")?.f64()?;
        let avg_interest_rate = df.column("avg_interest_rate")?.f64()?;

        Ok((0..df.height())
            .map(|i| Self {
                grade: grade.get(i).map(str::to_string),
                num_loans: num_loans.get(i).unwrap_or(0),
                avg_loan_amount: avg_loan_amount.get(i),
                avg_interest_rate: avg_interest_rate.get(i),
            })
            .collect())
    }
}

/// Statistics for one transform-and-persist run
#[derive(Debug, Default)]
pub struct EtlStats {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    /// Null count per cleaned column, in persisted order
    pub null_counts: Vec<(String, usize)>,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

/// Statistics for one CSV dump
#[derive(Debug, Default)]
pub struct ExportStats {
    pub rows_exported: usize,
    pub columns: Vec<String>,
    pub output_path: PathBuf,
    pub file_size_bytes: u64,
}
