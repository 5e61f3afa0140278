//! Integration tests for the full loan pipeline
//!
//! These tests drive the public API the way the `run` subcommand does: ETL
//! into Parquet, then the grade summary and the CSV exports, all inside a
//! temporary project root.

use loan_etl::analysis::{Analyzer, summarize_by_grade};
use loan_etl::processor::EtlProcessor;
use loan_etl::processor::transform::{read_raw_csv, transform};
use loan_etl::processor::writer::{ColumnarSink, ParquetSink};
use loan_etl::{CleanRecord, PipelineConfig, SummaryRow};
use polars::prelude::IntoLazy;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RAW_LOANS: &str = "\
id,loan_amnt,term,int_rate,grade,emp_length,home_ownership,annual_inc,verification_status,issue_d,loan_status,purpose,addr_state,dti,url
1,10000, 36 months,10.0%,A,< 1 year,RENT,55000,Verified,Mar-2017,Fully Paid,credit_card,CA,18.2,x
2,20000, 60 months,20.0%,A,10+ years,MORTGAGE,120000,Source Verified,Apr-2017,Current,debt_consolidation,TX,22.4,x
3,5000, 36 months,5.0%,B,5 years,OWN,40000,Not Verified,Jan-2016,Charged Off,car,NY,9.8,x
4,,36 months,12.0,B,,RENT,n/a,Verified,sometime,Current,car,NY,,x
5,100, 36 months,7.5%,,3 years,RENT,30000,Verified,May-2015,Late (16-30 days),vacation,GA,5,x
6,9000, 60 months,8.0%,G,garbage,OWN,90000,Verified,Jun-2018,,small_business,MI,3,x
";

fn project_with_raw(raw: &str) -> (TempDir, PipelineConfig) {
    let temp_dir = TempDir::new().unwrap();
    let raw_dir = temp_dir.path().join("data").join("raw");
    fs::create_dir_all(&raw_dir).unwrap();
    fs::write(raw_dir.join("loans.csv"), raw).unwrap();
    let config = PipelineConfig::for_project_root(temp_dir.path());
    (temp_dir, config)
}

#[tokio::test]
async fn test_end_to_end_run() {
    let (_temp_dir, config) = project_with_raw(RAW_LOANS);

    let stats = EtlProcessor::new(config.clone())
        .unwrap()
        .process()
        .await
        .unwrap();

    // Filtering law: only the row without a loan status is dropped.
    assert_eq!(stats.rows_read, 6);
    assert_eq!(stats.rows_written, 5);
    assert_eq!(stats.rows_dropped, 1);

    let analyzer = Analyzer::new(config.clone());
    let summary = analyzer.analyze().await.unwrap();

    let grades: Vec<Option<&str>> = summary.iter().map(|r| r.grade.as_deref()).collect();
    assert_eq!(grades, vec![Some("A"), Some("B"), None]);

    assert_eq!(
        summary[1],
        SummaryRow {
            grade: Some("B".to_string()),
            num_loans: 2,
            // Row 4 has no parseable loan amount and is skipped by the mean.
            avg_loan_amount: Some(5000.0),
            avg_interest_rate: Some(8.5),
        }
    );
    assert_eq!(summary[2].num_loans, 1);
    assert_eq!(summary[2].avg_loan_amount, Some(100.0));

    let export = analyzer.export_full().await.unwrap();
    assert_eq!(export.rows_exported, 5);
    assert!(config.summary_path().exists());
    assert!(config.export_path().exists());
}

#[tokio::test]
async fn test_cleaned_records_follow_field_policies() {
    let (_temp_dir, config) = project_with_raw(RAW_LOANS);
    EtlProcessor::new(config.clone())
        .unwrap()
        .process()
        .await
        .unwrap();

    let frame = ParquetSink::default().read(&config.output_path()).unwrap();
    let records = CleanRecord::from_frame(&frame).unwrap();

    let emp_years: Vec<i32> = records.iter().map(|r| r.emp_years).collect();
    assert_eq!(emp_years, vec![0, 10, 5, 0, 3]);

    let terms: Vec<i32> = records.iter().map(|r| r.term_months).collect();
    assert_eq!(terms, vec![36, 60, 36, 36, 36]);

    let malformed = &records[3];
    assert_eq!(malformed.loan_amnt, None);
    assert_eq!(malformed.int_rate, Some(12.0));
    assert_eq!(malformed.annual_inc, None);
    assert_eq!(malformed.issue_d, None);
    assert_eq!(malformed.dti, None);

    assert!(records.iter().all(|r| r.emp_years >= 0 && r.emp_years <= 10));
}

#[test]
fn test_transform_is_deterministic() {
    let (_temp_dir, config) = project_with_raw(RAW_LOANS);
    let input = config.input_path();

    let first = transform(&read_raw_csv(&input).unwrap(), &input).unwrap();
    let second = transform(&read_raw_csv(&input).unwrap(), &input).unwrap();

    assert!(first.frame.equals_missing(&second.frame));
    assert_eq!(first.null_counts, second.null_counts);
}

#[test]
fn test_summary_over_transformed_frame() {
    let (_temp_dir, config) = project_with_raw(RAW_LOANS);
    let input = config.input_path();
    let outcome = transform(&read_raw_csv(&input).unwrap(), Path::new("raw")).unwrap();

    let summary = summarize_by_grade(outcome.frame.lazy()).unwrap();
    let rows = SummaryRow::from_frame(&summary).unwrap();

    assert_eq!(rows[0].grade.as_deref(), Some("A"));
    assert_eq!(rows[0].num_loans, 2);
    assert_eq!(rows[0].avg_loan_amount, Some(15000.0));
    assert_eq!(rows[0].avg_interest_rate, Some(15.0));
}
