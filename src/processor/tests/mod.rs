//! Integration tests for the processor module
//!
//! Tests the complete ETL and analysis stages against project layouts
//! written into temporary directories.


use std::fs;
use std::path::Path;

pub const HEADER: &str = "loan_amnt,term,int_rate,grade,emp_length,home_ownership,annual_inc,verification_status,issue_d,loan_status,purpose,addr_state,dti";

/// Write raw rows to `<root>/data/raw/loans.csv`
pub fn write_raw_loans(project_root: &Path, rows: &[&str]) {
    let raw_dir = project_root.join("data").join("raw");
    fs::create_dir_all(&raw_dir).unwrap();

    let mut content = String::from(HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(raw_dir.join("loans.csv"), content).unwrap();
}

/// A small realistic batch: grades A, A, B, one row without status
pub const SAMPLE_ROWS: [&str; 4] = [
    "10000, 36 months,10.0%,A,< 1 year,RENT,55000,Verified,Mar-2017,Fully Paid,credit_card,CA,18.2",
    "20000, 60 months,20.0%,A,10+ years,MORTGAGE,120000,Source Verified,Apr-2017,Current,debt_consolidation,TX,22.4",
    "5000, 36 months,5.0%,B,5 years,OWN,40000,Not Verified,Jan-2016,Charged Off,car,NY,9.8",
    "7000, 36 months,9.0%,C,2 years,RENT,35000,Verified,Feb-2018,,medical,FL,30.1",
];
