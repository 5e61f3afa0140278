//! Column layout of the raw input and the cleaned output.
//!
//! `FIELD_RULES` is the single declaration of how every persisted column is
//! derived: which raw column feeds it, which normalizer runs, and what
//! happens when the raw value does not parse.

use polars::prelude::*;

pub const LOAN_AMNT: &str = "loan_amnt";
pub const TERM: &str = "term";
pub const INT_RATE: &str = "int_rate";
pub const GRADE: &str = "grade";
pub const EMP_LENGTH: &str = "emp_length";
pub const HOME_OWNERSHIP: &str = "home_ownership";
pub const ANNUAL_INC: &str = "annual_inc";
pub const VERIFICATION_STATUS: &str = "verification_status";
pub const ISSUE_D: &str = "issue_d";
pub const LOAN_STATUS: &str = "loan_status";
pub const PURPOSE: &str = "purpose";
pub const ADDR_STATE: &str = "addr_state";
pub const DTI: &str = "dti";
pub const TERM_MONTHS: &str = "term_months";
pub const EMP_YEARS: &str = "emp_years";

/// Columns the raw input must carry. Anything else is ignored.
pub const RAW_COLUMNS: [&str; 13] = [
    LOAN_AMNT,
    TERM,
    INT_RATE,
    GRADE,
    EMP_LENGTH,
    HOME_OWNERSHIP,
    ANNUAL_INC,
    VERIFICATION_STATUS,
    ISSUE_D,
    LOAN_STATUS,
    PURPOSE,
    ADDR_STATE,
    DTI,
];

/// Raw columns that are consumed by a derivation and not persisted
pub const CONSUMED_COLUMNS: [&str; 2] = [TERM, EMP_LENGTH];

/// What a normalizer does when the raw value is missing or malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    /// The field becomes null and the row survives
    NullOnFailure,
    /// The field takes a fixed default and is never null
    DefaultTo(i32),
    /// The run fails: valid input always carries this field
    Required,
}

/// Normalizer applied to a raw column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Decimal number
    Numeric,
    /// Decimal number with an optional trailing `%`
    Percentage,
    /// `Mon-YYYY` month date
    MonthYear,
    /// Leading month count of a `<n> months` term
    TermMonths,
    /// Years of employment from a free-form length
    EmploymentYears,
    /// Identity passthrough
    Categorical,
}

impl FieldKind {
    /// Policy a rule of this kind starts with
    pub const fn null_policy(&self) -> NullPolicy {
        match self {
            FieldKind::TermMonths => NullPolicy::Required,
            FieldKind::EmploymentYears => NullPolicy::DefaultTo(0),
            FieldKind::Numeric
            | FieldKind::Percentage
            | FieldKind::MonthYear
            | FieldKind::Categorical => NullPolicy::NullOnFailure,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FieldKind::Numeric | FieldKind::Percentage => DataType::Float64,
            FieldKind::MonthYear => DataType::Date,
            FieldKind::TermMonths | FieldKind::EmploymentYears => DataType::Int32,
            FieldKind::Categorical => DataType::String,
        }
    }
}

/// One persisted column and how it is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: FieldKind,
    pub null_policy: NullPolicy,
}

impl FieldRule {
    pub const fn with_null_policy(mut self, null_policy: NullPolicy) -> Self {
        self.null_policy = null_policy;
        self
    }
}

const fn rule(source: &'static str, target: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        source,
        target,
        kind,
        null_policy: kind.null_policy(),
    }
}

/// Cleaned columns in persisted order
pub const FIELD_RULES: [FieldRule; 13] = [
    rule(LOAN_AMNT, LOAN_AMNT, FieldKind::Numeric),
    rule(INT_RATE, INT_RATE, FieldKind::Percentage),
    rule(GRADE, GRADE, FieldKind::Categorical),
    rule(HOME_OWNERSHIP, HOME_OWNERSHIP, FieldKind::Categorical),
    rule(ANNUAL_INC, ANNUAL_INC, FieldKind::Numeric),
    rule(VERIFICATION_STATUS, VERIFICATION_STATUS, FieldKind::Categorical),
    rule(ISSUE_D, ISSUE_D, FieldKind::MonthYear),
    rule(LOAN_STATUS, LOAN_STATUS, FieldKind::Categorical),
    rule(PURPOSE, PURPOSE, FieldKind::Categorical),
    rule(ADDR_STATE, ADDR_STATE, FieldKind::Categorical),
    rule(DTI, DTI, FieldKind::Numeric),
    rule(TERM, TERM_MONTHS, FieldKind::TermMonths),
    rule(EMP_LENGTH, EMP_YEARS, FieldKind::EmploymentYears),
];

/// Polars schema of a cleaned frame
pub fn clean_schema() -> Schema {
    Schema::from_iter(
        FIELD_RULES
            .iter()
            .map(|rule| Field::new(rule.target.into(), rule.kind.data_type())),
    )
}

/// Required raw columns absent from `available`, in declaration order
pub fn missing_raw_columns<'a>(available: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let available: Vec<&str> = available.into_iter().collect();
    RAW_COLUMNS
        .iter()
        .filter(|name| !available.contains(name))
        .map(|name| name.to_string())
        .collect()
}
