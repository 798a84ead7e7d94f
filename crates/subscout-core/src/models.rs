//! Data models for SubScout

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single debit read from a bank statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Raw merchant text as it appears on the statement
    pub label: String,
    /// Always the absolute value of the source amount
    pub amount: f64,
}

impl Transaction {
    pub fn new(date: NaiveDate, label: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            label: label.into(),
            amount: amount.abs(),
        }
    }
}

/// A merchant we recognize by keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownService {
    /// Lowercase fragment matched as a substring of the label
    pub keyword: String,
    /// Display name
    pub name: String,
    pub icon: String,
}

/// How sure we are that a candidate is a real subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing cadence inferred from the gap between charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// A recurring charge inferred from a statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedSubscription {
    pub service_name: String,
    /// Rounded to 2 decimal places
    pub monthly_cost: f64,
    /// Serialized as an ISO date (YYYY-MM-DD)
    pub renewal_date: NaiveDate,
    pub confidence: Confidence,
    /// Emoji glyph for known services, uppercase initial otherwise
    pub icon: String,
}

/// Confidence tier rules for merchants that are not in the known-service table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// Two charges are "medium", three or more are "high"
    #[default]
    ByCount,
    /// Always "medium"
    Flat,
}

/// Physical shape of a statement export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Header row followed by delimited cells
    #[default]
    Delimited,
    /// `DDMMYYYY` date, signed amount in cents, type letter and label glued together
    Concatenated,
}

/// Date cell format declared by a bank profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[default]
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DayMonthYear => "DD/MM/YYYY",
            Self::MonthDayYear => "MM/DD/YYYY",
            Self::YearMonthDay => "YYYY-MM-DD",
        }
    }
}

/// Which amounts count as debits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebitRule {
    /// Any non-zero amount, sign ignored
    #[default]
    Any,
    /// Only strictly negative amounts
    NegativeOnly,
}

/// Zero-based column positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    pub date: usize,
    pub label: usize,
    pub amount: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: 0,
            label: 1,
            amount: 2,
        }
    }
}

/// Declarative description of one bank's export format
#[derive(Debug, Clone, PartialEq)]
pub struct BankProfile {
    pub name: String,
    pub layout: Layout,
    /// Single-byte cell delimiter
    pub separator: u8,
    pub date_format: DateFormat,
    pub columns: Columns,
    /// Tokens looked for (case-insensitive substring) in header cells
    pub header_signature: Vec<String>,
    /// Rows with fewer cells are skipped
    pub min_columns: usize,
    pub debits: DebitRule,
    /// Used when the label cell is blank
    pub default_label: Option<String>,
    /// Whether header sniffing may select this profile
    pub auto_detect: bool,
    /// The profile used when no signature matches
    pub fallback: bool,
    /// Tier rules preferred for statements in this format
    pub confidence: Option<ConfidencePolicy>,
}

/// Parser output
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStatement {
    /// Name of the bank profile that produced the transactions
    pub profile: String,
    pub transactions: Vec<Transaction>,
    /// Rows that looked like data but could not be read
    pub skipped: usize,
}
