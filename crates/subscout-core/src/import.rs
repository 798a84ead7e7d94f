//! Statement parsers for bank exports
//!
//! Two layout families are supported, both described by [`BankProfile`]:
//! - Concatenated fixed-token lines (`01092025-1107Virement COURSES`), tried first
//! - Delimited tables with a header row, matched against profile signatures
//!
//! Individual rows that cannot be read are skipped, never reported as errors.

use std::sync::OnceLock;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{BankProfile, DateFormat, DebitRule, Layout, ParsedStatement, Transaction};

/// Header + at least one data row
const MIN_LINES: usize = 2;

/// Signature tokens a header must contain for a profile to qualify
const MIN_SIGNATURE_HITS: usize = 2;

/// Concatenated lines shorter than this are balance or header noise
const MIN_CONCATENATED_LEN: usize = 10;

fn concatenated_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{8})([+-]?[0-9]+)([A-Za-z])(.*)$").expect("valid regex"))
}

/// Auto-generated operation reference appended by the bank (date + 0 + id)
fn reference_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{8}0\w+$").expect("valid regex"))
}

fn trailing_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+$").expect("valid regex"))
}

/// Parses statement text into debit transactions using a table of bank profiles
#[derive(Debug, Clone)]
pub struct StatementParser {
    profiles: Vec<BankProfile>,
    fallback: usize,
}

impl StatementParser {
    /// Create a parser over a profile table
    ///
    /// The table must contain a delimited profile marked as `fallback`, and
    /// profile names must be unique ignoring ASCII case.
    pub fn new(profiles: Vec<BankProfile>) -> Result<Self> {
        let fallback = profiles
            .iter()
            .position(|p| p.fallback && p.layout == Layout::Delimited)
            .ok_or_else(|| Error::Config("no delimited fallback bank profile".into()))?;

        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i]
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(&profile.name))
            {
                return Err(Error::Config(format!(
                    "duplicate bank profile name: {}",
                    profile.name
                )));
            }
        }

        Ok(Self { profiles, fallback })
    }

    pub fn profiles(&self) -> &[BankProfile] {
        &self.profiles
    }

    /// Look up a profile by name (case-insensitive)
    pub fn profile(&self, name: &str) -> Option<&BankProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn fallback(&self) -> &BankProfile {
        &self.profiles[self.fallback]
    }

    /// Parse a statement, detecting its layout
    pub fn parse(&self, text: &str) -> ParsedStatement {
        let text = normalize_newlines(text);
        let lines: Vec<&str> = text.lines().collect();

        if !has_min_lines(&lines) {
            debug!("Statement has fewer than {} non-blank lines", MIN_LINES);
            return self.empty(self.fallback());
        }

        for profile in self
            .profiles
            .iter()
            .filter(|p| p.auto_detect && p.layout == Layout::Concatenated)
        {
            if looks_concatenated(&lines) {
                let parsed = parse_concatenated(&lines, profile);
                if !parsed.transactions.is_empty() {
                    return parsed;
                }
                debug!(
                    "{} layout matched but yielded no debits, trying delimited profiles",
                    profile.name
                );
            }
        }

        let Some(header_idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
            return self.empty(self.fallback());
        };
        let header = lines[header_idx];
        let separator = detect_separator(header);
        let profile = self.detect_profile(header);

        debug!(
            "Using {} profile (separator {:?})",
            profile.name, separator as char
        );
        parse_delimited(&lines[header_idx + 1..], profile, separator)
    }

    /// Parse a statement with an explicit profile, skipping detection
    pub fn parse_with(&self, text: &str, profile: &BankProfile) -> ParsedStatement {
        let text = normalize_newlines(text);
        let lines: Vec<&str> = text.lines().collect();

        if !has_min_lines(&lines) {
            return self.empty(profile);
        }

        match profile.layout {
            Layout::Concatenated => parse_concatenated(&lines, profile),
            Layout::Delimited => {
                // First non-blank line is a header or balance summary
                let Some(header_idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
                    return self.empty(profile);
                };
                parse_delimited(&lines[header_idx + 1..], profile, profile.separator)
            }
        }
    }

    /// Pick the delimited profile whose signature best matches a header line
    ///
    /// Falls back to the generic profile when no signature reaches the threshold.
    pub fn detect_profile(&self, header: &str) -> &BankProfile {
        let separator = detect_separator(header) as char;
        let cells: Vec<String> = header.split(separator).map(fold_header_cell).collect();

        let mut best: Option<(&BankProfile, usize, usize)> = None;
        for profile in self
            .profiles
            .iter()
            .filter(|p| p.auto_detect && p.layout == Layout::Delimited)
        {
            let hits = profile
                .header_signature
                .iter()
                .filter(|sig| {
                    let sig = fold_header_cell(sig);
                    cells.iter().any(|cell| cell.contains(&sig))
                })
                .count();
            if hits < MIN_SIGNATURE_HITS {
                continue;
            }
            let misses = profile.header_signature.len() - hits;

            let better = match best {
                None => true,
                Some((_, best_hits, best_misses)) => {
                    hits > best_hits || (hits == best_hits && misses < best_misses)
                }
            };
            if better {
                best = Some((profile, hits, misses));
            }
        }

        best.map(|(p, _, _)| p).unwrap_or_else(|| self.fallback())
    }

    fn empty(&self, profile: &BankProfile) -> ParsedStatement {
        ParsedStatement {
            profile: profile.name.clone(),
            ..Default::default()
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn has_min_lines(lines: &[&str]) -> bool {
    lines.iter().filter(|l| !l.trim().is_empty()).count() >= MIN_LINES
}

/// `;` wins over `,` when the header contains both
fn detect_separator(header: &str) -> u8 {
    if header.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Lowercase, unquote and strip French accents so `"Libellé"` matches `libelle`
fn fold_header_cell(cell: &str) -> String {
    cell.replace('"', "")
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn is_concatenated_noise(line: &str) -> bool {
    (line.contains(char::is_whitespace) && line.contains("--"))
        || line.chars().count() < MIN_CONCATENATED_LEN
}

fn looks_concatenated(lines: &[&str]) -> bool {
    let re = concatenated_line_re();
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !is_concatenated_noise(l))
        .any(|l| re.is_match(l))
}

/// Parse concatenated fixed-token lines, oldest first
fn parse_concatenated(lines: &[&str], profile: &BankProfile) -> ParsedStatement {
    let re = concatenated_line_re();
    let mut transactions = Vec::new();
    let mut skipped = 0;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_concatenated_noise(trimmed) {
            continue;
        }

        let Some(caps) = re.captures(trimmed) else {
            debug!("Skipping unrecognized line: {}", trimmed);
            skipped += 1;
            continue;
        };

        let digits = &caps[1];
        let date = match (
            digits[0..2].parse::<u32>(),
            digits[2..4].parse::<u32>(),
            digits[4..8].parse::<i32>(),
        ) {
            (Ok(d), Ok(m), Ok(y)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };
        let Some(date) = date else {
            debug!("Skipping line with invalid date: {}", trimmed);
            skipped += 1;
            continue;
        };

        // Amounts are in cents
        let amount = parse_amount(&caps[2]) / 100.0;
        if amount >= 0.0 {
            skipped += 1;
            continue;
        }

        let raw_label = format!("{}{}", &caps[3], &caps[4]);
        let label = strip_label_suffix(&raw_label);
        if label.is_empty() {
            skipped += 1;
            continue;
        }

        transactions.push(Transaction::new(date, label, amount));
    }

    transactions.sort_by_key(|t| t.date);

    debug!(
        "Parsed {} {} transactions ({} skipped)",
        transactions.len(),
        profile.name,
        skipped
    );
    ParsedStatement {
        profile: profile.name.clone(),
        transactions,
        skipped,
    }
}

/// Remove the bank's trailing operation reference and any trailing digits
fn strip_label_suffix(label: &str) -> String {
    let label = reference_suffix_re().replace(label.trim(), "");
    let label = trailing_digits_re().replace(label.trim_end(), "");
    label.trim().to_string()
}

/// Parse delimited data rows (header already removed), newest first
///
/// Quotes are not treated as field delimiters, so a stray `"` cannot swallow
/// the rows after it.
fn parse_delimited(rows: &[&str], profile: &BankProfile, separator: u8) -> ParsedStatement {
    let body = rows.join("\n");
    let mut rdr = ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let mut transactions = Vec::new();
    let mut skipped = 0;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let cells: Vec<String> = record
            .iter()
            .map(|c| c.replace('"', "").trim().to_string())
            .collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }

        match read_row(&cells, profile) {
            Some(tx) => transactions.push(tx),
            None => {
                debug!("Skipping row: {}", cells.join(" | "));
                skipped += 1;
            }
        }
    }

    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    debug!(
        "Parsed {} {} transactions ({} skipped)",
        transactions.len(),
        profile.name,
        skipped
    );
    ParsedStatement {
        profile: profile.name.clone(),
        transactions,
        skipped,
    }
}

fn read_row(cells: &[String], profile: &BankProfile) -> Option<Transaction> {
    if cells.len() < profile.min_columns {
        return None;
    }

    let columns = profile.columns;
    let date = parse_date(cells.get(columns.date)?, profile.date_format)?;

    let raw_amount = parse_amount(cells.get(columns.amount)?);
    let amount = match profile.debits {
        DebitRule::Any => raw_amount.abs(),
        DebitRule::NegativeOnly if raw_amount < 0.0 => -raw_amount,
        DebitRule::NegativeOnly => return None,
    };
    if amount <= 0.0 {
        return None;
    }

    let label = cells
        .get(columns.label)
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .or(profile.default_label.as_deref())
        .unwrap_or("");
    if label.is_empty() {
        return None;
    }

    Some(Transaction::new(date, label, amount))
}

/// Parse a date cell in the given format
///
/// Components may be separated by `/` or `-`. Two-digit years are read as 20xx.
pub fn parse_date(s: &str, format: DateFormat) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }

    let (year, month, day) = match format {
        DateFormat::DayMonthYear => (parts[2], parts[1], parts[0]),
        DateFormat::MonthDayYear => (parts[2], parts[0], parts[1]),
        DateFormat::YearMonthDay => (parts[0], parts[1], parts[2]),
    };

    let mut year: i32 = year.trim().parse().ok()?;
    if (0..100).contains(&year) {
        year += 2000;
    }
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an amount cell, tolerating currency symbols, spaces and French decimals
///
/// Returns 0.0 when nothing numeric can be read.
pub fn parse_amount(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    // With both separators present the right-most one is the decimal point
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized.parse::<f64>().unwrap_or(0.0)
}
