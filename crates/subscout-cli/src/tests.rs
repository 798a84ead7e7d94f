//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use subscout_core::{Confidence, Scanner};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const STATEMENT: &str = "Date;Libelle;Montant\n\
    05/10/2025;PRLV SEPA SALLE DE SPORT 0042;-29,90\n\
    01/10/2025;CB NETFLIX.COM 01/10/25;-13,49\n\
    03/09/2025;CB FNAC PARIS 02/09;-129,00\n\
    05/09/2025;PRLV SEPA SALLE DE SPORT 0041;-29,90\n";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn embedded_scanner() -> Scanner {
    Scanner::embedded().unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 10), "Netflix");
    assert_eq!(truncate("Salle De Sport Premium", 10), "Salle D...");
    assert_eq!(truncate("Crédit Agricole", 8), "Crédi...");
}

#[test]
fn test_read_statement_strips_bom() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bom.csv", &format!("\u{feff}{}", STATEMENT));

    let content = commands::read_statement(&path).unwrap();
    assert!(content.starts_with("Date;Libelle;Montant"));
}

#[test]
fn test_read_statement_missing_file() {
    let result = commands::read_statement(Path::new("/nonexistent/statement.csv"));
    assert!(result.is_err());
}

// ========== Scan Command Tests ==========

#[test]
fn test_parse_file_auto_detects_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);

    let parsed = commands::parse_file(&embedded_scanner(), &path, None).unwrap();
    assert_eq!(parsed.profile, "Credit Agricole");
    assert_eq!(parsed.transactions.len(), 4);
}

#[test]
fn test_parse_file_with_named_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);

    // Profile names are matched case-insensitively
    let parsed = commands::parse_file(&embedded_scanner(), &path, Some("credit agricole")).unwrap();
    assert_eq!(parsed.profile, "Credit Agricole");
}

#[test]
fn test_parse_file_unknown_bank_lists_profiles() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);

    let err = commands::parse_file(&embedded_scanner(), &path, Some("Monzo")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Monzo"));
    assert!(message.contains("Available profiles"));
    assert!(message.contains("Boursobank"));
}

#[test]
fn test_detect_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);

    let scanner = embedded_scanner();
    let parsed = commands::parse_file(&scanner, &path, None).unwrap();
    let subs = scanner.detect(&parsed);

    let names: Vec<&str> = subs.iter().map(|s| s.service_name.as_str()).collect();
    assert_eq!(names, vec!["Salle De Sport", "Netflix"]);
    assert_eq!(subs[0].confidence, Confidence::Medium);
    assert_eq!(subs[1].confidence, Confidence::High);
}

#[test]
fn test_cmd_scan() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);
    let config = write_file(&dir, "subscout.toml", "");

    assert!(commands::cmd_scan(Some(&config), &path, None, false).is_ok());
    assert!(commands::cmd_scan(Some(&config), &path, None, true).is_ok());
}

#[test]
fn test_cmd_scan_empty_statement() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.csv", "Date;Libelle;Montant\n");
    let config = write_file(&dir, "subscout.toml", "");

    assert!(commands::cmd_scan(Some(&config), &path, None, false).is_ok());
}

#[test]
fn test_cmd_scan_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "subscout.toml", "");
    let missing = dir.path().join("missing.csv");

    assert!(commands::cmd_scan(Some(&config), &missing, None, false).is_err());
}

#[test]
fn test_cmd_parse() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);
    let config = write_file(&dir, "subscout.toml", "");

    assert!(commands::cmd_parse(Some(&config), &path, None, false).is_ok());
    assert!(commands::cmd_parse(Some(&config), &path, Some("Generic"), true).is_ok());
}

// ========== Config Tests ==========

#[test]
fn test_missing_config_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "ca.csv", STATEMENT);
    let missing = dir.path().join("nope.toml");

    assert!(commands::open_scanner(Some(&missing)).is_err());
    assert!(commands::cmd_scan(Some(&missing), &path, None, false).is_err());
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "subscout.toml", "[detection\nbroken");

    assert!(commands::open_scanner(Some(&config)).is_err());
}

#[test]
fn test_config_override_changes_services() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "subscout.toml",
        r#"
[[services]]
keyword = "salle de sport"
name = "Gym"
icon = "🏋️"
"#,
    );
    let path = write_file(&dir, "ca.csv", STATEMENT);

    let scanner = commands::open_scanner(Some(&config)).unwrap();
    assert_eq!(scanner.detector().normalizer().services().len(), 1);

    let parsed = commands::parse_file(&scanner, &path, None).unwrap();
    let subs = scanner.detect(&parsed);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].service_name, "Gym");
    assert_eq!(subs[0].confidence, Confidence::High);
}

// ========== Listing Command Tests ==========

#[test]
fn test_cmd_profiles() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "subscout.toml", "");
    assert!(commands::cmd_profiles(Some(&config)).is_ok());
}

#[test]
fn test_cmd_services() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "subscout.toml", "");
    assert!(commands::cmd_services(Some(&config)).is_ok());
}
