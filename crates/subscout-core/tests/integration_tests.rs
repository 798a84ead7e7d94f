//! Integration tests for subscout-core
//!
//! These tests exercise the full statement text → subscriptions workflow.

use chrono::NaiveDate;
use subscout_core::{Confidence, Config, CostEstimate, Scanner};

/// Credit Agricole export with a monthly gym charge, a known streaming service,
/// an energy bill and one-off purchases
fn credit_agricole_statement() -> &'static str {
    "Date;Libelle;Montant\n\
     28/10/2025;CB CARREFOUR MARKET 27/10;-54,12\n\
     15/10/2025;PRLV SEPA EDF CLIENTS PARTICULIERS;-89,90\n\
     05/10/2025;PRLV SEPA SALLE DE SPORT 0042;-29,90\n\
     01/10/2025;CB NETFLIX.COM 01/10/25;-13,49\n\
     30/09/2025;VIR SALAIRE ACME;2500,00\n\
     05/09/2025;PRLV SEPA SALLE DE SPORT 0041;-29,90\n\
     03/09/2025;CB FNAC PARIS 02/09;-129,00\n\
     01/09/2025;CB NETFLIX.COM 01/09/25;-13,49\n"
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// End-to-end detection
// =============================================================================

#[test]
fn test_credit_agricole_end_to_end() {
    let scanner = Scanner::embedded().unwrap();
    let subs = scanner.scan(credit_agricole_statement());

    let names: Vec<&str> = subs.iter().map(|s| s.service_name.as_str()).collect();
    // One-off merchants (groceries, FNAC, the salary line) appear once and are dropped
    assert_eq!(names, vec!["EDF", "Salle De Sport", "Netflix"]);

    let edf = &subs[0];
    assert_eq!(edf.monthly_cost, 89.90);
    assert_eq!(edf.confidence, Confidence::High);
    assert_eq!(edf.renewal_date, date(2025, 11, 15));

    let gym = &subs[1];
    assert_eq!(gym.monthly_cost, 29.90);
    assert_eq!(gym.confidence, Confidence::Medium);
    assert_eq!(gym.icon, "S");
    assert_eq!(gym.renewal_date, date(2025, 11, 5));

    let netflix = &subs[2];
    assert_eq!(netflix.icon, "🎬");
    assert_eq!(netflix.renewal_date, date(2025, 11, 1));
}

#[test]
fn test_netflix_singleton() {
    let scanner = Scanner::embedded().unwrap();
    let subs = scanner.scan("Date;Libelle;Montant\n01/10/2025;CB NETFLIX.COM 01/10/25;-13,49\n");

    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].service_name, "Netflix");
    assert_eq!(subs[0].confidence, Confidence::High);
}

#[test]
fn test_unknown_merchant_needs_two_charges() {
    let scanner = Scanner::embedded().unwrap();

    let single = "date,description,amount\n2025-10-01,ASSURANCE MAIF,-42.00\n";
    assert!(scanner.scan(single).is_empty());

    let pair = "date,description,amount\n\
                2025-10-01,ASSURANCE MAIF,-42.00\n\
                2025-09-01,ASSURANCE MAIF,-42.00\n";
    let subs = scanner.scan(pair);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].confidence, Confidence::Medium);
}

#[test]
fn test_interval_boundaries_through_csv() {
    let scanner = Scanner::embedded().unwrap();
    let statement = |older: &str| {
        format!(
            "date,description,amount\n2025-10-20,ASSURANCE MAIF,-42.00\n{},ASSURANCE MAIF,-42.00\n",
            older
        )
    };

    // 19 and 20 days before 2025-10-20
    assert!(scanner.scan(&statement("2025-10-01")).is_empty());
    assert_eq!(scanner.scan(&statement("2025-09-30")).len(), 1);
}

#[test]
fn test_boursobank_concatenated_statement() {
    let text = "Compte courant -- Releve du 01/09/2025 au 30/10/2025\n\
                01092025-1349CB NETFLIX.COM 0109202501234567\n\
                03092025-2990PRLV SALLE DE SPORT\n\
                15092025+250000VIR SALAIRE ACME\n\
                01102025-1349CB NETFLIX.COM 0110202509876543\n\
                03102025-2990PRLV SALLE DE SPORT\n";

    let scanner = Scanner::embedded().unwrap();
    let parsed = scanner.parse(text);
    assert_eq!(parsed.profile, "Boursobank");
    assert_eq!(parsed.transactions.len(), 4);
    assert!(parsed.transactions.windows(2).all(|w| w[0].date <= w[1].date));

    let subs = scanner.detect(&parsed);
    let names: Vec<&str> = subs.iter().map(|s| s.service_name.as_str()).collect();
    assert_eq!(names, vec!["Salle De Sport", "Netflix"]);
    assert_eq!(subs[1].renewal_date, date(2025, 11, 1));
}

#[test]
fn test_sort_order() {
    let scanner = Scanner::embedded().unwrap();
    let subs = scanner.scan(
        "date,description,amount\n\
         2025-10-01,SPOTIFY,-5.00\n\
         2025-10-02,PRLV EDF,-50.00\n\
         2025-10-03,NETFLIX,-12.00\n",
    );
    let costs: Vec<f64> = subs.iter().map(|s| s.monthly_cost).collect();
    assert_eq!(costs, vec![50.0, 12.0, 5.0]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_scan_is_idempotent() {
    let scanner = Scanner::embedded().unwrap();
    let first = scanner.scan(credit_agricole_statement());
    let second = scanner.scan(credit_agricole_statement());
    assert_eq!(first, second);

    // A separately built scanner gives the same answer
    let other = Scanner::embedded().unwrap();
    assert_eq!(first, other.scan(credit_agricole_statement()));
}

#[test]
fn test_amounts_never_negative() {
    let scanner = Scanner::embedded().unwrap();
    let parsed = scanner.parse(credit_agricole_statement());
    assert!(parsed.transactions.iter().all(|t| t.amount > 0.0));

    let subs = scanner.detect(&parsed);
    assert!(subs.iter().all(|s| s.monthly_cost >= 0.0));
}

#[test]
fn test_json_output_shape() {
    let scanner = Scanner::embedded().unwrap();
    let subs = scanner.scan("Date;Libelle;Montant\n01/10/2025;CB NETFLIX.COM 01/10/25;-13,49\n");
    let json = serde_json::to_value(&subs).unwrap();

    assert_eq!(
        json,
        serde_json::json!([{
            "service_name": "Netflix",
            "monthly_cost": 13.49,
            "renewal_date": "2025-11-01",
            "confidence": "high",
            "icon": "🎬"
        }])
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_mean_cost_from_config() {
    let config = Config::from_toml("[detection]\ncost_estimate = \"mean\"\n").unwrap();
    assert_eq!(config.detection.cost_estimate, CostEstimate::Mean);

    let scanner = Scanner::from_config(config).unwrap();
    let subs = scanner.scan(
        "date,description,amount\n\
         2025-10-01,PRLV EDF,-100.00\n\
         2025-09-01,PRLV EDF,-80.00\n",
    );
    assert_eq!(subs[0].monthly_cost, 90.0);
}

#[test]
fn test_custom_service_table() {
    let config = Config::from_toml(
        r#"
[[services]]
keyword = "assurance maif"
name = "MAIF"
icon = "🛡️"
"#,
    )
    .unwrap();

    let scanner = Scanner::from_config(config).unwrap();
    let subs = scanner.scan("date,description,amount\n2025-10-01,PRLV ASSURANCE MAIF,-42.00\n");
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].service_name, "MAIF");
    assert_eq!(subs[0].confidence, Confidence::High);

    // Netflix is no longer known, so a single charge is not enough
    assert!(scanner
        .scan("date,description,amount\n2025-10-01,NETFLIX,-13.49\n")
        .is_empty());
}

#[test]
fn test_config_without_fallback_profile_is_rejected() {
    let config = Config::from_toml(
        r#"
[[profiles]]
name = "Only"
separator = ";"
"#,
    )
    .unwrap();
    assert!(Scanner::from_config(config).is_err());
}
