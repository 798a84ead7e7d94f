//! Statement command implementations

use std::path::Path;

use anyhow::Result;
use subscout_core::{Confidence, DetectedSubscription, ParsedStatement, Scanner};

use super::{open_scanner, read_statement, truncate};

/// Parse a statement file, with an explicit bank profile or auto-detection
pub fn parse_file(scanner: &Scanner, file: &Path, bank: Option<&str>) -> Result<ParsedStatement> {
    let content = read_statement(file)?;
    let parsed = match bank {
        Some(name) => scanner.parse_with_profile(&content, name).map_err(|e| {
            let available: Vec<&str> = scanner
                .parser()
                .profiles()
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            anyhow::anyhow!("{}\nAvailable profiles: {}", e, available.join(", "))
        })?,
        None => scanner.parse(&content),
    };
    Ok(parsed)
}

pub fn cmd_scan(config: Option<&Path>, file: &Path, bank: Option<&str>, json: bool) -> Result<()> {
    let scanner = open_scanner(config)?;
    let parsed = parse_file(&scanner, file, bank)?;
    let subscriptions = scanner.detect(&parsed);

    if json {
        println!("{}", serde_json::to_string_pretty(&subscriptions)?);
        return Ok(());
    }

    println!(
        "📥 Read {} transactions from {} ({} format)",
        parsed.transactions.len(),
        file.display(),
        parsed.profile
    );
    if parsed.skipped > 0 {
        println!("   Skipped rows: {}", parsed.skipped);
    }

    print_subscriptions(&subscriptions);
    Ok(())
}

fn print_subscriptions(subscriptions: &[DetectedSubscription]) {
    if subscriptions.is_empty() {
        println!();
        println!("No recurring subscriptions detected.");
        return;
    }

    println!();
    println!("📋 Detected Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    for sub in subscriptions {
        let confidence = match sub.confidence {
            Confidence::High => "●●●",
            Confidence::Medium => "●●○",
            Confidence::Low => "●○○",
        };

        println!(
            "   {:2} {:22} │ {:>9.2} │ renews {} │ {} {}",
            sub.icon,
            truncate(&sub.service_name, 22),
            sub.monthly_cost,
            sub.renewal_date,
            confidence,
            sub.confidence
        );
    }

    let total: f64 = subscriptions.iter().map(|s| s.monthly_cost).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} subscriptions, {:.2} total", subscriptions.len(), total);
}

pub fn cmd_parse(config: Option<&Path>, file: &Path, bank: Option<&str>, json: bool) -> Result<()> {
    let scanner = open_scanner(config)?;
    let parsed = parse_file(&scanner, file, bank)?;

    if json {
        let value = serde_json::json!({
            "profile": parsed.profile,
            "skipped": parsed.skipped,
            "transactions": parsed.transactions,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!(
        "📄 {} transactions ({} format, {} skipped)",
        parsed.transactions.len(),
        parsed.profile,
        parsed.skipped
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &parsed.transactions {
        println!(
            "   {} │ {:40} │ {:>9.2}",
            tx.date,
            truncate(&tx.label, 40),
            tx.amount
        );
    }

    Ok(())
}
