//! Configuration listing commands

use std::path::Path;

use anyhow::Result;
use subscout_core::models::Layout;

use super::{open_scanner, truncate};

pub fn cmd_profiles(config: Option<&Path>) -> Result<()> {
    let scanner = open_scanner(config)?;
    let profiles = scanner.parser().profiles();

    println!();
    println!("🏦 Bank Profiles ({})", profiles.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for profile in profiles {
        let layout = match profile.layout {
            Layout::Delimited => format!("'{}' delimited", profile.separator as char),
            Layout::Concatenated => "concatenated".to_string(),
        };

        let mut flags = Vec::new();
        if !profile.auto_detect {
            flags.push("manual");
        }
        if profile.fallback {
            flags.push("fallback");
        }

        println!(
            "   {:18} │ {:15} │ {:10} │ {}",
            truncate(&profile.name, 18),
            layout,
            profile.date_format.as_str(),
            flags.join(", ")
        );
    }

    Ok(())
}

pub fn cmd_services(config: Option<&Path>) -> Result<()> {
    let scanner = open_scanner(config)?;
    let services = scanner.detector().normalizer().services();

    println!();
    println!("⭐ Known Services ({})", services.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for service in services {
        println!(
            "   {:2} {:20} │ {}",
            service.icon,
            truncate(&service.name, 20),
            service.keyword
        );
    }

    Ok(())
}
