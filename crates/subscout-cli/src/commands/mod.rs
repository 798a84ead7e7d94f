//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `scan` - Statement commands (scan for subscriptions, show parsed transactions)
//! - `tables` - Configuration listing commands (bank profiles, known services)

pub mod scan;
pub mod tables;

// Re-export command functions for main.rs
pub use scan::*;
pub use tables::*;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use subscout_core::{Config, Scanner};
use tracing::debug;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Resolve configuration and build a scanner
pub fn open_scanner(config_path: Option<&Path>) -> Result<Scanner> {
    let config = Config::load(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load config: {}", path.display()),
        None => "Failed to load config".to_string(),
    })?;
    debug!(
        "Config: {} profiles, {} known services",
        config.profiles.len(),
        config.services.len()
    );
    Scanner::from_config(config).context("Invalid configuration")
}

/// Read a statement file as text, without its byte-order mark
pub fn read_statement(file: &Path) -> Result<String> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    debug!("Read {} bytes from {}", content.len(), file.display());
    if let Some(stripped) = content.strip_prefix('\u{feff}') {
        debug!("Stripped byte-order mark");
        return Ok(stripped.to_string());
    }
    Ok(content)
}
