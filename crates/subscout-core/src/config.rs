//! Configuration for the parser and detector
//!
//! Holds the known-service table, bank profiles, label boilerplate and
//! detection thresholds.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Override file (`--config`, or ~/.local/share/subscout/config/subscout.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! The override is layered on top of the defaults: a table it provides
//! (`[[services]]`, `[[profiles]]`, `[normalization]`) replaces the default
//! table, while `[detection]` keys override one at a time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::detect::{CostEstimate, DetectionConfig};
use crate::error::{Error, Result};
use crate::models::{
    BankProfile, Columns, ConfidencePolicy, DateFormat, DebitRule, KnownService, Layout,
};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/subscout.toml");

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub services: Vec<KnownService>,
    pub profiles: Vec<BankProfile>,
    /// Tokens stripped from unknown merchant labels
    pub boilerplate: Vec<String>,
    pub detection: DetectionConfig,
}

impl Config {
    /// The embedded defaults, ignoring any override file
    pub fn embedded() -> Result<Self> {
        let mut config = Self::empty();
        config.apply(DEFAULT_CONFIG)?;
        Ok(config)
    }

    /// Embedded defaults with a TOML override layered on top
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::embedded()?;
        config.apply(content)?;
        Ok(config)
    }

    /// Load configuration (override first, then default)
    ///
    /// An explicit path must exist; the default override location is optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(path)?;
            return Self::from_toml(&content);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                let content = fs::read_to_string(&path)?;
                Self::from_toml(&content)
            }
            _ => Self::embedded(),
        }
    }

    fn empty() -> Self {
        Self {
            services: Vec::new(),
            profiles: Vec::new(),
            boilerplate: Vec::new(),
            detection: DetectionConfig::default(),
        }
    }

    fn apply(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(detection) = raw.detection {
            detection.apply(&mut self.detection)?;
        }

        if let Some(boilerplate) = raw.normalization.and_then(|n| n.boilerplate) {
            self.boilerplate = boilerplate;
        }

        if let Some(services) = raw.services {
            self.services = services;
        }

        if let Some(profiles) = raw.profiles {
            self.profiles = profiles
                .into_iter()
                .map(RawProfile::into_profile)
                .collect::<Result<_>>()?;
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subscout").join("config").join("subscout.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
    normalization: Option<RawNormalization>,
    services: Option<Vec<KnownService>>,
    profiles: Option<Vec<RawProfile>>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    cost_estimate: Option<CostEstimate>,
    confidence: Option<ConfidencePolicy>,
    min_occurrences: Option<usize>,
    monthly_window: Option<[i64; 2]>,
    annual_window: Option<[i64; 2]>,
    annual_threshold_days: Option<i64>,
    confirm_annual_cadence: Option<bool>,
    label_max_len: Option<usize>,
}

impl RawDetection {
    fn apply(self, config: &mut DetectionConfig) -> Result<()> {
        if let Some(cost) = self.cost_estimate {
            config.cost_estimate = cost;
        }
        if let Some(policy) = self.confidence {
            config.confidence = policy;
        }
        if let Some(min) = self.min_occurrences {
            config.min_occurrences = min;
        }
        if let Some(window) = self.monthly_window {
            config.monthly_window = window_bounds("monthly_window", window)?;
        }
        if let Some(window) = self.annual_window {
            config.annual_window = window_bounds("annual_window", window)?;
        }
        if let Some(days) = self.annual_threshold_days {
            config.annual_threshold_days = days;
        }
        if let Some(confirm) = self.confirm_annual_cadence {
            config.confirm_annual_cadence = confirm;
        }
        if let Some(len) = self.label_max_len {
            config.label_max_len = len;
        }
        Ok(())
    }
}

fn window_bounds(name: &str, [low, high]: [i64; 2]) -> Result<(i64, i64)> {
    if low < 0 || low > high {
        return Err(Error::Config(format!(
            "{} must be [low, high] with 0 <= low <= high, got [{}, {}]",
            name, low, high
        )));
    }
    Ok((low, high))
}

#[derive(Debug, Deserialize)]
struct RawNormalization {
    boilerplate: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    name: String,
    layout: Option<Layout>,
    separator: Option<String>,
    date_format: Option<DateFormat>,
    columns: Option<Columns>,
    header_signature: Option<Vec<String>>,
    min_columns: Option<usize>,
    debits: Option<DebitRule>,
    default_label: Option<String>,
    auto_detect: Option<bool>,
    fallback: Option<bool>,
    confidence: Option<ConfidencePolicy>,
}

impl RawProfile {
    fn into_profile(self) -> Result<BankProfile> {
        let separator = match self.separator.as_deref() {
            None => b',',
            Some(s) if s.len() == 1 && s.is_ascii() => s.as_bytes()[0],
            Some(s) => {
                return Err(Error::Config(format!(
                    "Profile {}: separator must be a single ASCII character, got {:?}",
                    self.name, s
                )))
            }
        };

        Ok(BankProfile {
            name: self.name,
            layout: self.layout.unwrap_or_default(),
            separator,
            date_format: self.date_format.unwrap_or_default(),
            columns: self.columns.unwrap_or_default(),
            header_signature: self.header_signature.unwrap_or_default(),
            min_columns: self.min_columns.unwrap_or(0),
            debits: self.debits.unwrap_or_default(),
            default_label: self.default_label.filter(|l| !l.trim().is_empty()),
            auto_detect: self.auto_detect.unwrap_or(true),
            fallback: self.fallback.unwrap_or(false),
            confidence: self.confidence,
        })
    }
}
