//! Merchant identity normalization
//!
//! A statement label maps either to a known service (keyword match) or to a
//! cleaned fragment with banking boilerplate, dates and digits removed.

use regex::Regex;

use crate::error::Result;
use crate::models::KnownService;

/// Grouping identity of a transaction label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MerchantKey {
    /// Index into the known-service table
    Known(usize),
    /// Cleaned, lowercase label
    Unknown(String),
}

/// One cleanup step applied to unknown labels
#[derive(Debug, Clone)]
struct NormalizationRule {
    pattern: Regex,
    replacement: &'static str,
}

impl NormalizationRule {
    fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: " ",
        })
    }
}

/// Maps raw labels to merchant keys
#[derive(Debug, Clone)]
pub struct MerchantNormalizer {
    services: Vec<KnownService>,
    rules: Vec<NormalizationRule>,
}

impl MerchantNormalizer {
    /// Build a normalizer from the known-service table and boilerplate tokens
    ///
    /// Rules run in order: boilerplate words, embedded dates (`DD/MM`,
    /// `DD/MM/YY`), standalone digit runs, non-letters, then whitespace runs.
    pub fn new(services: Vec<KnownService>, boilerplate: &[String]) -> Result<Self> {
        let services = services
            .into_iter()
            .map(|s| KnownService {
                keyword: s.keyword.to_lowercase(),
                ..s
            })
            .collect();

        let mut rules = Vec::new();
        let tokens: Vec<String> = boilerplate
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();
        if !tokens.is_empty() {
            rules.push(NormalizationRule::new(&format!(
                r"(?i)\b(?:{})\b",
                tokens.join("|")
            ))?);
        }
        rules.push(NormalizationRule::new(
            r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b",
        )?);
        rules.push(NormalizationRule::new(r"\b\d+\b")?);
        rules.push(NormalizationRule::new(r"[^\p{L}\s]")?);
        rules.push(NormalizationRule::new(r"\s+")?);

        Ok(Self { services, rules })
    }

    pub fn services(&self) -> &[KnownService] {
        &self.services
    }

    /// Resolve a known-service key to its table entry
    pub fn service(&self, key: &MerchantKey) -> Option<&KnownService> {
        match key {
            MerchantKey::Known(idx) => self.services.get(*idx),
            MerchantKey::Unknown(_) => None,
        }
    }

    /// First known service whose keyword appears in the label
    pub fn find_known_service(&self, label: &str) -> Option<usize> {
        let lower = label.to_lowercase();
        self.services
            .iter()
            .position(|s| !s.keyword.is_empty() && lower.contains(&s.keyword))
    }

    /// Strip boilerplate from a label, returning a lowercase key fragment
    pub fn clean_label(&self, label: &str) -> String {
        let mut cleaned = label.to_string();
        for rule in &self.rules {
            cleaned = rule
                .pattern
                .replace_all(&cleaned, rule.replacement)
                .into_owned();
        }
        cleaned.trim().to_lowercase()
    }

    /// Grouping key for a label; `None` when nothing identifying is left
    pub fn normalize(&self, label: &str) -> Option<MerchantKey> {
        if let Some(idx) = self.find_known_service(label) {
            return Some(MerchantKey::Known(idx));
        }

        let cleaned = self.clean_label(label);
        if cleaned.is_empty() {
            None
        } else {
            Some(MerchantKey::Unknown(cleaned))
        }
    }
}

/// Title-case a cleaned label and cap its length, appending "..." when cut
pub fn display_name(cleaned: &str, max_len: usize) -> String {
    let titled = cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if titled.chars().count() > max_len {
        let cut: String = titled.chars().take(max_len).collect();
        format!("{}...", cut.trim_end())
    } else {
        titled
    }
}
