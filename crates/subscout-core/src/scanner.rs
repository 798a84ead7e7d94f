//! Statement text in, detected subscriptions out

use tracing::info;

use crate::config::Config;
use crate::detect::SubscriptionDetector;
use crate::error::{Error, Result};
use crate::import::StatementParser;
use crate::models::{DetectedSubscription, ParsedStatement};
use crate::normalize::MerchantNormalizer;

/// Parser and detector built from one configuration
#[derive(Debug, Clone)]
pub struct Scanner {
    parser: StatementParser,
    detector: SubscriptionDetector,
}

impl Scanner {
    /// Create a scanner from the resolved configuration (override file or defaults)
    pub fn new() -> Result<Self> {
        Self::from_config(Config::load(None)?)
    }

    /// Create a scanner from the embedded defaults only
    pub fn embedded() -> Result<Self> {
        Self::from_config(Config::embedded()?)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let normalizer = MerchantNormalizer::new(config.services, &config.boilerplate)?;
        Ok(Self {
            parser: StatementParser::new(config.profiles)?,
            detector: SubscriptionDetector::new(normalizer, config.detection),
        })
    }

    pub fn parser(&self) -> &StatementParser {
        &self.parser
    }

    pub fn detector(&self) -> &SubscriptionDetector {
        &self.detector
    }

    /// Parse a statement, detecting its layout
    pub fn parse(&self, text: &str) -> ParsedStatement {
        self.parser.parse(text)
    }

    /// Parse a statement with a named bank profile
    pub fn parse_with_profile(&self, text: &str, profile: &str) -> Result<ParsedStatement> {
        let profile = self
            .parser
            .profile(profile)
            .ok_or_else(|| Error::UnsupportedBank(profile.to_string()))?;
        Ok(self.parser.parse_with(text, profile))
    }

    /// Detect subscriptions in a statement, detecting its layout
    pub fn scan(&self, text: &str) -> Vec<DetectedSubscription> {
        let parsed = self.parse(text);
        self.detect(&parsed)
    }

    /// Detect subscriptions in a statement read with a named bank profile
    pub fn scan_with_profile(&self, text: &str, profile: &str) -> Result<Vec<DetectedSubscription>> {
        let parsed = self.parse_with_profile(text, profile)?;
        Ok(self.detect(&parsed))
    }

    /// Run detection on parser output, honoring the profile's confidence policy
    pub fn detect(&self, parsed: &ParsedStatement) -> Vec<DetectedSubscription> {
        let policy = self
            .parser
            .profile(&parsed.profile)
            .and_then(|p| p.confidence)
            .unwrap_or(self.detector.config().confidence);

        let subscriptions = self.detector.detect_with(&parsed.transactions, policy);
        info!(
            "Detected {} subscriptions in {} {} transactions",
            subscriptions.len(),
            parsed.transactions.len(),
            parsed.profile
        );
        subscriptions
    }
}
