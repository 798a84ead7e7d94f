//! SubScout Core Library
//!
//! Turns raw bank statement exports into detected subscriptions:
//! - Statement parsers for delimited and concatenated bank layouts
//! - Merchant label normalization against a known-service table
//! - Recurrence detection with confidence tiers
//! - TOML configuration for services, bank profiles and thresholds
//!
//! Everything here is a pure function of the input text; nothing is persisted.

pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod models;
pub mod normalize;
pub mod scanner;

pub use config::Config;
pub use detect::{CostEstimate, DetectionConfig, SubscriptionDetector};
pub use error::{Error, Result};
pub use import::StatementParser;
pub use models::{
    BankProfile, Confidence, ConfidencePolicy, DetectedSubscription, KnownService,
    ParsedStatement, Transaction,
};
pub use normalize::{MerchantKey, MerchantNormalizer};
pub use scanner::Scanner;
