//! Subscription detection
//!
//! Groups transactions by merchant identity and keeps the groups that recur:
//! - Known services are always kept (high confidence), even with a single charge
//! - Unknown merchants need two charges whose gap is monthly or annual
//!
//! Output is sorted by descending monthly cost.

use std::collections::HashMap;

use chrono::Months;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    Confidence, ConfidencePolicy, DetectedSubscription, Frequency, Transaction,
};
use crate::normalize::{display_name, MerchantKey, MerchantNormalizer};

/// How the monthly cost of a group is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostEstimate {
    /// Amount of the most recent charge
    #[default]
    Latest,
    /// Arithmetic mean of all charges in the group
    Mean,
}

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub cost_estimate: CostEstimate,
    /// Tier rules for unknown merchants
    pub confidence: ConfidencePolicy,
    /// Minimum charges before an unknown merchant is considered
    pub min_occurrences: usize,
    /// Inclusive day-gap bounds for a monthly cadence
    pub monthly_window: (i64, i64),
    /// Inclusive day-gap bounds for an annual cadence
    pub annual_window: (i64, i64),
    /// Gap at or above which the renewal date is pushed a year out
    pub annual_threshold_days: i64,
    /// Downgrade annual matches whose third charge is not a year earlier
    pub confirm_annual_cadence: bool,
    /// Display-name cap for unknown merchants
    pub label_max_len: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cost_estimate: CostEstimate::Latest,
            confidence: ConfidencePolicy::ByCount,
            min_occurrences: 2,
            monthly_window: (20, 45),
            annual_window: (350, 380),
            annual_threshold_days: 300,
            confirm_annual_cadence: false,
            label_max_len: 20,
        }
    }
}

/// Transactions sharing one merchant identity, newest first
#[derive(Debug, Clone)]
pub struct TransactionGroup<'a> {
    pub key: MerchantKey,
    pub transactions: Vec<&'a Transaction>,
}

impl TransactionGroup<'_> {
    /// Days between the two most recent charges
    fn latest_gap(&self) -> Option<i64> {
        self.gap_at(0)
    }

    /// Days between charge `idx` and the one before it
    fn gap_at(&self, idx: usize) -> Option<i64> {
        let newer = self.transactions.get(idx)?;
        let older = self.transactions.get(idx + 1)?;
        Some((newer.date - older.date).num_days().abs())
    }
}

/// Detects recurring subscriptions in a list of transactions
#[derive(Debug, Clone)]
pub struct SubscriptionDetector {
    normalizer: MerchantNormalizer,
    config: DetectionConfig,
}

impl SubscriptionDetector {
    pub fn new(normalizer: MerchantNormalizer, config: DetectionConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &MerchantNormalizer {
        &self.normalizer
    }

    /// Detect subscriptions using the configured confidence policy
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<DetectedSubscription> {
        self.detect_with(transactions, self.config.confidence)
    }

    /// Detect subscriptions with an explicit confidence policy for unknown merchants
    pub fn detect_with(
        &self,
        transactions: &[Transaction],
        policy: ConfidencePolicy,
    ) -> Vec<DetectedSubscription> {
        let mut subscriptions: Vec<DetectedSubscription> = self
            .group(transactions)
            .iter()
            .filter_map(|group| self.evaluate(group, policy))
            .collect();

        // Stable: equal costs keep first-seen order
        subscriptions.sort_by(|a, b| b.monthly_cost.total_cmp(&a.monthly_cost));
        subscriptions
    }

    /// Group transactions by merchant key in first-seen order
    ///
    /// Labels that normalize to nothing are left out.
    pub fn group<'a>(&self, transactions: &'a [Transaction]) -> Vec<TransactionGroup<'a>> {
        let mut groups: Vec<TransactionGroup<'a>> = Vec::new();
        let mut index: HashMap<MerchantKey, usize> = HashMap::new();

        for tx in transactions {
            let Some(key) = self.normalizer.normalize(&tx.label) else {
                debug!("No merchant identity in label: {}", tx.label);
                continue;
            };

            let idx = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(TransactionGroup {
                    key,
                    transactions: Vec::new(),
                });
                groups.len() - 1
            });
            groups[idx].transactions.push(tx);
        }

        for group in &mut groups {
            group.transactions.sort_by(|a, b| b.date.cmp(&a.date));
        }

        groups
    }

    fn evaluate(
        &self,
        group: &TransactionGroup<'_>,
        policy: ConfidencePolicy,
    ) -> Option<DetectedSubscription> {
        let newest = group.transactions.first()?;
        let gap = group.latest_gap();

        let (service_name, icon, confidence) = match self.normalizer.service(&group.key) {
            Some(service) => (service.name.clone(), service.icon.clone(), Confidence::High),
            None => {
                let MerchantKey::Unknown(cleaned) = &group.key else {
                    return None;
                };
                let confidence = self.unknown_confidence(group, policy)?;
                let name = display_name(cleaned, self.config.label_max_len);
                let icon = initial(&name);
                (name, icon, confidence)
            }
        };

        let frequency = match gap {
            Some(days) if days >= self.config.annual_threshold_days => Frequency::Yearly,
            _ => Frequency::Monthly,
        };

        let months = match frequency {
            Frequency::Monthly => 1,
            Frequency::Yearly => 12,
        };
        let renewal_date = newest.date.checked_add_months(Months::new(months))?;

        let cost = match self.config.cost_estimate {
            CostEstimate::Latest => newest.amount,
            CostEstimate::Mean => {
                group.transactions.iter().map(|t| t.amount).sum::<f64>()
                    / group.transactions.len() as f64
            }
        };

        debug!(
            "Detected {} ({}, {} charges, {})",
            service_name,
            frequency.as_str(),
            group.transactions.len(),
            confidence
        );

        Some(DetectedSubscription {
            service_name,
            monthly_cost: round_cents(cost),
            renewal_date,
            confidence,
            icon,
        })
    }

    /// Recurrence test for merchants outside the known-service table
    fn unknown_confidence(
        &self,
        group: &TransactionGroup<'_>,
        policy: ConfidencePolicy,
    ) -> Option<Confidence> {
        let count = group.transactions.len();
        if count < self.config.min_occurrences {
            return None;
        }

        let gap = group.latest_gap()?;
        let annual = in_window(gap, self.config.annual_window);
        if !annual && !in_window(gap, self.config.monthly_window) {
            debug!("Rejected {:?}: {} day gap is not a billing cadence", group.key, gap);
            return None;
        }

        if annual && self.config.confirm_annual_cadence {
            if let Some(previous) = group.gap_at(1) {
                if !in_window(previous, self.config.annual_window) {
                    return Some(Confidence::Low);
                }
            }
        }

        Some(match policy {
            ConfidencePolicy::ByCount if count >= 3 => Confidence::High,
            ConfidencePolicy::ByCount | ConfidencePolicy::Flat => Confidence::Medium,
        })
    }
}

fn in_window(days: i64, (low, high): (i64, i64)) -> bool {
    (low..=high).contains(&days)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn initial(name: &str) -> String {
    name.chars()
        .find(|c| c.is_alphabetic())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}
