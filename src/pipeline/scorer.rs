use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::core::time::{now_utc, parse_instant};
use crate::core::types::{CorrelationRecord, Ioc};

pub const DEFAULT_BASE_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.5;
pub const DECAY_HORIZON_DAYS: f64 = 90.0;

pub const TAG_MALWARE: &str = "malware";
pub const TAG_RANSOMWARE: &str = "ransomware";
pub const TAG_FALSE_POSITIVE: &str = "false_positive";

const THREAT_TAG_BOOST: f64 = 1.1;
const FALSE_POSITIVE_PENALTY: f64 = 0.5;
const CORRELATION_BOOST_STEP: f64 = 0.05;
const CORRELATION_BOOST_CAP: f64 = 0.2;
const DIVERSITY_BOOST_STEP: f64 = 0.05;
const DIVERSITY_BOOST_CAP: f64 = 0.15;

/// Stateless advisory scorer. Both operations are total: bad inputs degrade
/// to the documented defaults and the affected adjustment is skipped.
#[derive(Debug, Clone)]
pub struct Scorer {
    source_weights: BTreeMap<String, f64>,
    default_weight: f64,
    decay_horizon_days: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        let mut source_weights = BTreeMap::new();
        source_weights.insert("misp".to_string(), 0.9);
        source_weights.insert("otx".to_string(), 0.8);
        source_weights.insert("talos".to_string(), 0.85);
        source_weights.insert("threatfox".to_string(), 0.75);
        source_weights.insert("internal".to_string(), 0.95);
        Self {
            source_weights,
            default_weight: DEFAULT_SOURCE_WEIGHT,
            decay_horizon_days: DECAY_HORIZON_DAYS,
        }
    }
}

impl Scorer {
    pub fn from_config(cfg: &ScoringConfig) -> Self {
        let mut scorer = Scorer::default();
        for (source, weight) in &cfg.source_weights {
            scorer.source_weights.insert(source.clone(), *weight);
        }
        scorer.default_weight = cfg.default_reputation;
        scorer.decay_horizon_days = cfg.decay_horizon_days;
        scorer
    }

    /// Reputation weight for a source; unknown sources get the default.
    pub fn source_weight(&self, source: &str) -> f64 {
        self.source_weights
            .get(source)
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Advisory confidence for a single IOC: base confidence, source
    /// reputation, recency decay, tag adjustments, clamped to [0, 1].
    pub fn score_ioc(&self, ioc: &Ioc) -> f64 {
        let mut score = ioc.confidence.unwrap_or(DEFAULT_BASE_CONFIDENCE);
        score *= self.source_weight(ioc.source_id());
        score *= self.recency_factor(ioc);

        if ioc.has_tag(TAG_MALWARE) || ioc.has_tag(TAG_RANSOMWARE) {
            score *= THREAT_TAG_BOOST;
        }
        if ioc.has_tag(TAG_FALSE_POSITIVE) {
            score *= FALSE_POSITIVE_PENALTY;
        }

        score.clamp(0.0, 1.0)
    }

    /// Correlation evidence boost: additive bumps for correlation count and
    /// source diversity, each capped, then clamped to [0, 1].
    pub fn score_correlation(&self, record: &CorrelationRecord) -> f64 {
        let mut score = record.correlated_confidence;
        if record.correlation_count > 1 {
            score += (CORRELATION_BOOST_STEP * record.correlation_count as f64)
                .min(CORRELATION_BOOST_CAP);
        }
        if record.sources.len() > 1 {
            score += (DIVERSITY_BOOST_STEP * record.sources.len() as f64).min(DIVERSITY_BOOST_CAP);
        }
        score.clamp(0.0, 1.0)
    }

    /// Linear decay past the horizon; identity inside it. An unparseable
    /// `last_seen` skips decay silently, so scoring never fails.
    fn recency_factor(&self, ioc: &Ioc) -> f64 {
        let Some(raw) = ioc.last_seen.as_deref() else {
            return 1.0;
        };
        let Some(last_seen) = parse_instant(raw) else {
            tracing::debug!(value = %ioc.value, last_seen = raw, "unparseable last_seen, decay skipped");
            return 1.0;
        };
        let age_days =
            now_utc().signed_duration_since(last_seen).num_seconds() as f64 / 86_400.0;
        if age_days <= self.decay_horizon_days {
            return 1.0;
        }
        (1.0 - (age_days - self.decay_horizon_days) / self.decay_horizon_days).max(0.0)
    }
}
