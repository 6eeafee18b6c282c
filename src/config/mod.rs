use std::collections::BTreeMap;
use std::{fs, path::Path};

use serde::Deserialize;

use crate::core::error::FusionError;
use crate::pipeline::scorer::{DECAY_HORIZON_DAYS, DEFAULT_SOURCE_WEIGHT};
use crate::pipeline::validator::{
    ValidationLimits, DEFAULT_MAX_FEED_IOCS, DEFAULT_MAX_INVALID_RATIO,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub source_weights: BTreeMap<String, f64>,
    pub default_reputation: f64,
    pub decay_horizon_days: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            source_weights: BTreeMap::new(),
            default_reputation: DEFAULT_SOURCE_WEIGHT,
            decay_horizon_days: DECAY_HORIZON_DAYS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_feed_iocs: usize,
    pub max_invalid_ratio: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_feed_iocs: DEFAULT_MAX_FEED_IOCS,
            max_invalid_ratio: DEFAULT_MAX_INVALID_RATIO,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub scoring: ScoringConfig,
    pub limits: LimitsConfig,
}

impl FusionConfig {
    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_feed_iocs: self.limits.max_feed_iocs,
            max_invalid_ratio: self.limits.max_invalid_ratio,
        }
    }
}

/// Loads TOML config; a missing file (or no path at all) falls back to the
/// built-in product defaults.
pub fn load_config(path: Option<&Path>) -> Result<FusionConfig, FusionError> {
    let Some(path) = path else {
        return Ok(FusionConfig::default());
    };
    if !path.exists() {
        return Err(FusionError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path).map_err(|e| FusionError::Config(e.to_string()))?;
    let cfg: FusionConfig = toml::from_str(&content)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_constants() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.limits.max_feed_iocs, 10_000);
        assert!((cfg.scoring.decay_horizon_days - 90.0).abs() < f64::EPSILON);
        assert!((cfg.scoring.default_reputation - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg: FusionConfig = toml::from_str(
            r#"
            [scoring]
            default_reputation = 0.3
            [scoring.source_weights]
            misp = 0.99
            "#,
        )
        .unwrap();
        assert!((cfg.scoring.default_reputation - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.scoring.source_weights.get("misp"), Some(&0.99));
        assert_eq!(cfg.limits.max_feed_iocs, 10_000);
    }
}
