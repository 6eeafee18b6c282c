use serde::Serialize;
use serde_json::Value;

use crate::core::time::{now_utc, parse_instant};
use crate::core::types::IocType;

pub const DEFAULT_MAX_FEED_IOCS: usize = 10_000;
pub const DEFAULT_MAX_INVALID_RATIO: f64 = 0.1;

pub const INDICATOR_DENSITY: &str = "anomalous_ioc_density";
pub const INDICATOR_PATTERNS: &str = "suspicious_patterns";
pub const INDICATOR_TIMESTAMPS: &str = "unusual_timestamps";
/// Reserved: signature contents are opaque here, verification lives upstream.
pub const INDICATOR_SIGNATURES: &str = "invalid_signatures";

const REQUIRED_FEED_FIELDS: [&str; 4] = ["feed_id", "timestamp", "iocs", "signature"];

/// Poisoning thresholds; defaults are product constants, overridable via
/// `[limits]` in the config file.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    pub max_feed_iocs: usize,
    pub max_invalid_ratio: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_feed_iocs: DEFAULT_MAX_FEED_IOCS,
            max_invalid_ratio: DEFAULT_MAX_INVALID_RATIO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PoisoningVerdict {
    pub poisoned: bool,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedVerdict {
    pub valid: bool,
    pub errors: Vec<String>,
    pub poisoning: PoisoningVerdict,
}

/// Stateless structural and poisoning checks over a raw feed document.
///
/// Total over every JSON shape: anomalies accumulate as error strings, the
/// whole list is reported in one pass, and nothing here ever fails.
#[derive(Debug, Clone, Default)]
pub struct FeedValidator {
    limits: ValidationLimits,
}

impl FeedValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn validate(&self, feed: &Value) -> FeedVerdict {
        let mut errors = Vec::new();

        for field in REQUIRED_FEED_FIELDS {
            if feed.get(field).is_none() {
                errors.push(format!("missing required field '{}'", field));
            }
        }

        let iocs: &[Value] = match feed.get("iocs") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                errors.push("field 'iocs' is not a sequence".to_string());
                &[]
            }
            None => &[],
        };

        let mut invalid_count = 0usize;
        for (index, ioc) in iocs.iter().enumerate() {
            let ioc_errors = ioc_structural_errors(index, ioc);
            if !ioc_errors.is_empty() {
                invalid_count += 1;
                errors.extend(ioc_errors);
            }
        }

        let indicators = self.poisoning_indicators(feed, iocs, invalid_count);
        let poisoned = !indicators.is_empty();
        if poisoned {
            errors.push(format!("Feed poisoning detected: {}", indicators.join(", ")));
            tracing::debug!(indicators = ?indicators, "poisoning indicators fired");
        }

        FeedVerdict {
            valid: errors.is_empty(),
            errors,
            poisoning: PoisoningVerdict {
                poisoned,
                indicators,
            },
        }
    }

    fn poisoning_indicators(
        &self,
        feed: &Value,
        iocs: &[Value],
        invalid_count: usize,
    ) -> Vec<String> {
        let mut indicators = Vec::new();
        let now = now_utc();

        if iocs.len() > self.limits.max_feed_iocs {
            indicators.push(INDICATOR_DENSITY.to_string());
        }

        // Empty feeds never trip the ratio: 0 > 0 * ratio is false.
        if invalid_count as f64 > iocs.len() as f64 * self.limits.max_invalid_ratio {
            indicators.push(INDICATOR_PATTERNS.to_string());
        }

        let feed_ts_unusual = match feed.get("timestamp").and_then(Value::as_str) {
            Some(raw) => match parse_instant(raw) {
                Some(ts) => ts > now,
                None => true,
            },
            // Absent or non-string: unparseable, same indicator.
            None => true,
        };
        let ioc_ts_unusual = iocs.iter().any(|ioc| {
            ioc.get("last_seen")
                .and_then(Value::as_str)
                .and_then(parse_instant)
                .map(|ts| ts > now)
                .unwrap_or(false)
        });
        if feed_ts_unusual || ioc_ts_unusual {
            indicators.push(INDICATOR_TIMESTAMPS.to_string());
        }

        indicators
    }
}

fn ioc_structural_errors(index: usize, ioc: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !ioc.is_object() {
        errors.push(format!("ioc {}: not an object", index));
        return errors;
    }

    match ioc.get("type") {
        None => errors.push(format!("ioc {}: missing required field 'type'", index)),
        Some(Value::String(kind)) => {
            if IocType::parse(kind).is_none() {
                errors.push(format!("ioc {}: unknown type '{}'", index, kind));
            }
        }
        Some(_) => errors.push(format!("ioc {}: field 'type' is not a string", index)),
    }

    if ioc.get("value").is_none() {
        errors.push(format!("ioc {}: missing required field 'value'", index));
    }

    match ioc.get("confidence") {
        None => errors.push(format!(
            "ioc {}: missing required field 'confidence'",
            index
        )),
        Some(raw) => match raw.as_f64() {
            Some(conf) if (0.0..=1.0).contains(&conf) => {}
            Some(conf) => errors.push(format!(
                "ioc {}: confidence {} outside [0.0, 1.0]",
                index, conf
            )),
            None => errors.push(format!("ioc {}: field 'confidence' is not a number", index)),
        },
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ioc_errors_report_zero_based_index() {
        let errors = ioc_structural_errors(3, &json!({"value": "x"}));
        assert!(errors.iter().any(|e| e.starts_with("ioc 3:")));
    }

    #[test]
    fn valid_ioc_has_no_errors() {
        let ioc = json!({"type": "ip", "value": "192.0.2.1", "confidence": 0.5});
        assert!(ioc_structural_errors(0, &ioc).is_empty());
    }

    #[test]
    fn confidence_bounds_are_inclusive() {
        for conf in [0.0, 1.0] {
            let ioc = json!({"type": "ip", "value": "192.0.2.1", "confidence": conf});
            assert!(ioc_structural_errors(0, &ioc).is_empty());
        }
        let ioc = json!({"type": "ip", "value": "192.0.2.1", "confidence": 1.01});
        assert_eq!(ioc_structural_errors(0, &ioc).len(), 1);
    }
}
