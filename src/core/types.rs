use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of indicator kinds the core understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IocType {
    Ip,
    Domain,
    Hash,
    Url,
    Email,
}

impl IocType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ip" => Some(IocType::Ip),
            "domain" => Some(IocType::Domain),
            "hash" => Some(IocType::Hash),
            "url" => Some(IocType::Url),
            "email" => Some(IocType::Email),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IocType::Ip => "ip",
            IocType::Domain => "domain",
            IocType::Hash => "hash",
            IocType::Url => "url",
            IocType::Email => "email",
        }
    }
}

/// One observation claimed by a feed source.
///
/// `last_seen` stays a raw wire string: parsing happens in the validator and
/// scorer so a bad date degrades instead of failing deserialization.
/// Unrecognized fields survive a round trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ioc {
    #[serde(rename = "type")]
    pub ioc_type: IocType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Ioc {
    pub fn new(ioc_type: IocType, value: impl Into<String>) -> Self {
        Self {
            ioc_type,
            value: value.into(),
            confidence: None,
            source: None,
            last_seen: None,
            tags: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Source identifier for correlation; absent sources map to "unknown".
    pub fn source_id(&self) -> &str {
        self.source.as_deref().unwrap_or("unknown")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Lenient construction from raw JSON; callers validate first.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// A timestamped batch of IOCs from a single provider.
///
/// `signature` is an opaque blob; the core only checks its presence,
/// verification is delegated upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub feed_id: String,
    pub timestamp: String,
    pub iocs: Vec<Ioc>,
    pub signature: Value,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Fusion of one query IOC with all previously indexed IOCs sharing its
/// `(type, value)` identity. Strictly advisory; the flag is encoded in-band
/// so consumers cannot mistake records for enforcement verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub ioc: Ioc,
    pub correlation_count: usize,
    pub correlated_confidence: f64,
    pub sources: BTreeSet<String>,
    pub advisory: bool,
}
