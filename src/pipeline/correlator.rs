use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{CorrelationRecord, Ioc, IocType};

pub const SOURCE_DIVERSITY_FACTOR: f64 = 0.1;

type BucketKey = (IocType, String);

/// Process-local index over `(type, value)` plus per-query correlation
/// synthesis. The index is exclusively owned by this instance and grows
/// monotonically; callers rotate instances to bound memory.
#[derive(Debug, Default)]
pub struct Correlator {
    index: BTreeMap<BucketKey, Vec<Ioc>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the bucket for `(type, value)`. Duplicates are retained
    /// and insertion order within a bucket is preserved. Callers validate
    /// first; this never fails for structurally valid IOCs.
    pub fn index_ioc(&mut self, ioc: Ioc) {
        let key = (ioc.ioc_type, ioc.value.clone());
        self.index.entry(key).or_default().push(ioc);
    }

    /// Previously indexed IOCs for a key, in insertion order.
    pub fn bucket(&self, ioc_type: IocType, value: &str) -> Option<&[Ioc]> {
        self.index
            .get(&(ioc_type, value.to_string()))
            .map(Vec::as_slice)
    }

    /// Correlates a query IOC against the index without indexing it.
    pub fn correlate_ioc(&self, ioc: &Ioc) -> CorrelationRecord {
        let bucket = self.bucket(ioc.ioc_type, &ioc.value).unwrap_or(&[]);
        if bucket.is_empty() {
            let mut sources = BTreeSet::new();
            sources.insert(ioc.source_id().to_string());
            return CorrelationRecord {
                ioc: ioc.clone(),
                correlation_count: 0,
                correlated_confidence: ioc.confidence.unwrap_or(0.0),
                sources,
                advisory: true,
            };
        }

        let avg = bucket
            .iter()
            .map(|entry| entry.confidence.unwrap_or(0.0))
            .sum::<f64>()
            / bucket.len() as f64;
        let sources: BTreeSet<String> = bucket
            .iter()
            .map(|entry| entry.source_id().to_string())
            .collect();
        let boosted = avg * (1.0 + SOURCE_DIVERSITY_FACTOR * sources.len() as f64);

        CorrelationRecord {
            ioc: ioc.clone(),
            correlation_count: bucket.len(),
            correlated_confidence: boosted.clamp(0.0, 1.0),
            sources,
            advisory: true,
        }
    }

    /// Maps `correlate_ioc` over the input; output order matches input order.
    pub fn correlate_feed(&self, iocs: &[Ioc]) -> Vec<CorrelationRecord> {
        iocs.iter().map(|ioc| self.correlate_ioc(ioc)).collect()
    }
}
