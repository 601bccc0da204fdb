//! Metric value sources used by rule evaluation
//!
//! A rule's `query` is an opaque series name; a [`MetricValueSource`] turns it
//! into a number.

use crate::utils::error::{Result, WatchError};
use parking_lot::RwLock;
use prometheus::proto::{MetricFamily, MetricType};
use std::collections::HashMap;

/// Resolves a named metric series to its current value
#[async_trait::async_trait]
pub trait MetricValueSource: Send + Sync + std::fmt::Debug {
    async fn value(&self, query: &str) -> Result<f64>;
}

/// Constant-valued source with optional per-series overrides
#[derive(Debug, Default)]
pub struct StaticValueSource {
    default: f64,
    values: RwLock<HashMap<String, f64>>,
}

impl StaticValueSource {
    pub fn new(default: f64) -> Self {
        Self {
            default,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Pin `query` to `value` until changed again
    pub fn set(&self, query: impl Into<String>, value: f64) {
        self.values.write().insert(query.into(), value);
    }
}

#[async_trait::async_trait]
impl MetricValueSource for StaticValueSource {
    async fn value(&self, query: &str) -> Result<f64> {
        Ok(self
            .values
            .read()
            .get(query)
            .copied()
            .unwrap_or(self.default))
    }
}

/// Reads current sample values out of a prometheus registry
///
/// Every sample of the family named by the query is added up, so all label
/// combinations of a counter or gauge contribute. Histogram and summary parts
/// are addressed by their exposed names (`<name>_sum`, `<name>_count`).
#[derive(Debug, Clone)]
pub struct RegistryValueSource {
    registry: prometheus::Registry,
}

impl RegistryValueSource {
    pub fn new(registry: prometheus::Registry) -> Self {
        Self { registry }
    }
}

#[async_trait::async_trait]
impl MetricValueSource for RegistryValueSource {
    async fn value(&self, query: &str) -> Result<f64> {
        sum_series(&self.registry.gather(), query)
            .ok_or_else(|| WatchError::not_found(format!("metric series {}", query)))
    }
}

#[derive(Debug, Clone, Copy)]
enum SeriesPart {
    Value,
    Sum,
    Count,
}

/// Sum of all samples of `series`, `None` if no family exposes it
fn sum_series(families: &[MetricFamily], series: &str) -> Option<f64> {
    let mut total = None;

    for family in families {
        let name = family.name();
        let part = match series.strip_prefix(name) {
            Some("") => SeriesPart::Value,
            Some("_sum") => SeriesPart::Sum,
            Some("_count") => SeriesPart::Count,
            _ => continue,
        };

        for metric in family.get_metric() {
            let value = match (family.get_field_type(), part) {
                (MetricType::COUNTER, SeriesPart::Value) => metric.get_counter().value(),
                (MetricType::GAUGE, SeriesPart::Value) => metric.get_gauge().value(),
                (MetricType::HISTOGRAM, SeriesPart::Sum) => metric.get_histogram().sample_sum(),
                (MetricType::HISTOGRAM, SeriesPart::Count) => {
                    metric.get_histogram().sample_count() as f64
                }
                (MetricType::SUMMARY, SeriesPart::Sum) => metric.get_summary().sample_sum(),
                (MetricType::SUMMARY, SeriesPart::Count) => {
                    metric.get_summary().sample_count() as f64
                }
                _ => continue,
            };
            *total.get_or_insert(0.0) += value;
        }
    }

    total
}
