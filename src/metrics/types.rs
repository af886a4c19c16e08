//! @ai:module:intent Metric value types for parsed report bodies
//! @ai:module:layer domain
//! @ai:module:public_api MetricValue, MetricSet, MetricSummary
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent A report value: a number, or the raw text when it is not numeric
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// @ai:intent Parse a raw value, keeping the text when it is not a float
    /// @ai:effects pure
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) => MetricValue::Number(n),
            Err(_) => MetricValue::Text(trimmed.to_string()),
        }
    }

    /// @ai:intent The value when it is a usable number (not text, not NaN)
    /// @ai:effects pure
    pub fn defined(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.defined().is_none()
    }
}

// NaN equals NaN here so that tables built from the same input compare equal.
impl PartialEq for MetricValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetricValue::Number(a), MetricValue::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (MetricValue::Text(a), MetricValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// @ai:intent Metrics of one report body keyed by metric name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    values: BTreeMap<String, MetricValue>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetricValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(key)
    }

    /// @ai:intent Numeric value of a metric, None when absent, textual or NaN
    /// @ai:effects pure
    pub fn defined(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(MetricValue::defined)
    }

    /// @ai:intent Whether a metric has no usable value
    /// @ai:effects pure
    pub fn is_missing(&self, key: &str) -> bool {
        self.defined(key).is_none()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// @ai:intent Summary of one metric across all rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub name: String,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub has_missing: bool,
}

impl MetricSummary {
    /// @ai:intent Summarise a column; None entries mark missing values
    /// @ai:effects pure
    pub fn from_values<I>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut summary = MetricSummary {
            name: name.to_string(),
            ..Default::default()
        };
        let mut sum = 0.0;

        for value in values {
            match value {
                Some(v) => {
                    summary.count += 1;
                    sum += v;
                    summary.min = Some(summary.min.map_or(v, |m| m.min(v)));
                    summary.max = Some(summary.max.map_or(v, |m| m.max(v)));
                }
                None => summary.has_missing = true,
            }
        }

        if summary.count > 0 {
            summary.mean = Some(sum / summary.count as f64);
        }
        summary
    }
}
