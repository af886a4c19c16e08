//! @ai:module:intent Report vocabulary and chart styling configuration
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportConfig, InputConfig, MetricDef, NumericRule, NumericKind, ChartConfig
//! @ai:module:stateless true

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Complete vocabulary passed to the parser, aggregator and charts
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricDef>,
    #[serde(default = "default_numeric_params")]
    pub numeric_params: Vec<NumericRule>,
    #[serde(default)]
    pub chart: ChartConfig,
}

/// @ai:intent How report files are recognised and their names decoded
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_report_suffix")]
    pub report_suffix: String,
    #[serde(default = "default_routing_key")]
    pub routing_key: String,
    /// Glue `@`-less segments onto the next key instead of dropping them.
    #[serde(default)]
    pub hyphenated_keys: bool,
}

/// @ai:intent A known metric key and its display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDef {
    pub key: String,
    pub name: String,
}

/// @ai:intent Numeric coercion registered for one parameter key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRule {
    pub key: String,
    pub kind: NumericKind,
}

/// @ai:intent Supported numeric coercions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    /// Leading decimal run, trailing units ignored (`500k` -> 500).
    LeadingDigits,
    /// Whole value must be digits (`2` -> 2, `2a` -> none).
    WholeInteger,
}

/// @ai:intent Chart size and cyclic style palettes
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_line_styles")]
    pub line_styles: Vec<String>,
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            metrics: default_metrics(),
            numeric_params: default_numeric_params(),
            chart: ChartConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            report_suffix: default_report_suffix(),
            routing_key: default_routing_key(),
            hyphenated_keys: false,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            line_styles: default_line_styles(),
            markers: default_markers(),
            colors: default_colors(),
        }
    }
}

fn default_report_suffix() -> String {
    "_MessageStatsReport.txt".to_string()
}

fn default_routing_key() -> String {
    "routingAlgorithm".to_string()
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

fn default_metrics() -> Vec<MetricDef> {
    [
        ("created", "Messages Created"),
        ("started", "Messages Started"),
        ("relayed", "Messages Relayed"),
        ("aborted", "Messages Aborted"),
        ("dropped", "Messages Dropped"),
        ("removed", "Messages Removed"),
        ("delivered", "Message Delivered"),
        ("delivery_prob", "Delivery Probability"),
        ("overhead_ratio", "Overhead Ratio"),
        ("latency_avg", "Average Latency (s)"),
        ("latency_med", "Median Latency (s)"),
        ("hopcount_avg", "Average Hop Count"),
        ("hopcount_med", "Median Hop Count"),
        ("buffertime_avg", "Average Buffer Time (s)"),
        ("buffertime_med", "Median Buffer Time (s)"),
    ]
    .iter()
    .map(|(key, name)| MetricDef {
        key: key.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn default_numeric_params() -> Vec<NumericRule> {
    vec![
        NumericRule {
            key: "bufferSize".to_string(),
            kind: NumericKind::LeadingDigits,
        },
        NumericRule {
            key: "dropPolicy".to_string(),
            kind: NumericKind::WholeInteger,
        },
    ]
}

fn default_line_styles() -> Vec<String> {
    ["solid", "dashed", "dash-dot", "dotted"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_markers() -> Vec<String> {
    [
        "circle",
        "square",
        "triangle-up",
        "diamond",
        "star",
        "cross",
        "plus",
        "triangle-down",
        "triangle-left",
        "triangle-right",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_colors() -> Vec<String> {
    [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ReportConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| crate::Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Display name of a metric, falling back to its key
    /// @ai:effects pure
    pub fn metric_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.name.as_str())
            .unwrap_or(key)
    }

    /// @ai:intent Keys of all known metrics in declaration order
    /// @ai:effects pure
    pub fn metric_keys(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn rule(config: &ReportConfig, key: &str) -> Option<NumericKind> {
        config
            .numeric_params
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.kind)
    }

    #[test]
    fn test_default_vocabulary() {
        let config = ReportConfig::default();
        assert_eq!(config.metrics.len(), 15);
        assert_eq!(config.metric_name("delivery_prob"), "Delivery Probability");
        assert_eq!(config.metric_name("unknown_metric"), "unknown_metric");
        assert_eq!(rule(&config, "bufferSize"), Some(NumericKind::LeadingDigits));
        assert_eq!(rule(&config, "dropPolicy"), Some(NumericKind::WholeInteger));
        assert_eq!(rule(&config, "ttl"), None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("one-report.toml");

        let config = ReportConfig::default();
        config.save(&path).unwrap();

        let loaded = ReportConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.toml");
        std::fs::write(
            &path,
            r#"
[input]
hyphenated_keys = true

[[numeric_params]]
key = "ttl"
kind = "whole_integer"
"#,
        )
        .unwrap();

        let config = ReportConfig::load(&path).unwrap();
        assert!(config.input.hyphenated_keys);
        assert_eq!(config.input.report_suffix, "_MessageStatsReport.txt");
        assert_eq!(config.numeric_params.len(), 1);
        assert_eq!(rule(&config, "bufferSize"), None);
        assert_eq!(config.metrics.len(), 15);
    }
}
