//! @ai:module:intent JSON summary of a flat dataset
//! @ai:module:layer infrastructure
//! @ai:module:public_api DatasetSummary, JsonReporter, JsonReporterTrait
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::metrics::{FlatTable, MetricSummary};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Parameters with their values, routers and per-metric statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub generated_at: String,
    pub report_count: usize,
    pub routers: Vec<String>,
    pub parameters: BTreeMap<String, Vec<String>>,
    pub metrics: Vec<MetricSummary>,
}

impl DatasetSummary {
    /// @ai:intent Summarise a flat table
    /// @ai:effects pure
    pub fn from_table(table: &FlatTable, config: &ReportConfig) -> Self {
        let routing_key = config.input.routing_key.as_str();

        let parameters = table
            .parameter_columns()
            .into_iter()
            .filter(|column| *column != routing_key)
            .map(|column| (column.to_string(), table.unique_values(column)))
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            report_count: table.len(),
            routers: table.unique_values(routing_key),
            parameters,
            metrics: table.summaries(config),
        }
    }
}

/// @ai:intent Trait for JSON summary output
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Write a summary to a JSON file
    fn generate(&self, summary: &DatasetSummary, output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes and reads `summary.json`
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Load a previously written summary
    /// @ai:effects fs:read
    pub fn read(&self, path: &Path) -> Result<DatasetSummary> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let summary = serde_json::from_str(&content)
            .with_context(|| format!("Invalid summary JSON in {}", path.display()))?;
        Ok(summary)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:effects fs:write
    fn generate(&self, summary: &DatasetSummary, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }
}
