//! @ai:module:intent Parse the body of a message stats report
//! @ai:module:layer domain
//! @ai:module:public_api parse_report_body, read_report
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::metrics::{MetricSet, MetricValue};
use std::path::Path;

/// @ai:intent Parse report text: header skipped, `key: value` lines kept
/// @ai:effects pure
pub fn parse_report_body(content: &str) -> MetricSet {
    let mut metrics = MetricSet::new();

    for line in content.lines().skip(1) {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metrics.insert(key, MetricValue::parse(value));
    }

    metrics
}

/// @ai:intent Read and parse one report file
/// @ai:effects fs:read
pub fn read_report(path: &Path) -> Result<MetricSet> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_report_body(&content))
}
