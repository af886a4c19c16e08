//! @ai:module:intent One-row-per-report table with CSV import and export
//! @ai:module:layer application
//! @ai:module:public_api FlatTable, ColumnKind, PivotPoint
//! @ai:module:depends_on input, metrics::types, metrics::ordering

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::input::{numeric_column, ParsedReport};
use crate::metrics::aggregator::AggregateTable;
use crate::metrics::ordering::{compare_values, numeric_reading};
use crate::metrics::types::{MetricSummary, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SOURCE_COLUMN: &str = "source";

/// @ai:intent Role of a column in the flat table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Source,
    Parameter,
    Numeric,
    Metric,
}

/// @ai:intent Mean of one (series, x) group produced by `pivot_mean`
#[derive(Debug, Clone, PartialEq)]
pub struct PivotPoint {
    pub x: String,
    pub sort_key: Option<f64>,
    pub y: f64,
}

/// @ai:intent Union-of-columns table, one row per report file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<(String, ColumnKind)>,
    rows: Vec<BTreeMap<String, MetricValue>>,
}

impl FlatTable {
    /// @ai:intent Build rows from parsed reports, columns in first-seen order
    /// @ai:effects pure
    pub fn from_reports(reports: &[ParsedReport]) -> Self {
        let mut params: Vec<String> = Vec::new();
        let mut numerics: Vec<String> = Vec::new();
        let mut metrics: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(reports.len());

        for report in reports {
            let id = &report.identity;
            let mut row = BTreeMap::new();
            row.insert(SOURCE_COLUMN.to_string(), MetricValue::Text(report.name.clone()));

            push_unique(&mut params, id.routing_key());
            row.insert(
                id.routing_key().to_string(),
                MetricValue::Text(id.routing_algorithm().to_string()),
            );

            for (key, value) in id.params() {
                push_unique(&mut params, key);
                row.insert(key.to_string(), MetricValue::Text(value.to_string()));
            }

            for (key, n) in id.numeric_values() {
                let column = numeric_column(key);
                push_unique(&mut numerics, &column);
                row.insert(column, MetricValue::Number(n as f64));
            }

            for (key, value) in report.metrics.iter() {
                push_unique(&mut metrics, key);
                row.insert(key.to_string(), value.clone());
            }

            rows.push(row);
        }

        let columns = std::iter::once((SOURCE_COLUMN.to_string(), ColumnKind::Source))
            .chain(params.into_iter().map(|c| (c, ColumnKind::Parameter)))
            .chain(numerics.into_iter().map(|c| (c, ColumnKind::Numeric)))
            .chain(metrics.into_iter().map(|c| (c, ColumnKind::Metric)))
            .collect();

        Self { columns, rows }
    }

    /// @ai:intent Flat rows of every run held by an aggregate table
    /// @ai:effects pure
    pub fn from_aggregate(table: &AggregateTable) -> Self {
        Self::from_reports(table.runs())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, kind)| *kind)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_kind(column).is_some()
    }

    fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn parameter_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Parameter)
    }

    pub fn metric_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Metric)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&MetricValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// @ai:intent Distinct present values of a column, numeric-sorted
    /// @ai:effects pure
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(column) {
                let text = value.to_string();
                if !values.contains(&text) {
                    values.push(text);
                }
            }
        }
        values.sort_by(|a, b| compare_values(a, b));
        values
    }

    /// @ai:intent Column to sort by: `<column>_numeric` when present, else the column
    /// @ai:effects pure
    pub fn sort_key_column(&self, column: &str) -> String {
        let numeric = numeric_column(column);
        if self.has_column(&numeric) {
            numeric
        } else {
            column.to_string()
        }
    }

    /// @ai:intent Numeric sort key of one row for a column
    /// @ai:effects pure
    pub fn sort_key(&self, row: usize, column: &str) -> Option<f64> {
        let key_column = self.sort_key_column(column);
        match self.cell(row, &key_column)? {
            MetricValue::Number(n) if !n.is_nan() => Some(*n),
            MetricValue::Number(_) => None,
            MetricValue::Text(text) => numeric_reading(text),
        }
    }

    /// @ai:intent Min, max, mean and missing flag of a metric over all rows
    /// @ai:effects pure
    pub fn metric_summary(&self, metric: &str) -> MetricSummary {
        MetricSummary::from_values(
            metric,
            self.rows
                .iter()
                .map(|row| row.get(metric).and_then(MetricValue::defined)),
        )
    }

    /// @ai:intent Summaries of known metrics first, then any other metric columns
    /// @ai:effects pure
    pub fn summaries(&self, config: &ReportConfig) -> Vec<MetricSummary> {
        let mut keys: Vec<&str> = config
            .metric_keys()
            .into_iter()
            .filter(|key| self.has_column(key))
            .collect();
        for column in self.metric_columns() {
            if !keys.contains(&column) {
                keys.push(column);
            }
        }
        keys.into_iter().map(|key| self.metric_summary(key)).collect()
    }

    /// @ai:intent Mean of a metric per (series, x), each series sorted along x
    /// @ai:effects pure
    pub fn pivot_mean(
        &self,
        series_column: &str,
        x_column: &str,
        metric: &str,
    ) -> BTreeMap<String, Vec<PivotPoint>> {
        let mut groups: BTreeMap<String, BTreeMap<String, (Option<f64>, f64, usize)>> =
            BTreeMap::new();

        for (idx, row) in self.rows.iter().enumerate() {
            let (Some(series), Some(x), Some(y)) = (
                row.get(series_column),
                row.get(x_column),
                row.get(metric).and_then(MetricValue::defined),
            ) else {
                continue;
            };

            let slot = groups
                .entry(series.to_string())
                .or_default()
                .entry(x.to_string())
                .or_insert((self.sort_key(idx, x_column), 0.0, 0));
            slot.1 += y;
            slot.2 += 1;
        }

        groups
            .into_iter()
            .map(|(series, points)| {
                let mut points: Vec<PivotPoint> = points
                    .into_iter()
                    .map(|(x, (sort_key, sum, count))| PivotPoint {
                        x,
                        sort_key,
                        y: sum / count as f64,
                    })
                    .collect();
                points.sort_by(|a, b| match (a.sort_key, b.sort_key) {
                    (Some(p), Some(q)) => p.total_cmp(&q).then_with(|| a.x.cmp(&b.x)),
                    _ => compare_values(&a.x, &b.x),
                });
                (series, points)
            })
            .collect()
    }

    /// @ai:intent Stream the table as CSV with a header row
    /// @ai:effects io:write
    pub fn write_csv_to<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.columns())?;

        for row in &self.rows {
            writer.write_record(self.columns().map(|column| {
                row.get(column).map(|v| v.to_string()).unwrap_or_default()
            }))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// @ai:intent Render the table as a CSV string
    /// @ai:effects pure
    pub fn to_csv(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// @ai:intent Write the CSV export to a file
    /// @ai:effects fs:write
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }

    /// @ai:intent Re-ingest a CSV export
    /// @ai:pre `metrics` names every metric column of the export
    /// @ai:effects pure
    pub fn from_csv(content: &str, metrics: &[&str]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let columns = classify_columns(&header, metrics);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = BTreeMap::new();
            for ((name, kind), field) in columns.iter().zip(record.iter()) {
                if field.is_empty() {
                    continue;
                }
                let value = match kind {
                    ColumnKind::Numeric | ColumnKind::Metric => MetricValue::parse(field),
                    ColumnKind::Source | ColumnKind::Parameter => MetricValue::Text(field.to_string()),
                };
                row.insert(name.clone(), value);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// @ai:intent Read a CSV export from disk
    /// @ai:effects fs:read
    pub fn read_csv(path: &Path, metrics: &[&str]) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv(&content, metrics)
    }
}

fn push_unique(columns: &mut Vec<String>, name: &str) {
    if !columns.iter().any(|c| c == name) {
        columns.push(name.to_string());
    }
}

fn classify_columns(header: &[String], metrics: &[&str]) -> Vec<(String, ColumnKind)> {
    header
        .iter()
        .map(|name| {
            let is_numeric = name
                .strip_suffix("_numeric")
                .map(|base| header.iter().any(|h| h == base))
                .unwrap_or(false);

            let kind = if name == SOURCE_COLUMN {
                ColumnKind::Source
            } else if is_numeric {
                ColumnKind::Numeric
            } else if metrics.contains(&name.as_str()) {
                ColumnKind::Metric
            } else {
                ColumnKind::Parameter
            };
            (name.clone(), kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{parse_report_body, FilenameParser};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn report(name: &str, body: &str) -> ParsedReport {
        let parser = FilenameParser::new(&ReportConfig::default());
        ParsedReport {
            path: PathBuf::from(name),
            name: name.to_string(),
            identity: parser.parse_name(name),
            metrics: parse_report_body(body),
        }
    }

    fn sample() -> Vec<ParsedReport> {
        vec![
            report(
                "Epidemic-bufferSize@10M-ttl@300_MessageStatsReport.txt",
                "h\ndelivered: 40\ndelivery_prob: 0.25\n",
            ),
            report(
                "Epidemic-bufferSize@2M-ttl@300_MessageStatsReport.txt",
                "h\ndelivered: 20\ndelivery_prob: NaN\n",
            ),
            report(
                "Prophet-bufferSize@2M-ttl@300_MessageStatsReport.txt",
                "h\ndelivered: 30\ndelivery_prob: 0.5\nnote: cold, start\n",
            ),
        ]
    }

    #[test]
    fn test_columns_are_union_in_first_seen_order() {
        let table = FlatTable::from_reports(&sample());

        assert_eq!(
            table.columns().collect::<Vec<_>>(),
            vec![
                "source",
                "routingAlgorithm",
                "bufferSize",
                "ttl",
                "bufferSize_numeric",
                "delivered",
                "delivery_prob",
                "note"
            ]
        );
        assert_eq!(table.parameter_columns(), vec!["routingAlgorithm", "bufferSize", "ttl"]);
        assert_eq!(table.cell(2, "note"), Some(&MetricValue::Text("cold, start".to_string())));
        assert_eq!(table.cell(0, "note"), None);
    }

    #[test]
    fn test_unique_values_and_sort_key() {
        let table = FlatTable::from_reports(&sample());

        assert_eq!(table.unique_values("bufferSize"), vec!["2M", "10M"]);
        assert_eq!(table.unique_values("routingAlgorithm"), vec!["Epidemic", "Prophet"]);
        assert_eq!(table.sort_key_column("bufferSize"), "bufferSize_numeric");
        assert_eq!(table.sort_key_column("ttl"), "ttl");
        assert_eq!(table.sort_key(0, "bufferSize"), Some(10.0));
        assert_eq!(table.sort_key(0, "ttl"), Some(300.0));
    }

    #[test]
    fn test_metric_summary_flags_nan() {
        let table = FlatTable::from_reports(&sample());

        let prob = table.metric_summary("delivery_prob");
        assert_eq!(prob.count, 2);
        assert_eq!(prob.min, Some(0.25));
        assert_eq!(prob.max, Some(0.5));
        assert!(prob.has_missing);

        let delivered = table.metric_summary("delivered");
        assert_eq!(delivered.mean, Some(30.0));
        assert!(!delivered.has_missing);
    }

    #[test]
    fn test_summaries_list_known_metrics_first() {
        let table = FlatTable::from_reports(&sample());
        let names: Vec<_> = table
            .summaries(&ReportConfig::default())
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["delivered", "delivery_prob", "note"]);
    }

    #[test]
    fn test_pivot_mean_groups_and_sorts() {
        let mut reports = sample();
        reports.push(report(
            "Prophet-bufferSize@2M-ttl@600_MessageStatsReport.txt",
            "h\ndelivered: 50\n",
        ));
        let table = FlatTable::from_reports(&reports);

        let pivot = table.pivot_mean("routingAlgorithm", "bufferSize", "delivered");
        let epidemic: Vec<_> = pivot["Epidemic"].iter().map(|p| (p.x.as_str(), p.y)).collect();
        assert_eq!(epidemic, vec![("2M", 20.0), ("10M", 40.0)]);
        let prophet: Vec<_> = pivot["Prophet"].iter().map(|p| (p.x.as_str(), p.y)).collect();
        assert_eq!(prophet, vec![("2M", 40.0)]);
    }

    #[test]
    fn test_csv_roundtrip_preserves_summaries() {
        let config = ReportConfig::default();
        let aggregate = AggregateTable::from_reports(sample());
        let table = FlatTable::from_aggregate(&aggregate);

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("all_data.csv");
        table.write_csv(&path).unwrap();

        let reread = FlatTable::read_csv(&path, &table.metric_columns()).unwrap();
        assert_eq!(reread, table);
        assert_eq!(reread.summaries(&config), table.summaries(&config));
    }

    #[test]
    fn test_unknown_leading_metric_survives_reingest() {
        let config = ReportConfig::default();
        let table = FlatTable::from_reports(&[report(
            "Epidemic-ttl@60_MessageStatsReport.txt",
            "h\nalpha: 1\ndelivered: 2\n",
        )]);

        let exported = table.to_csv().unwrap();
        let reread = FlatTable::from_csv(&exported, &table.metric_columns()).unwrap();

        assert_eq!(reread.column_kind("alpha"), Some(ColumnKind::Metric));
        assert_eq!(reread.column_kind("ttl"), Some(ColumnKind::Parameter));
        let names: Vec<_> = reread.summaries(&config).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["delivered", "alpha"]);
        assert_eq!(reread.summaries(&config), table.summaries(&config));
    }

    #[test]
    fn test_embedded_newline_and_comma_roundtrip() {
        let table = FlatTable::from_reports(&[report(
            "Epidemic-ttl@60\nx_MessageStatsReport.txt",
            "h\ndelivered: 2\nnote: cold, \"start\"\n",
        )]);

        let exported = table.to_csv().unwrap();
        let reread = FlatTable::from_csv(&exported, &table.metric_columns()).unwrap();

        assert_eq!(reread, table);
        assert_eq!(
            reread.cell(0, "ttl"),
            Some(&MetricValue::Text("60\nx".to_string()))
        );
    }

    #[test]
    fn test_csv_field_count_mismatch() {
        let err = FlatTable::from_csv("source,delivered\na,1,2\n", &["delivered"]).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_empty_csv_is_empty_table() {
        let table = FlatTable::from_csv("", &[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().count(), 0);
    }
}
