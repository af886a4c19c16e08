//! @ai:module:intent Chart, CSV and JSON output for aggregated reports
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, ChartPlanner, ChartGenerator, JsonReporter

pub mod charts;
pub mod json_report;
pub mod plan;
pub mod style;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{DatasetSummary, JsonReporter, JsonReporterTrait};
pub use plan::{sanitize_filename, ChartPlan, ChartPlanner};
pub use style::{LineStyle, MarkerShape, Palette, SeriesStyle};

use crate::config::ReportConfig;
use crate::metrics::{AggregateTable, FlatTable};
use anyhow::{Context, Result};
use std::path::Path;

/// Which chart families the `report` mode draws besides router charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub comparison: bool,
    pub multi_router: bool,
}

impl ReportOptions {
    /// @ai:intent Multi-router charts are always drawn when more than one router is present
    /// @ai:effects pure
    pub fn resolve(self, router_count: usize) -> Self {
        Self {
            multi_router: self.multi_router || router_count > 1,
            ..self
        }
    }
}

/// @ai:intent Re-ingest a compare-mode export; `summary.json` names the metric columns
/// @ai:effects fs:read
pub fn read_export(output_dir: &Path) -> Result<(FlatTable, DatasetSummary)> {
    let summary = JsonReporter::new().read(&output_dir.join("summary.json"))?;
    let metrics: Vec<&str> = summary.metrics.iter().map(|m| m.name.as_str()).collect();
    let csv_path = output_dir.join("all_data.csv");
    let table = FlatTable::read_csv(&csv_path, &metrics)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    Ok((table, summary))
}

/// @ai:intent Combined output generator for both chart modes
pub struct ReportGenerator {
    config: ReportConfig,
    json: JsonReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a generator for a vocabulary
    /// @ai:effects pure
    pub fn new(config: &ReportConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            json: JsonReporter::new(),
            charts: ChartGenerator::new(&config.chart)?,
        })
    }

    /// @ai:intent Plan the charts of the `report` mode
    /// @ai:effects pure
    pub fn plan_report(&self, table: &AggregateTable, options: ReportOptions) -> Vec<ChartPlan> {
        let options = options.resolve(table.routers().len());
        if options.multi_router {
            tracing::debug!("Multi-router charts enabled");
        }

        let planner = ChartPlanner::new(&self.config);
        let mut plans = planner.router_charts(table);
        if options.comparison {
            plans.extend(planner.comparison_charts(table));
        }
        if options.multi_router {
            plans.extend(planner.multi_router_charts(table));
        }
        plans
    }

    /// @ai:intent Render router charts plus the optional comparison families
    /// @ai:effects fs:write
    pub fn generate_report(
        &self,
        table: &AggregateTable,
        options: ReportOptions,
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        let plans = self.plan_report(table, options);
        tracing::info!("Planned {} chart(s) for {} router(s)", plans.len(), table.routers().len());
        self.charts.generate_all(&plans, output_dir)
    }

    /// @ai:intent Write `all_data.csv`, `summary.json` and the compare charts
    /// @ai:effects fs:write
    pub fn generate_compare(
        &self,
        table: &FlatTable,
        x_param: &str,
        compare_by: &str,
        metrics: &[String],
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let csv_path = output_dir.join("all_data.csv");
        table
            .write_csv(&csv_path)
            .with_context(|| format!("Failed to write {}", csv_path.display()))?;
        tracing::info!("Wrote {} row(s) to {}", table.len(), csv_path.display());

        let summary = DatasetSummary::from_table(table, &self.config);
        self.json.generate(&summary, &output_dir.join("summary.json"))?;

        for column in [x_param, compare_by] {
            if !table.has_column(column) {
                tracing::warn!("Column '{}' not found in any report", column);
            }
        }

        let plans = ChartPlanner::new(&self.config).compare_charts(table, x_param, compare_by, metrics);
        self.charts.generate_all(&plans, output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ReportLoader, ReportLoaderTrait};
    use tempfile::TempDir;

    fn write_inputs(dir: &Path) {
        for (name, body) in [
            ("Epidemic-bufferSize@1M_MessageStatsReport.txt", "h\ndelivered: 10\ndelivery_prob: NaN\n"),
            ("Epidemic-bufferSize@5M_MessageStatsReport.txt", "h\ndelivered: 30\ndelivery_prob: NaN\n"),
            ("Prophet-bufferSize@5M_MessageStatsReport.txt", "h\ndelivered: 20\ndelivery_prob: NaN\n"),
        ] {
            std::fs::write(dir.join(name), body).unwrap();
        }
    }

    fn load_table(config: &ReportConfig, dir: &Path) -> AggregateTable {
        AggregateTable::from_reports(ReportLoader::new(config).load_all(dir).unwrap())
    }

    #[test]
    fn test_options_resolve() {
        let plain = ReportOptions::default();
        assert!(!plain.resolve(1).multi_router);
        assert!(plain.resolve(2).multi_router);

        let forced = ReportOptions {
            comparison: true,
            multi_router: true,
        };
        assert_eq!(forced.resolve(1), forced);
    }

    #[test]
    fn test_single_router_draws_router_charts_only() {
        let config = ReportConfig::default();
        let input = TempDir::new().unwrap();
        std::fs::write(
            input.path().join("Epidemic-bufferSize@1M_MessageStatsReport.txt"),
            "h\ndelivered: 10\n",
        )
        .unwrap();
        let table = load_table(&config, input.path());
        let generator = ReportGenerator::new(&config).unwrap();

        let plans = generator.plan_report(&table, ReportOptions::default());
        let names: Vec<_> = plans.iter().map(ChartPlan::file_name).collect();
        assert_eq!(names, vec!["router_Epidemic_bufferSize_delivered.png"]);
    }

    #[test]
    fn test_two_routers_enable_multi_router_without_flag() {
        let config = ReportConfig::default();
        let input = TempDir::new().unwrap();
        write_inputs(input.path());
        let table = load_table(&config, input.path());
        let generator = ReportGenerator::new(&config).unwrap();

        let plans = generator.plan_report(&table, ReportOptions::default());
        let names: Vec<_> = plans.iter().map(ChartPlan::file_name).collect();

        assert_eq!(names.len(), 2 + 3);
        assert!(names.contains(&"bar_comparison_bufferSize_5M_delivered.png"));
        assert!(names.contains(&"line_comparison_all_routers_bufferSize_delivered.png"));
        assert!(!names.iter().any(|n| n.starts_with("comparison_")));
    }

    #[test]
    fn test_plan_report_families() {
        let config = ReportConfig::default();
        let input = TempDir::new().unwrap();
        write_inputs(input.path());
        let table = load_table(&config, input.path());
        let generator = ReportGenerator::new(&config).unwrap();

        let all = generator.plan_report(
            &table,
            ReportOptions {
                comparison: true,
                multi_router: true,
            },
        );
        assert_eq!(all.len(), 2 + 1 + 3);
        assert!(all.iter().all(|p| !p.file_name().contains("delivery_prob")));
    }

    #[test]
    fn test_missing_input_dir_fails_report_loading() {
        let config = ReportConfig::default();
        let temp = TempDir::new().unwrap();
        let err = ReportLoader::new(&config)
            .load_all(&temp.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::InputDirMissing(_)));
    }

    #[test]
    fn test_compare_writes_csv_and_summary() {
        let config = ReportConfig::default();
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(
            input.path().join("Epidemic-ttl@60_MessageStatsReport.txt"),
            "h\nalpha: 1\ndelivered: 2\ndelivery_prob: NaN\n",
        )
        .unwrap();
        write_inputs(input.path());

        let reports = ReportLoader::new(&config).load_all(input.path()).unwrap();
        let table = FlatTable::from_reports(&reports);
        let generator = ReportGenerator::new(&config).unwrap();
        let metrics = vec!["delivery_prob".to_string()];

        let charts = generator
            .generate_compare(&table, "bufferSize", "routingAlgorithm", &metrics, output.path())
            .unwrap();

        // delivery_prob is NaN everywhere, so no chart is drawn
        assert!(charts.is_empty());

        let (reread, summary) = read_export(output.path()).unwrap();
        assert_eq!(summary.report_count, 4);
        assert_eq!(reread, table);
        assert_eq!(reread.summaries(&config), table.summaries(&config));
    }
}
