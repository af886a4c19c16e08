//! @ai:module:intent Plan line and bar charts from the aggregate and flat tables
//! @ai:module:layer application
//! @ai:module:public_api ChartPlan, LineChartPlan, BarChartPlan, ChartPlanner, sanitize_filename
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::metrics::{compare_values, numeric_reading, AggregateTable, FlatTable};

/// @ai:intent Replace characters that are not allowed in file names
/// @ai:effects pure
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if r#"\/*?:"<>|"#.contains(c) { '_' } else { c })
        .collect()
}

/// @ai:intent How x positions map back to labels
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    Numeric,
    /// Evenly spaced positions 0..n labelled with the raw values.
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeriesPlan {
    pub name: String,
    pub style_index: usize,
    pub points: Vec<PlotPoint>,
}

/// @ai:intent Everything needed to draw a line chart
#[derive(Debug, Clone, PartialEq)]
pub struct LineChartPlan {
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub series: Vec<LineSeriesPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPlan {
    pub name: String,
    pub color_index: usize,
    pub value: f64,
}

/// @ai:intent Everything needed to draw a bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartPlan {
    pub file_name: String,
    pub title: String,
    pub y_label: String,
    pub bars: Vec<BarPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartPlan {
    Line(LineChartPlan),
    Bar(BarChartPlan),
}

impl ChartPlan {
    pub fn file_name(&self) -> &str {
        match self {
            ChartPlan::Line(plan) => &plan.file_name,
            ChartPlan::Bar(plan) => &plan.file_name,
        }
    }

    /// @ai:intent Number of valid data points the chart would draw
    /// @ai:effects pure
    pub fn point_count(&self) -> usize {
        match self {
            ChartPlan::Line(plan) => plan.series.iter().map(|s| s.points.len()).sum(),
            ChartPlan::Bar(plan) => plan.bars.len(),
        }
    }
}

/// Series input before x positions are assigned: (label, sort key, y).
type RawSeries = (String, usize, Vec<(String, Option<f64>, f64)>);

struct LineSpec {
    file_name: String,
    title: String,
    x_label: String,
    y_label: String,
}

/// @ai:intent Lay out series on a shared x axis; None when no point survives
/// @ai:effects pure
fn layout_line_chart(spec: LineSpec, raw: Vec<RawSeries>) -> Option<LineChartPlan> {
    let raw: Vec<RawSeries> = raw
        .into_iter()
        .filter(|(_, _, points)| !points.is_empty())
        .collect();
    if raw.is_empty() {
        return None;
    }

    let all_numeric = raw
        .iter()
        .flat_map(|(_, _, points)| points.iter())
        .all(|(label, key, _)| key.is_some() || numeric_reading(label).is_some());

    let x_axis = if all_numeric {
        XAxis::Numeric
    } else {
        let mut labels: Vec<String> = Vec::new();
        for (label, _, _) in raw.iter().flat_map(|(_, _, points)| points.iter()) {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels.sort_by(|a, b| compare_values(a, b));
        XAxis::Categorical(labels)
    };

    let series = raw
        .into_iter()
        .map(|(name, style_index, points)| LineSeriesPlan {
            name,
            style_index,
            points: points
                .into_iter()
                .map(|(label, key, y)| {
                    let x = match &x_axis {
                        XAxis::Numeric => key.or_else(|| numeric_reading(&label)).unwrap_or(0.0),
                        XAxis::Categorical(labels) => {
                            labels.iter().position(|l| *l == label).unwrap_or(0) as f64
                        }
                    };
                    PlotPoint { label, x, y }
                })
                .collect(),
        })
        .collect();

    Some(LineChartPlan {
        file_name: spec.file_name,
        title: spec.title,
        x_label: spec.x_label,
        y_label: spec.y_label,
        x_axis,
        series,
    })
}

/// @ai:intent Builds chart plans for every chart family
pub struct ChartPlanner<'a> {
    config: &'a ReportConfig,
}

impl<'a> ChartPlanner<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    fn metric_keys(&self) -> Vec<&'a str> {
        self.config.metric_keys()
    }

    fn router_series(
        table: &AggregateTable,
        router: &str,
        style_index: usize,
        parameter: &str,
        metric: &str,
    ) -> RawSeries {
        let points = table
            .series(router, parameter, metric)
            .into_iter()
            .map(|p| (p.value, None, p.y))
            .collect();
        (router.to_string(), style_index, points)
    }

    /// @ai:intent One single-series chart per router, parameter and metric
    /// @ai:effects pure
    pub fn router_charts(&self, table: &AggregateTable) -> Vec<ChartPlan> {
        let mut plans = Vec::new();

        for (idx, router) in table.routers().into_iter().enumerate() {
            for parameter in table.router_parameters(router) {
                for metric in self.metric_keys() {
                    let name = self.config.metric_name(metric);
                    let spec = LineSpec {
                        file_name: format!(
                            "router_{}_{}_{}.png",
                            sanitize_filename(router),
                            sanitize_filename(parameter),
                            sanitize_filename(metric)
                        ),
                        title: format!("{} vs {} ({})", name, parameter, router),
                        x_label: parameter.to_string(),
                        y_label: name.to_string(),
                    };
                    let raw = vec![Self::router_series(table, router, idx, parameter, metric)];
                    plans.extend(layout_line_chart(spec, raw).map(ChartPlan::Line));
                }
            }
        }

        plans
    }

    /// @ai:intent Per parameter and metric, one line per router that has the parameter
    /// @ai:effects pure
    pub fn comparison_charts(&self, table: &AggregateTable) -> Vec<ChartPlan> {
        let routers = table.routers();
        let mut plans = Vec::new();

        for parameter in table.parameters() {
            for metric in self.metric_keys() {
                let name = self.config.metric_name(metric);
                let raw = routers
                    .iter()
                    .enumerate()
                    .map(|(idx, router)| Self::router_series(table, router, idx, parameter, metric))
                    .collect();
                let spec = LineSpec {
                    file_name: format!(
                        "comparison_{}_{}.png",
                        sanitize_filename(parameter),
                        sanitize_filename(metric)
                    ),
                    title: format!("Comparison of {} vs {}", name, parameter),
                    x_label: parameter.to_string(),
                    y_label: name.to_string(),
                };
                plans.extend(layout_line_chart(spec, raw).map(ChartPlan::Line));
            }
        }

        plans
    }

    /// @ai:intent Bar chart per parameter value plus trend line per parameter, all routers
    /// @ai:effects pure
    pub fn multi_router_charts(&self, table: &AggregateTable) -> Vec<ChartPlan> {
        let routers = table.routers();
        let mut plans = Vec::new();

        for parameter in table.parameters() {
            let values = table.values(parameter);

            for metric in self.metric_keys() {
                let name = self.config.metric_name(metric);

                for value in &values {
                    let bars: Vec<BarPlan> = routers
                        .iter()
                        .enumerate()
                        .filter_map(|(idx, router)| {
                            table
                                .get(router, parameter, value)
                                .and_then(|m| m.defined(metric))
                                .map(|v| BarPlan {
                                    name: router.to_string(),
                                    color_index: idx,
                                    value: v,
                                })
                        })
                        .collect();

                    if bars.is_empty() {
                        continue;
                    }

                    plans.push(ChartPlan::Bar(BarChartPlan {
                        file_name: format!(
                            "bar_comparison_{}_{}_{}.png",
                            sanitize_filename(parameter),
                            sanitize_filename(value),
                            sanitize_filename(metric)
                        ),
                        title: format!("{} for {}={}", name, parameter, value),
                        y_label: name.to_string(),
                        bars,
                    }));
                }

                let raw = routers
                    .iter()
                    .enumerate()
                    .map(|(idx, router)| Self::router_series(table, router, idx, parameter, metric))
                    .collect();
                let spec = LineSpec {
                    file_name: format!(
                        "line_comparison_all_routers_{}_{}.png",
                        sanitize_filename(parameter),
                        sanitize_filename(metric)
                    ),
                    title: format!("{} vs {} for All Routers", name, parameter),
                    x_label: parameter.to_string(),
                    y_label: name.to_string(),
                };
                plans.extend(layout_line_chart(spec, raw).map(ChartPlan::Line));
            }
        }

        plans
    }

    /// @ai:intent Per metric, one line per compare-by value along the x parameter (group means)
    /// @ai:effects pure
    pub fn compare_charts(
        &self,
        table: &FlatTable,
        x_param: &str,
        compare_by: &str,
        metrics: &[String],
    ) -> Vec<ChartPlan> {
        let series_names = table.unique_values(compare_by);
        let mut plans = Vec::new();

        for metric in metrics {
            let name = self.config.metric_name(metric);
            let pivot = table.pivot_mean(compare_by, x_param, metric);

            let raw = series_names
                .iter()
                .enumerate()
                .filter_map(|(idx, series)| {
                    pivot.get(series).map(|points| {
                        let points = points
                            .iter()
                            .map(|p| (p.x.clone(), p.sort_key, p.y))
                            .collect();
                        (series.clone(), idx, points)
                    })
                })
                .collect();

            let spec = LineSpec {
                file_name: format!(
                    "compare_{}_by_{}_{}.png",
                    sanitize_filename(x_param),
                    sanitize_filename(compare_by),
                    sanitize_filename(metric)
                ),
                title: format!("{} vs {} by {}", name, x_param, compare_by),
                x_label: x_param.to_string(),
                y_label: name.to_string(),
            };
            plans.extend(layout_line_chart(spec, raw).map(ChartPlan::Line));
        }

        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{parse_report_body, FilenameParser, ParsedReport};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn report(name: &str, body: &str) -> ParsedReport {
        let parser = FilenameParser::new(&ReportConfig::default());
        ParsedReport {
            path: PathBuf::from(name),
            name: name.to_string(),
            identity: parser.parse_name(name),
            metrics: parse_report_body(body),
        }
    }

    fn table() -> AggregateTable {
        AggregateTable::from_reports(vec![
            report("Epidemic-bufferSize@1M_MessageStatsReport.txt", "h\ndelivered: 10\ndelivery_prob: NaN\n"),
            report("Epidemic-bufferSize@5M_MessageStatsReport.txt", "h\ndelivered: 30\ndelivery_prob: NaN\n"),
            report("Prophet-bufferSize@5M_MessageStatsReport.txt", "h\ndelivered: 20\ndelivery_prob: NaN\n"),
        ])
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b:c*d?e\"f<g>h|i\\j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("bufferSize"), "bufferSize");
    }

    #[test]
    fn test_comparison_skips_all_nan_metric() {
        let config = ReportConfig::default();
        let plans = ChartPlanner::new(&config).comparison_charts(&table());

        let names: Vec<_> = plans.iter().map(ChartPlan::file_name).collect();
        assert_eq!(names, vec!["comparison_bufferSize_delivered.png"]);

        let ChartPlan::Line(plan) = &plans[0] else {
            panic!("expected a line chart");
        };
        assert_eq!(plan.x_axis, XAxis::Numeric);
        assert_eq!(plan.series.len(), 2);
        assert_eq!(plan.series[0].name, "Epidemic");
        assert_eq!(plan.series[1].style_index, 1);
        let xs: Vec<_> = plan.series[0].points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(xs, vec![(1.0, 10.0), (5.0, 30.0)]);
    }

    #[test]
    fn test_multi_router_bars_and_trend() {
        let config = ReportConfig::default();
        let plans = ChartPlanner::new(&config).multi_router_charts(&table());

        let names: Vec<_> = plans.iter().map(ChartPlan::file_name).collect();
        assert_eq!(
            names,
            vec![
                "bar_comparison_bufferSize_1M_delivered.png",
                "bar_comparison_bufferSize_5M_delivered.png",
                "line_comparison_all_routers_bufferSize_delivered.png",
            ]
        );

        let ChartPlan::Bar(bar) = &plans[1] else {
            panic!("expected a bar chart");
        };
        let bars: Vec<_> = bar.bars.iter().map(|b| (b.name.as_str(), b.color_index, b.value)).collect();
        assert_eq!(bars, vec![("Epidemic", 0, 30.0), ("Prophet", 1, 20.0)]);
    }

    #[test]
    fn test_router_charts_one_series_each() {
        let config = ReportConfig::default();
        let plans = ChartPlanner::new(&config).router_charts(&table());

        let names: Vec<_> = plans.iter().map(ChartPlan::file_name).collect();
        assert_eq!(
            names,
            vec![
                "router_Epidemic_bufferSize_delivered.png",
                "router_Prophet_bufferSize_delivered.png",
            ]
        );
        assert_eq!(plans[1].point_count(), 1);
    }

    #[test]
    fn test_categorical_axis_for_text_values() {
        let t = AggregateTable::from_reports(vec![
            report("Epidemic-queue@LIFO_MessageStatsReport.txt", "h\ndelivered: 2\n"),
            report("Epidemic-queue@FIFO_MessageStatsReport.txt", "h\ndelivered: 1\n"),
        ]);
        let config = ReportConfig::default();
        let plans = ChartPlanner::new(&config).comparison_charts(&t);

        let ChartPlan::Line(plan) = &plans[0] else {
            panic!("expected a line chart");
        };
        assert_eq!(
            plan.x_axis,
            XAxis::Categorical(vec!["FIFO".to_string(), "LIFO".to_string()])
        );
        let xs: Vec<_> = plan.series[0].points.iter().map(|p| (p.label.as_str(), p.x)).collect();
        assert_eq!(xs, vec![("FIFO", 0.0), ("LIFO", 1.0)]);
    }

    #[test]
    fn test_compare_charts_from_flat_table() {
        let config = ReportConfig::default();
        let flat = FlatTable::from_aggregate(&table());
        let metrics = vec!["delivered".to_string(), "delivery_prob".to_string()];

        let plans = ChartPlanner::new(&config).compare_charts(&flat, "bufferSize", "routingAlgorithm", &metrics);

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].file_name(), "compare_bufferSize_by_routingAlgorithm_delivered.png");
        let ChartPlan::Line(plan) = &plans[0] else {
            panic!("expected a line chart");
        };
        let prophet = &plan.series[1];
        assert_eq!(prophet.name, "Prophet");
        assert_eq!(prophet.points[0].x, 5.0);
    }
}
