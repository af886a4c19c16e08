//! @ai:module:intent Group report metrics by router, parameter and parameter value
//! @ai:module:layer application
//! @ai:module:public_api AggregateTable, AggregateKey, SeriesPoint
//! @ai:module:stateless false

use crate::input::ParsedReport;
use crate::metrics::ordering::compare_values;
use crate::metrics::types::MetricSet;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// @ai:intent Leaf address in the aggregate: router, parameter name, raw value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AggregateKey {
    pub router: String,
    pub parameter: String,
    pub value: String,
}

/// @ai:intent One defined point of a router's metric along a parameter axis
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub value: String,
    pub y: f64,
}

/// @ai:intent router -> parameter -> value -> metrics, stored as a flat keyed table
///
/// Every run is kept in merge order. Each of a run's parameters points a key at
/// that run, so one metric set is shared by several parameter branches. A later
/// run replaces an earlier one for the same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    runs: Vec<ParsedReport>,
    entries: BTreeMap<AggregateKey, usize>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Build a table from reports in the order given
    /// @ai:effects pure
    pub fn from_reports(reports: impl IntoIterator<Item = ParsedReport>) -> Self {
        let mut table = Self::new();
        for report in reports {
            table.insert(report);
        }
        table
    }

    /// @ai:intent Fan one report out under each of its parameters
    /// @ai:effects pure
    pub fn insert(&mut self, report: ParsedReport) {
        let index = self.runs.len();
        let router = report.identity.routing_algorithm().to_string();

        for (parameter, value) in report.identity.params() {
            let key = AggregateKey {
                router: router.clone(),
                parameter: parameter.to_string(),
                value: value.to_string(),
            };
            if let Some(previous) = self.entries.insert(key, index) {
                tracing::debug!(
                    "{} replaces {} for {}={}",
                    report.name,
                    self.runs[previous].name,
                    parameter,
                    value
                );
            }
        }

        self.runs.push(report);
    }

    pub fn runs(&self) -> &[ParsedReport] {
        &self.runs
    }

    /// @ai:intent Number of (router, parameter, value) leaves
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// @ai:intent Leaves in key order
    /// @ai:effects pure
    pub fn entries(&self) -> impl Iterator<Item = (&AggregateKey, &MetricSet)> {
        self.entries
            .iter()
            .map(|(key, &idx)| (key, &self.runs[idx].metrics))
    }

    /// @ai:intent Sorted router names; routers whose reports carry no parameter are included
    /// @ai:effects pure
    pub fn routers(&self) -> Vec<&str> {
        let routers: BTreeSet<&str> = self
            .runs
            .iter()
            .map(|r| r.identity.routing_algorithm())
            .collect();
        routers.into_iter().collect()
    }

    /// @ai:intent Sorted parameter names across all routers
    /// @ai:effects pure
    pub fn parameters(&self) -> Vec<&str> {
        let params: BTreeSet<&str> = self.entries.keys().map(|k| k.parameter.as_str()).collect();
        params.into_iter().collect()
    }

    /// @ai:intent Sorted parameter names seen for one router
    /// @ai:effects pure
    pub fn router_parameters(&self, router: &str) -> Vec<&str> {
        let params: BTreeSet<&str> = self
            .entries
            .keys()
            .filter(|k| k.router == router)
            .map(|k| k.parameter.as_str())
            .collect();
        params.into_iter().collect()
    }

    /// @ai:intent Distinct values of a parameter across routers, numeric-sorted
    /// @ai:effects pure
    pub fn values(&self, parameter: &str) -> Vec<&str> {
        self.sorted_values(|k| k.parameter == parameter)
    }

    /// @ai:intent Distinct values of a parameter for one router, numeric-sorted
    /// @ai:effects pure
    pub fn router_values(&self, router: &str, parameter: &str) -> Vec<&str> {
        self.sorted_values(|k| k.router == router && k.parameter == parameter)
    }

    /// @ai:intent Metrics stored at one leaf
    /// @ai:effects pure
    pub fn get(&self, router: &str, parameter: &str, value: &str) -> Option<&MetricSet> {
        let key = AggregateKey {
            router: router.to_string(),
            parameter: parameter.to_string(),
            value: value.to_string(),
        };
        self.entries.get(&key).map(|&idx| &self.runs[idx].metrics)
    }

    /// @ai:intent Defined metric values of a router along a parameter, numeric-sorted
    /// @ai:effects pure
    pub fn series(&self, router: &str, parameter: &str, metric: &str) -> Vec<SeriesPoint> {
        self.router_values(router, parameter)
            .into_iter()
            .filter_map(|value| {
                self.get(router, parameter, value)
                    .and_then(|m| m.defined(metric))
                    .map(|y| SeriesPoint {
                        value: value.to_string(),
                        y,
                    })
            })
            .collect()
    }

    /// @ai:intent Nested router -> parameter -> value -> metrics view
    /// @ai:effects pure
    pub fn to_nested(&self) -> BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, &MetricSet>>> {
        let mut nested: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, &MetricSet>>> =
            BTreeMap::new();
        for (key, metrics) in self.entries() {
            nested
                .entry(key.router.as_str())
                .or_default()
                .entry(key.parameter.as_str())
                .or_default()
                .insert(key.value.as_str(), metrics);
        }
        nested
    }

    fn sorted_values<F>(&self, keep: F) -> Vec<&str>
    where
        F: Fn(&AggregateKey) -> bool,
    {
        let unique: BTreeSet<&str> = self
            .entries
            .keys()
            .filter(|k| keep(*k))
            .map(|k| k.value.as_str())
            .collect();
        let mut values: Vec<&str> = unique.into_iter().collect();
        values.sort_by(|a, b| compare_values(a, b));
        values
    }
}
