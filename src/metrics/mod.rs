//! @ai:module:intent Metric values, the aggregate table and the flat table
//! @ai:module:layer application
//! @ai:module:public_api MetricValue, MetricSet, MetricSummary, AggregateTable, FlatTable

pub mod aggregator;
pub mod flat;
pub mod ordering;
pub mod types;

pub use aggregator::{AggregateKey, AggregateTable, SeriesPoint};
pub use flat::{ColumnKind, FlatTable, PivotPoint, SOURCE_COLUMN};
pub use ordering::{compare_values, numeric_reading};
pub use types::{MetricSet, MetricSummary, MetricValue};
