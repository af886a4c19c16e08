//! @ai:module:intent ONE simulator message-stats report parsing, aggregation and charting
//! @ai:module:layer application
//! @ai:module:public_api config, error, group, input, metrics, report

pub mod config;
pub mod error;
pub mod group;
pub mod input;
pub mod metrics;
pub mod report;

pub use config::ReportConfig;
pub use error::{Error, Result};
pub use group::{GroupSummary, Grouper};
pub use input::{FilenameParser, ParsedReport, ReportIdentity, ReportLoader, ReportLoaderTrait};
pub use metrics::{AggregateTable, FlatTable, MetricSet, MetricValue};
pub use report::{read_export, ReportGenerator, ReportOptions};
