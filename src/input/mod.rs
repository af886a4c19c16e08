//! @ai:module:intent Report file discovery, filename decoding and body parsing
//! @ai:module:layer domain
//! @ai:module:public_api FilenameParser, ReportIdentity, ReportLoader, ParsedReport, read_report

pub mod filename;
pub mod loader;
pub mod reader;

pub use filename::{numeric_column, FilenameParser, ReportIdentity};
pub use loader::{ParsedReport, ReportLoader, ReportLoaderTrait};
pub use reader::{parse_report_body, read_report};
