//! @ai:module:intent Discover and load report files from an input directory
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportLoader, ReportLoaderTrait, ParsedReport
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::input::filename::{FilenameParser, ReportIdentity};
use crate::input::reader::read_report;
use crate::metrics::MetricSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent One report file with its decoded name and body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub path: PathBuf,
    pub name: String,
    pub identity: ReportIdentity,
    pub metrics: MetricSet,
}

/// @ai:intent Trait for loading the report set of a directory
pub trait ReportLoaderTrait {
    /// @ai:intent Report paths of a directory, sorted by file name
    fn discover(&self, input_dir: &Path) -> Result<Vec<PathBuf>>;

    /// @ai:intent Parse every discovered report, skipping unreadable ones
    fn load_all(&self, input_dir: &Path) -> Result<Vec<ParsedReport>>;
}

/// @ai:intent Loads `*_MessageStatsReport.txt` files (non-recursive)
pub struct ReportLoader {
    parser: FilenameParser,
}

impl ReportLoader {
    /// @ai:intent Create a loader for the given vocabulary
    /// @ai:effects pure
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            parser: FilenameParser::new(config),
        }
    }

    pub fn parser(&self) -> &FilenameParser {
        &self.parser
    }

    /// @ai:intent Fail early when the input directory is absent
    /// @ai:effects fs:read
    pub fn ensure_input_dir(input_dir: &Path) -> Result<()> {
        if input_dir.is_dir() {
            Ok(())
        } else {
            Err(Error::InputDirMissing(input_dir.to_path_buf()))
        }
    }

    /// @ai:intent Parse a single report file
    /// @ai:effects fs:read
    fn parse_report_file(&self, path: &Path) -> Result<ParsedReport> {
        let metrics = read_report(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ParsedReport {
            path: path.to_path_buf(),
            identity: self.parser.parse_name(&name),
            name,
            metrics,
        })
    }
}

impl ReportLoaderTrait for ReportLoader {
    fn discover(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        Self::ensure_input_dir(input_dir)?;

        let mut paths = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", input_dir.display(), e);
                    continue;
                }
            };

            let is_report = entry
                .file_name()
                .to_str()
                .map(|name| self.parser.is_report_name(name))
                .unwrap_or(false);

            if is_report && entry.path().is_file() {
                paths.push(entry.into_path());
            }
        }

        tracing::debug!("Discovered {} report files in {}", paths.len(), input_dir.display());
        Ok(paths)
    }

    fn load_all(&self, input_dir: &Path) -> Result<Vec<ParsedReport>> {
        let files = self.discover(input_dir)?;
        let mut reports = Vec::with_capacity(files.len());

        for path in files {
            match self.parse_report_file(&path) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!("Skipping unreadable report {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} report files", reports.len());
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_report(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_load_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        write_report(temp.path(), "Spray-ttl@60_MessageStatsReport.txt", "h\ndelivered: 2\n");
        write_report(temp.path(), "Epidemic-ttl@60_MessageStatsReport.txt", "h\ndelivered: 1\n");
        write_report(temp.path(), "Epidemic-ttl@60_ContactTimesReport.txt", "h\nx: 1\n");
        std::fs::create_dir(temp.path().join("nested_MessageStatsReport.txt")).unwrap();

        let loader = ReportLoader::new(&ReportConfig::default());
        let reports = loader.load_all(temp.path()).unwrap();

        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Epidemic-ttl@60_MessageStatsReport.txt",
                "Spray-ttl@60_MessageStatsReport.txt"
            ]
        );
        assert_eq!(reports[0].identity.routing_algorithm(), "Epidemic");
        assert_eq!(reports[1].metrics.defined("delivered"), Some(2.0));
    }

    #[test]
    fn test_unreadable_report_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_report(temp.path(), "Epidemic-ttl@60_MessageStatsReport.txt", "h\ndelivered: 1\n");
        std::fs::write(
            temp.path().join("Broken-ttl@60_MessageStatsReport.txt"),
            [0xff, 0xfe, 0x00, 0xc3],
        )
        .unwrap();

        let loader = ReportLoader::new(&ReportConfig::default());
        let reports = loader.load_all(temp.path()).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].identity.routing_algorithm(), "Epidemic");
    }

    #[test]
    fn test_missing_input_dir() {
        let temp = TempDir::new().unwrap();
        let loader = ReportLoader::new(&ReportConfig::default());

        let err = loader.load_all(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::InputDirMissing(_)));
    }

    #[test]
    fn test_empty_dir_loads_nothing() {
        let temp = TempDir::new().unwrap();
        let loader = ReportLoader::new(&ReportConfig::default());
        assert!(loader.load_all(temp.path()).unwrap().is_empty());
    }
}
