//! @ai:module:intent Sort report files into per-value directories
//! @ai:module:layer application
//! @ai:module:public_api Grouper, GroupSummary
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::input::{ReportLoader, ReportLoaderTrait};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Files copied per `<key>@<value>` directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSummary {
    pub group_by: String,
    pub groups: BTreeMap<String, Vec<String>>,
    pub skipped: Vec<String>,
}

/// @ai:intent Copies reports into `<output>/<key>@<value>/`
pub struct Grouper {
    loader: ReportLoader,
}

impl Grouper {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            loader: ReportLoader::new(config),
        }
    }

    /// @ai:intent Group every report by a parameter, defaulting to the last key of the first file
    /// @ai:pre input_dir exists
    /// @ai:effects fs:read, fs:write
    /// @ai:example group(in, out, Some("ttl")) copies A-ttl@300_... to out/ttl@300/
    pub fn group(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        group_by: Option<&str>,
    ) -> Result<GroupSummary> {
        let files = self.loader.discover(input_dir)?;
        let parser = self.loader.parser();
        std::fs::create_dir_all(output_dir)?;

        let Some(first) = files.first() else {
            tracing::warn!("No report files found in {}", input_dir.display());
            return Ok(GroupSummary {
                group_by: group_by.unwrap_or_default().to_string(),
                ..Default::default()
            });
        };

        let group_by = match group_by {
            Some(key) => key.to_string(),
            None => {
                let identity = parser.parse_path(first);
                let key = identity.last_param_key().ok_or_else(|| {
                    Error::NoGroupingParameter(first.display().to_string())
                })?;
                tracing::info!("Grouping by last parameter of {}: {}", first.display(), key);
                key.to_string()
            }
        };

        let mut summary = GroupSummary {
            group_by: group_by.clone(),
            ..Default::default()
        };

        for path in &files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let identity = parser.parse_name(&name);

            let value = match identity.get(&group_by) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    tracing::debug!("{} has no value for {}, skipping", name, group_by);
                    summary.skipped.push(name);
                    continue;
                }
            };

            let dir_name = format!("{}@{}", group_by, value);
            let target_dir = output_dir.join(&dir_name);
            std::fs::create_dir_all(&target_dir)?;
            std::fs::copy(path, target_dir.join(&name))?;

            summary.groups.entry(dir_name).or_default().push(name);
        }

        for (dir, members) in &summary.groups {
            tracing::info!("{}: {} file(s)", dir, members.len());
        }
        if !summary.skipped.is_empty() {
            tracing::info!("Skipped {} file(s) without {}", summary.skipped.len(), group_by);
        }

        Ok(summary)
    }
}
