//! @ai:module:intent Decode configuration parameters encoded in report file names
//! @ai:module:layer domain
//! @ai:module:public_api FilenameParser, ReportIdentity, numeric_column
//! @ai:module:stateless true
//!
//! Grammar (after the report suffix is removed):
//!
//! ```text
//! name      := algorithm ( "-" segment )*
//! algorithm := any text without "-"          (opaque, may contain "@")
//! segment   := key "@" value                 (split on the first "@")
//!            | text without "@"              (ignored, or glued onto the next
//!                                             key when hyphenated keys are on)
//! ```

use crate::config::{NumericKind, NumericRule, ReportConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Name of the derived numeric column for a parameter
/// @ai:effects pure
pub fn numeric_column(key: &str) -> String {
    format!("{}_numeric", key)
}

/// @ai:intent Decoded configuration of one report file
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportIdentity {
    routing_key: String,
    routing_algorithm: String,
    /// Parameters in filename order, keys unique.
    params: Vec<(String, String)>,
    numeric: BTreeMap<String, i64>,
}

impl ReportIdentity {
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn routing_algorithm(&self) -> &str {
        &self.routing_algorithm
    }

    /// @ai:intent Parameters other than the routing algorithm, in filename order
    /// @ai:effects pure
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// @ai:intent Look up a raw string value; the routing key resolves to the algorithm
    /// @ai:effects pure
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == self.routing_key {
            return Some(&self.routing_algorithm);
        }
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// @ai:intent Derived numeric value of a parameter, when its rule applied
    /// @ai:effects pure
    pub fn numeric(&self, key: &str) -> Option<i64> {
        self.numeric.get(key).copied()
    }

    pub fn numeric_values(&self) -> impl Iterator<Item = (&str, i64)> {
        self.numeric.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// @ai:intent Last parameter key in filename order, excluding the routing algorithm
    /// @ai:effects pure
    pub fn last_param_key(&self) -> Option<&str> {
        self.params.last().map(|(k, _)| k.as_str())
    }

    /// @ai:intent Flat view with the routing key and `<key>_numeric` entries
    /// @ai:effects pure
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(self.routing_key.clone(), self.routing_algorithm.clone());
        for (k, v) in &self.params {
            map.insert(k.clone(), v.clone());
        }
        for (k, v) in &self.numeric {
            map.insert(numeric_column(k), v.to_string());
        }
        map
    }

    fn insert(&mut self, key: String, value: String) {
        if key == self.routing_key {
            self.routing_algorithm = value;
        } else if let Some(slot) = self.params.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.params.push((key, value));
        }
    }
}

/// @ai:intent Best-effort parser for `<algo>-<k>@<v>-..._MessageStatsReport.txt` names
pub struct FilenameParser {
    suffix: String,
    routing_key: String,
    hyphenated_keys: bool,
    rules: Vec<NumericRule>,
    leading_digits: Regex,
}

impl FilenameParser {
    /// @ai:intent Create a parser for the given vocabulary
    /// @ai:effects pure
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            suffix: config.input.report_suffix.clone(),
            routing_key: config.input.routing_key.clone(),
            hyphenated_keys: config.input.hyphenated_keys,
            rules: config.numeric_params.clone(),
            leading_digits: Regex::new(r"^\d+").expect("Invalid regex"),
        }
    }

    /// @ai:intent Whether a base name carries the report suffix
    /// @ai:effects pure
    pub fn is_report_name(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
    }

    /// @ai:intent Decode the base name of a path
    /// @ai:effects pure
    pub fn parse_path(&self, path: &Path) -> ReportIdentity {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.parse_name(&name)
    }

    /// @ai:intent Decode a base name; never fails, malformed segments are dropped
    /// @ai:effects pure
    pub fn parse_name(&self, name: &str) -> ReportIdentity {
        let stem = name
            .find(self.suffix.as_str())
            .map(|idx| &name[..idx])
            .unwrap_or(name);

        let mut tokens = stem.split('-');
        let algorithm = tokens.next().unwrap_or_default();

        let mut identity = ReportIdentity {
            routing_key: self.routing_key.clone(),
            routing_algorithm: algorithm.to_string(),
            params: Vec::new(),
            numeric: BTreeMap::new(),
        };

        let mut pending: Vec<&str> = Vec::new();
        for token in tokens {
            match token.split_once('@') {
                Some((key, value)) => {
                    let key = if self.hyphenated_keys && !pending.is_empty() {
                        pending.push(key);
                        pending.join("-")
                    } else {
                        key.to_string()
                    };
                    pending.clear();

                    if key.is_empty() {
                        continue;
                    }
                    identity.insert(key, value.to_string());
                }
                None if self.hyphenated_keys && !token.is_empty() => pending.push(token),
                None => {}
            }
        }

        for rule in &self.rules {
            let coerced = identity
                .get(&rule.key)
                .and_then(|value| self.coerce(rule.kind, value));
            if let Some(n) = coerced {
                identity.numeric.insert(rule.key.clone(), n);
            }
        }

        identity
    }

    /// @ai:intent Apply a numeric rule to a raw value
    /// @ai:effects pure
    pub fn coerce(&self, kind: NumericKind, value: &str) -> Option<i64> {
        match kind {
            NumericKind::LeadingDigits => self
                .leading_digits
                .find(value)
                .and_then(|m| m.as_str().parse().ok()),
            NumericKind::WholeInteger => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    value.parse().ok()
                } else {
                    None
                }
            }
        }
    }
}
