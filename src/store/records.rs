//! On-disk layout of a saved link store.
//!
//! ```yaml
//! saved_at: 2024-06-15T10:30:00Z
//! links:
//!   - position: [0, 64, 0]
//!     group: 5b0e...
//! groups:
//!   - group: 5b0e...
//!     preferences:
//!       - input: raw_iron
//!         output: create:crushing/raw_iron
//! ```
//!
//! Preference entries are kept as raw YAML values so that one malformed
//! entry can be skipped without rejecting the rest of the file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::rules::RuleId;

use super::group::GroupId;

/// The whole store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    /// When the file was written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    /// Position to group assignments.
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    /// Per-group preference tables.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// One linked position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Device position.
    pub position: Position,
    /// Owning group.
    pub group: GroupId,
}

/// A group's preference table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    /// The group.
    pub group: GroupId,
    /// Raw preference entries; see [`PreferenceEntry`].
    #[serde(default)]
    pub preferences: Vec<serde_yaml::Value>,
}

/// A single well-formed preference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    /// Input key.
    pub input: String,
    /// Preferred rule, as written.
    pub output: String,
}

impl PreferenceEntry {
    /// Converts a typed preference into a raw record value.
    #[must_use]
    pub fn to_value(input: &str, output: &RuleId) -> serde_yaml::Value {
        let mut map = serde_yaml::Mapping::new();
        map.insert("input".into(), input.into());
        map.insert("output".into(), output.as_str().into());
        serde_yaml::Value::Mapping(map)
    }

    /// Parses a raw record value.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the value is not a mapping
    /// with string `input` and `output` fields, or when `output` is not a
    /// valid rule identifier.
    pub fn parse(value: &serde_yaml::Value) -> Result<(String, RuleId), String> {
        let entry: PreferenceEntry =
            serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())?;
        if entry.input.is_empty() {
            return Err("empty input key".to_string());
        }
        let output = entry.output.parse::<RuleId>().map_err(|e| e.to_string())?;
        Ok((entry.input, output))
    }
}
