//! Link groups and their identifiers.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::rules::RuleId;

/// Identifier of a link group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Wraps an identifier produced by the ID generator or read from disk.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of linked devices sharing one preference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGroup {
    /// The group's identifier.
    pub id: GroupId,
    /// Member positions.
    pub members: BTreeSet<Position>,
    /// Input key to preferred rule.
    pub preferences: HashMap<String, RuleId>,
}

impl LinkGroup {
    pub(crate) fn new(id: GroupId) -> Self {
        Self { id, members: BTreeSet::new(), preferences: HashMap::new() }
    }

    /// Returns `true` if the group is a complete pair.
    #[must_use]
    pub fn is_pair(&self) -> bool {
        self.members.len() == 2
    }
}
