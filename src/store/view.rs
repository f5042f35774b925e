//! Immutable snapshot of the store for lock-free resolution.

use std::collections::HashMap;

use crate::grid::Position;
use crate::resolve::PairLookup;
use crate::rules::RuleId;

use super::cache::{ActivePairCache, CacheAudit};
use super::group::GroupId;

/// Everything the resolution path reads, frozen at one mutation generation.
#[derive(Debug, Clone, Default)]
pub struct ResolutionView {
    index: HashMap<Position, GroupId>,
    preferences: HashMap<GroupId, HashMap<String, RuleId>>,
    cache: ActivePairCache,
}

impl ResolutionView {
    pub(crate) fn new(
        index: HashMap<Position, GroupId>,
        preferences: HashMap<GroupId, HashMap<String, RuleId>>,
        cache: ActivePairCache,
    ) -> Self {
        Self { index, preferences, cache }
    }

    /// Compares the snapshot's cache with a recomputation from its index.
    #[must_use]
    pub fn audit_cache(&self) -> CacheAudit {
        self.cache.diff(&ActivePairCache::rebuild(&self.index).cache)
    }
}

impl PairLookup for ResolutionView {
    fn is_active(&self, controller: Position) -> bool {
        self.cache.is_active(controller)
    }

    fn is_linked(&self, position: Position) -> bool {
        self.index.contains_key(&position)
    }

    fn preference(&self, position: Position, input: &str) -> Option<&RuleId> {
        self.preferences.get(self.index.get(&position)?)?.get(input)
    }
}
