//! Active-pair cache: the controller positions of every complete pair.
//!
//! This is a derived index over the link index. It is never persisted and
//! never patched incrementally; every store mutation recomputes it from
//! scratch so it cannot drift from the groups it describes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::grid::Position;
use crate::pairing::{controller_position, is_pair_geometry};

use super::group::GroupId;

/// Set of controller positions with a linked pair around them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePairCache {
    controllers: HashSet<Position>,
}

/// Result of recomputing the cache from the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rebuild {
    /// The fresh cache.
    pub cache: ActivePairCache,
    /// Two-member groups whose members have no on-grid midpoint.
    pub skipped: Vec<GroupId>,
}

impl ActivePairCache {
    /// Recomputes the cache from a link index.
    ///
    /// A two-member group contributes the midpoint of its members. Larger
    /// groups (only produced under the merge policy) contribute the midpoint
    /// of every member pair that sits in pair geometry.
    #[must_use]
    pub fn rebuild(index: &HashMap<Position, GroupId>) -> Rebuild {
        let mut by_group: BTreeMap<&GroupId, Vec<Position>> = BTreeMap::new();
        for (position, group) in index {
            by_group.entry(group).or_default().push(*position);
        }

        let mut controllers = HashSet::new();
        let mut skipped = Vec::new();
        for (group, members) in by_group {
            match members.as_slice() {
                [a, b] => match controller_position(*a, *b) {
                    Some(controller) => {
                        controllers.insert(controller);
                    }
                    None => skipped.push(group.clone()),
                },
                many if many.len() > 2 => {
                    for (i, a) in many.iter().enumerate() {
                        for b in &many[i + 1..] {
                            if is_pair_geometry(*a, *b) {
                                controllers.extend(controller_position(*a, *b));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Rebuild { cache: Self { controllers }, skipped }
    }

    /// O(1) membership test used by the resolution fast path.
    #[must_use]
    pub fn is_active(&self, controller: Position) -> bool {
        self.controllers.contains(&controller)
    }

    /// Number of active controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` if no controller is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Active controllers in sorted order.
    #[must_use]
    pub fn controllers(&self) -> BTreeSet<Position> {
        self.controllers.iter().copied().collect()
    }

    #[cfg(test)]
    pub(crate) fn force_active(&mut self, controller: Position) {
        self.controllers.insert(controller);
    }

    /// Compares this cache against a freshly computed one.
    #[must_use]
    pub fn diff(&self, expected: &ActivePairCache) -> CacheAudit {
        CacheAudit {
            missing: expected.controllers.difference(&self.controllers).copied().collect(),
            stale: self.controllers.difference(&expected.controllers).copied().collect(),
        }
    }
}

/// Differences between the live cache and a recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheAudit {
    /// Controllers that should be active but are not.
    pub missing: BTreeSet<Position>,
    /// Controllers that are active but should not be.
    pub stale: BTreeSet<Position>,
}

impl CacheAudit {
    /// Returns `true` if the live cache matches the recomputation.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[((i32, i32, i32), &str)]) -> HashMap<Position, GroupId> {
        entries
            .iter()
            .map(|&((x, y, z), g)| (Position::new(x, y, z), GroupId::new(g)))
            .collect()
    }

    #[test]
    fn pairs_contribute_their_midpoint() {
        let rebuilt =
            ActivePairCache::rebuild(&index(&[((0, 0, 0), "g1"), ((2, 0, 0), "g1")]));
        assert!(rebuilt.cache.is_active(Position::new(1, 0, 0)));
        assert_eq!(rebuilt.cache.len(), 1);
        assert!(rebuilt.skipped.is_empty());
    }

    #[test]
    fn single_members_are_not_active() {
        let rebuilt = ActivePairCache::rebuild(&index(&[((0, 0, 0), "g1")]));
        assert!(rebuilt.cache.is_empty());
    }

    #[test]
    fn off_grid_midpoints_are_skipped() {
        let rebuilt =
            ActivePairCache::rebuild(&index(&[((0, 0, 0), "odd"), ((3, 0, 0), "odd")]));
        assert!(rebuilt.cache.is_empty());
        assert_eq!(rebuilt.skipped, vec![GroupId::new("odd")]);
    }

    #[test]
    fn larger_groups_contribute_each_geometric_pair() {
        let rebuilt = ActivePairCache::rebuild(&index(&[
            ((0, 0, 0), "g"),
            ((2, 0, 0), "g"),
            ((4, 0, 0), "g"),
        ]));
        assert_eq!(
            rebuilt.cache.controllers().into_iter().collect::<Vec<_>>(),
            vec![Position::new(1, 0, 0), Position::new(3, 0, 0)]
        );
    }

    #[test]
    fn diff_reports_missing_and_stale_entries() {
        let live = ActivePairCache::rebuild(&index(&[((0, 0, 0), "a"), ((2, 0, 0), "a")])).cache;
        let expected =
            ActivePairCache::rebuild(&index(&[((0, 0, 5), "b"), ((0, 0, 7), "b")])).cache;
        let audit = live.diff(&expected);
        assert!(!audit.is_consistent());
        assert!(audit.missing.contains(&Position::new(0, 0, 6)));
        assert!(audit.stale.contains(&Position::new(1, 0, 0)));
        assert!(live.diff(&live.clone()).is_consistent());
    }
}
