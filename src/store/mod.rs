//! Link group store: the authoritative record of linked devices.
//!
//! Owns the position-to-group index, each group's preference table and the
//! derived [`ActivePairCache`]. Every mutation marks the store dirty and
//! recomputes the cache before returning, so a caller never observes a
//! half-updated cache.
//!
//! One store exists per simulated world. It is created when the world loads
//! (see [`LinkGroupStore::load`]) and dropped when it unloads.

mod cache;
mod group;
mod records;
mod view;

pub use cache::{ActivePairCache, CacheAudit, Rebuild};
pub use group::{GroupId, LinkGroup};
pub use records::{GroupRecord, LinkRecord, PreferenceEntry, StoreFile};
pub use view::ResolutionView;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::ServiceContext;
use crate::grid::Position;
use crate::pairing::{self, InvalidReason};
use crate::ports::DeviceView;
use crate::resolve::PairLookup;
use crate::rules::RuleId;

/// How a link request touching already-linked devices is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Every group is exactly one pair; linking an already-linked device
    /// is refused.
    #[default]
    Pairwise,
    /// Linking joins an unlinked device to an existing group, or merges two
    /// groups.
    Merge,
}

impl FromStr for LinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pairwise" => Ok(LinkPolicy::Pairwise),
            "merge" => Ok(LinkPolicy::Merge),
            other => Err(format!("Unknown link policy '{other}' (expected pairwise or merge)")),
        }
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkPolicy::Pairwise => "pairwise",
            LinkPolicy::Merge => "merge",
        })
    }
}

/// A rejected link request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Both ends of the request are the same position.
    #[error("cannot link a device to itself")]
    SelfLink,
    /// The positions fail pairing validation. Displays the reason verbatim.
    #[error("{0}")]
    InvalidPair(InvalidReason),
    /// Pairwise policy: one end already belongs to a group.
    #[error("device at {position} is already linked to another device")]
    AlreadyLinkedElsewhere {
        /// The already-linked position.
        position: Position,
    },
}

/// A preference operation on an unlinked device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceError {
    /// The position belongs to no group.
    #[error("device at {0} is not linked")]
    NotLinked(Position),
}

/// Saving or loading the store failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The file could not be read.
    #[error("Failed to read store file {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The file is not a valid store document.
    #[error("Failed to parse store file {path}: {source}")]
    Parse {
        /// File path.
        path: String,
        /// Underlying error.
        source: serde_yaml::Error,
    },
    /// The store could not be serialized.
    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_yaml::Error),
    /// The file could not be written.
    #[error("Failed to write store file {path}: {message}")]
    Write {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
}

/// What a successful link request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new group was created for two unlinked devices.
    Created(GroupId),
    /// An unlinked device joined an existing group.
    Joined(GroupId),
    /// Two groups became one.
    Merged {
        /// The surviving group.
        into: GroupId,
        /// The group that was absorbed and discarded.
        absorbed: GroupId,
    },
    /// Both devices were already in the same group.
    Unchanged(GroupId),
}

impl LinkOutcome {
    /// The group both devices belong to afterwards.
    #[must_use]
    pub fn group(&self) -> &GroupId {
        match self {
            LinkOutcome::Created(id)
            | LinkOutcome::Joined(id)
            | LinkOutcome::Unchanged(id)
            | LinkOutcome::Merged { into: id, .. } => id,
        }
    }
}

/// A group released by [`LinkGroupStore::unlink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissolved {
    /// The discarded group.
    pub group: GroupId,
    /// Every position that was released.
    pub released: Vec<Position>,
    /// Number of preferences discarded with the group.
    pub preferences_dropped: usize,
}

/// Persistent store of link groups and their preferences.
pub struct LinkGroupStore<'a> {
    ctx: &'a ServiceContext,
    policy: LinkPolicy,
    index: HashMap<Position, GroupId>,
    groups: HashMap<GroupId, LinkGroup>,
    cache: ActivePairCache,
    dirty: bool,
}

impl<'a> LinkGroupStore<'a> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, policy: LinkPolicy) -> Self {
        Self {
            ctx,
            policy,
            index: HashMap::new(),
            groups: HashMap::new(),
            cache: ActivePairCache::default(),
            dirty: false,
        }
    }

    /// The configured link policy.
    #[must_use]
    pub fn policy(&self) -> LinkPolicy {
        self.policy
    }

    /// The service context the store reports through.
    #[must_use]
    pub fn context(&self) -> &'a ServiceContext {
        self.ctx
    }

    // ---- linking ----

    /// Links the devices at `a` and `b`.
    ///
    /// The pair is validated against `world` before anything changes. Under
    /// [`LinkPolicy::Merge`], when both devices already belong to different
    /// groups, `a`'s group is absorbed into `b`'s and `b`'s preferences win
    /// on key collisions.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::SelfLink`] for `a == b`,
    /// [`LinkError::InvalidPair`] when validation fails, and
    /// [`LinkError::AlreadyLinkedElsewhere`] under the pairwise policy when
    /// either device is already linked to something else.
    pub fn link<W: DeviceView + ?Sized>(
        &mut self,
        world: &W,
        a: Position,
        b: Position,
    ) -> Result<LinkOutcome, LinkError> {
        if a == b {
            return Err(LinkError::SelfLink);
        }
        pairing::validate(world, a, b).map_err(LinkError::InvalidPair)?;

        let outcome = match (self.index.get(&a).cloned(), self.index.get(&b).cloned()) {
            (Some(ga), Some(gb)) if ga == gb => return Ok(LinkOutcome::Unchanged(ga)),
            (None, None) => {
                let id = GroupId::new(self.ctx.id_gen.generate_id());
                self.assign(a, &id);
                self.assign(b, &id);
                LinkOutcome::Created(id)
            }
            (Some(_), _) if self.policy == LinkPolicy::Pairwise => {
                return Err(LinkError::AlreadyLinkedElsewhere { position: a });
            }
            (_, Some(_)) if self.policy == LinkPolicy::Pairwise => {
                return Err(LinkError::AlreadyLinkedElsewhere { position: b });
            }
            (Some(ga), None) => {
                self.assign(b, &ga);
                LinkOutcome::Joined(ga)
            }
            (None, Some(gb)) => {
                self.assign(a, &gb);
                LinkOutcome::Joined(gb)
            }
            (Some(ga), Some(gb)) => {
                self.merge(&ga, &gb);
                LinkOutcome::Merged { into: gb, absorbed: ga }
            }
        };

        self.ctx.log.debug(&format!("Linked {a} and {b}: {outcome:?}"));
        self.touched();
        Ok(outcome)
    }

    /// Dissolves the group containing `position`.
    ///
    /// Every member of the group is released and its preferences are
    /// discarded. Returns `None` (and changes nothing) when the position is
    /// not linked.
    pub fn unlink(&mut self, position: Position) -> Option<Dissolved> {
        let id = self.index.get(&position)?.clone();
        let group = self.groups.remove(&id).unwrap_or_else(|| LinkGroup::new(id.clone()));
        self.index.retain(|_, g| *g != id);

        let released: Vec<Position> = group.members.iter().copied().collect();
        self.ctx.log.debug(&format!(
            "Dissolved group {id}: released {} device(s)",
            released.len()
        ));
        self.touched();
        Some(Dissolved { group: id, released, preferences_dropped: group.preferences.len() })
    }

    /// Called when the device at `position` is destroyed. Same as
    /// [`unlink`](Self::unlink).
    pub fn remove_device(&mut self, position: Position) -> Option<Dissolved> {
        self.unlink(position)
    }

    fn assign(&mut self, position: Position, id: &GroupId) {
        self.index.insert(position, id.clone());
        self.groups
            .entry(id.clone())
            .or_insert_with(|| LinkGroup::new(id.clone()))
            .members
            .insert(position);
    }

    fn merge(&mut self, source: &GroupId, destination: &GroupId) {
        let Some(absorbed) = self.groups.remove(source) else {
            return;
        };
        for member in &absorbed.members {
            self.assign(*member, destination);
        }
        if let Some(target) = self.groups.get_mut(destination) {
            for (input, output) in absorbed.preferences {
                target.preferences.entry(input).or_insert(output);
            }
        }
    }

    // ---- preferences ----

    /// Records `output` as the preferred rule for `input` in the group of
    /// the device at `position`, replacing any previous choice.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::NotLinked`] (and logs a warning) when the
    /// position belongs to no group. Nothing is stored in that case.
    pub fn set_preference(
        &mut self,
        position: Position,
        input: &str,
        output: RuleId,
    ) -> Result<(), PreferenceError> {
        let ctx = self.ctx;
        let Some(group) = self.group_mut(position) else {
            ctx.log.warn(&format!("Cannot set preference: device at {position} is not linked"));
            return Err(PreferenceError::NotLinked(position));
        };
        ctx.log.debug(&format!("Set preference for group {}: {input} -> {output}", group.id));
        group.preferences.insert(input.to_string(), output);
        self.touched();
        Ok(())
    }

    /// Removes the preference for `input`. Returns `true` if one was removed.
    pub fn clear_preference(&mut self, position: Position, input: &str) -> bool {
        let removed = self
            .group_mut(position)
            .is_some_and(|group| group.preferences.remove(input).is_some());
        if removed {
            self.touched();
        }
        removed
    }

    /// The preferred rule for `input`, if the device is linked and one is set.
    #[must_use]
    pub fn preference(&self, position: Position, input: &str) -> Option<&RuleId> {
        self.group(position)?.preferences.get(input)
    }

    /// A sorted snapshot of every preference of the device's group.
    #[must_use]
    pub fn all_preferences(&self, position: Position) -> BTreeMap<String, RuleId> {
        self.group(position)
            .map(|g| g.preferences.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    // ---- queries ----

    /// Returns `true` if the device at `position` belongs to a group.
    #[must_use]
    pub fn is_linked(&self, position: Position) -> bool {
        self.index.contains_key(&position)
    }

    /// The group of the device at `position`.
    #[must_use]
    pub fn group(&self, position: Position) -> Option<&LinkGroup> {
        self.groups.get(self.index.get(&position)?)
    }

    fn group_mut(&mut self, position: Position) -> Option<&mut LinkGroup> {
        self.groups.get_mut(self.index.get(&position)?)
    }

    /// All groups, sorted by identifier.
    #[must_use]
    pub fn groups(&self) -> Vec<&LinkGroup> {
        let mut groups: Vec<&LinkGroup> = self.groups.values().collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        groups
    }

    /// Number of linked positions.
    #[must_use]
    pub fn linked_count(&self) -> usize {
        self.index.len()
    }

    /// O(1) test whether `controller` sits between a linked pair.
    #[must_use]
    pub fn is_active(&self, controller: Position) -> bool {
        self.cache.is_active(controller)
    }

    /// The current active-pair cache.
    #[must_use]
    pub fn cache(&self) -> &ActivePairCache {
        &self.cache
    }

    // ---- cache maintenance ----

    /// Recomputes the active-pair cache from the index.
    pub fn rebuild_cache(&mut self) {
        let Rebuild { cache, skipped } = ActivePairCache::rebuild(&self.index);
        for id in skipped {
            self.ctx.log.warn(&format!("Group {id} has no on-grid controller position; skipped"));
        }
        self.cache = cache;
    }

    /// Marks `controller` active with no pair behind it.
    #[cfg(test)]
    pub(crate) fn force_active(&mut self, controller: Position) {
        self.cache.force_active(controller);
    }

    /// Compares the live cache with a fresh recomputation without changing
    /// anything.
    #[must_use]
    pub fn audit_cache(&self) -> CacheAudit {
        self.cache.diff(&ActivePairCache::rebuild(&self.index).cache)
    }

    /// A read-only copy of everything the resolution path needs.
    #[must_use]
    pub fn resolution_view(&self) -> ResolutionView {
        ResolutionView::new(
            self.index.clone(),
            self.groups.iter().map(|(id, g)| (id.clone(), g.preferences.clone())).collect(),
            self.cache.clone(),
        )
    }

    fn touched(&mut self) {
        self.dirty = true;
        self.rebuild_cache();
    }

    // ---- persistence ----

    /// Returns `true` if the store changed since it was loaded or saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Builds the on-disk representation, sorted for stable output.
    #[must_use]
    pub fn to_file(&self) -> StoreFile {
        let mut links: Vec<LinkRecord> = self
            .index
            .iter()
            .map(|(position, group)| LinkRecord { position: *position, group: group.clone() })
            .collect();
        links.sort_by(|a, b| a.position.cmp(&b.position));

        let groups = self
            .groups()
            .into_iter()
            .map(|g| {
                let mut prefs: Vec<(&String, &RuleId)> = g.preferences.iter().collect();
                prefs.sort();
                GroupRecord {
                    group: g.id.clone(),
                    preferences: prefs
                        .into_iter()
                        .map(|(input, output)| PreferenceEntry::to_value(input, output))
                        .collect(),
                }
            })
            .collect();

        StoreFile { saved_at: Some(self.ctx.clock.now()), links, groups }
    }

    /// Rebuilds a store from its on-disk representation.
    ///
    /// Malformed preference entries are skipped one by one with a warning.
    /// A position listed in two groups stays in the later one. Groups left
    /// with a single member are dissolved, and preference tables of groups
    /// without members are dropped. Any of those repairs marks the store
    /// dirty so the next save writes them back. The cache is rebuilt before
    /// the store is returned.
    #[must_use]
    pub fn from_file(ctx: &'a ServiceContext, policy: LinkPolicy, file: StoreFile) -> Self {
        let mut store = Self::new(ctx, policy);

        for record in file.links {
            if let Some(previous) =
                store.index.get(&record.position).filter(|g| **g != record.group)
            {
                ctx.log.warn(&format!(
                    "Position {} listed in groups {previous} and {}; keeping the latter",
                    record.position, record.group
                ));
                let previous = previous.clone();
                if let Some(g) = store.groups.get_mut(&previous) {
                    g.members.remove(&record.position);
                }
                store.dirty = true;
            }
            store.assign(record.position, &record.group);
        }

        let partial: Vec<GroupId> = store
            .groups
            .values()
            .filter(|g| g.members.len() < 2)
            .map(|g| g.id.clone())
            .collect();
        for id in partial {
            if let Some(group) = store.groups.remove(&id) {
                for member in &group.members {
                    store.index.remove(member);
                    ctx.log.warn(&format!(
                        "Group {id} has only one member at {member}; dissolving it"
                    ));
                }
            }
            store.dirty = true;
        }

        let mut skipped = 0usize;
        for record in file.groups {
            let Some(group) = store.groups.get_mut(&record.group) else {
                ctx.log.debug(&format!("Dropping preferences of empty group {}", record.group));
                store.dirty = true;
                continue;
            };
            for raw in &record.preferences {
                match PreferenceEntry::parse(raw) {
                    Ok((input, output)) => {
                        group.preferences.insert(input, output);
                    }
                    Err(e) => {
                        skipped += 1;
                        ctx.log.warn(&format!(
                            "Skipping unreadable preference in group {}: {e}",
                            record.group
                        ));
                    }
                }
            }
        }

        store.rebuild_cache();
        ctx.log.info(&format!(
            "Loaded {} linked device(s) in {} group(s), {} active controller(s), \
             {skipped} preference(s) skipped",
            store.index.len(),
            store.groups.len(),
            store.cache.len()
        ));
        store
    }

    /// Loads the store saved at `path`, or an empty store when no file
    /// exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// store document at all.
    pub fn load(
        ctx: &'a ServiceContext,
        policy: LinkPolicy,
        path: &Path,
    ) -> Result<Self, PersistError> {
        if !ctx.fs.exists(path) {
            return Ok(Self::new(ctx, policy));
        }
        let display = path.display().to_string();
        let contents = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| PersistError::Read { path: display.clone(), message: e.to_string() })?;
        let file: StoreFile = if contents.trim().is_empty() {
            StoreFile::default()
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|source| PersistError::Parse { path: display, source })?
        };
        Ok(Self::from_file(ctx, policy, file))
    }

    /// Writes the store to `path` and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails; the store stays
    /// dirty in that case.
    pub fn save(&mut self, path: &Path) -> Result<(), PersistError> {
        let yaml = serde_yaml::to_string(&self.to_file())?;
        self.ctx.fs.write(path, &yaml).map_err(|e| PersistError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.dirty = false;
        Ok(())
    }
}

impl PairLookup for LinkGroupStore<'_> {
    fn is_active(&self, controller: Position) -> bool {
        self.cache.is_active(controller)
    }

    fn is_linked(&self, position: Position) -> bool {
        self.index.contains_key(&position)
    }

    fn preference(&self, position: Position, input: &str) -> Option<&RuleId> {
        LinkGroupStore::preference(self, position, input)
    }
}
