//! Entry points a host integration calls into.
//!
//! A [`HostBridge`] owns the link store of one world together with that
//! world's device view and rule catalog. Hosts forward their events to the
//! `on_*` methods and persist through [`HostBridge::save`].

use std::path::Path;

use crate::context::ServiceContext;
use crate::grid::Position;
use crate::ports::{DeviceView, RuleCatalog};
use crate::resolve::{Resolution, ResolutionHook};
use crate::rules::RuleId;
use crate::store::{
    Dissolved, LinkError, LinkGroupStore, LinkOutcome, LinkPolicy, PersistError, PreferenceError,
};

/// One world's link state wired to its host.
pub struct HostBridge<'a, W> {
    world: W,
    store: LinkGroupStore<'a>,
    hook: ResolutionHook<'a>,
}

impl<'a, W: DeviceView> HostBridge<'a, W> {
    /// Bridges `world` to an existing store.
    pub fn new(world: W, store: LinkGroupStore<'a>) -> Self {
        let hook = ResolutionHook::new(store.context().log.as_ref());
        Self { world, store, hook }
    }

    /// Loads the store saved at `path` (empty if none) and bridges `world`
    /// to it. The active-pair cache is ready before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing store file cannot be read or parsed.
    pub fn load(
        ctx: &'a ServiceContext,
        world: W,
        policy: LinkPolicy,
        path: &Path,
    ) -> Result<Self, PersistError> {
        Ok(Self::new(world, LinkGroupStore::load(ctx, policy, path)?))
    }

    /// Writes the store to `path` if it changed. Returns whether it wrote.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&mut self, path: &Path) -> Result<bool, PersistError> {
        if !self.store.is_dirty() {
            return Ok(false);
        }
        self.store.save(path)?;
        Ok(true)
    }

    /// A device was destroyed or removed; its whole group dissolves.
    pub fn on_device_removed(&mut self, position: Position) -> Option<Dissolved> {
        self.store.remove_device(position)
    }

    /// The user asked to link two devices.
    ///
    /// # Errors
    ///
    /// Returns the rejection; its `Display` is the user-facing reason.
    pub fn on_link_requested(
        &mut self,
        a: Position,
        b: Position,
    ) -> Result<LinkOutcome, LinkError> {
        self.store.link(&self.world, a, b)
    }

    /// The user picked a preferred rule for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::NotLinked`] for an unlinked device.
    pub fn on_preference_set(
        &mut self,
        position: Position,
        input: &str,
        output: RuleId,
    ) -> Result<(), PreferenceError> {
        self.store.set_preference(position, input, output)
    }

    /// The user cleared the preference for `input`.
    pub fn on_preference_cleared(&mut self, position: Position, input: &str) -> bool {
        self.store.clear_preference(position, input)
    }

    /// The world this bridge serves.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the world, for hosts that move devices around.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// The link store.
    pub fn store(&self) -> &LinkGroupStore<'a> {
        &self.store
    }
}

impl<W: DeviceView + RuleCatalog> HostBridge<'_, W> {
    /// The host is about to apply `default` at `controller`; returns the
    /// rule it should apply instead. Never fails.
    pub fn on_ambiguous_selection(
        &mut self,
        controller: Position,
        default: W::Rule,
        possible_inputs: &[String],
    ) -> W::Rule {
        self.explain_selection(controller, &default, possible_inputs).into_rule(default)
    }

    /// Like [`on_ambiguous_selection`](Self::on_ambiguous_selection), but
    /// reports why the default was kept.
    pub fn explain_selection(
        &mut self,
        controller: Position,
        default: &W::Rule,
        possible_inputs: &[String],
    ) -> Resolution<W::Rule> {
        let resolution =
            self.hook.resolve(&self.store, &self.world, controller, default, possible_inputs);
        if resolution.needs_cache_rebuild() {
            self.store.rebuild_cache();
        }
        resolution
    }
}
