//! Thread-safe store wrapper for hosts that resolve from worker threads.
//!
//! Writers serialize on one mutex; each mutation, its cache rebuild and the
//! publication of a fresh [`ResolutionView`] happen inside the same critical
//! section. Readers clone the published `Arc` and resolve against it
//! without touching the mutex, so a resolution sees either the state before
//! a mutation or the state after it, never a mix.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::grid::Position;
use crate::ports::{DeviceView, RuleCatalog};
use crate::resolve::{Resolution, ResolutionHook};
use crate::rules::RuleId;
use crate::store::{
    Dissolved, LinkError, LinkGroupStore, LinkOutcome, PreferenceError, ResolutionView,
};

/// A [`LinkGroupStore`] shared between one writer at a time and many readers.
pub struct SharedStore<'a> {
    store: Mutex<LinkGroupStore<'a>>,
    published: RwLock<Arc<ResolutionView>>,
    hook: ResolutionHook<'a>,
}

impl<'a> SharedStore<'a> {
    /// Wraps `store` and publishes its current state.
    #[must_use]
    pub fn new(store: LinkGroupStore<'a>) -> Self {
        let view = Arc::new(store.resolution_view());
        let hook = ResolutionHook::new(store.context().log.as_ref());
        Self { store: Mutex::new(store), published: RwLock::new(view), hook }
    }

    /// Runs `f` against the store and republishes before releasing the lock.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut LinkGroupStore<'a>) -> T) -> T {
        let mut store = self.lock();
        let out = f(&mut store);
        self.publish(&store);
        out
    }

    /// See [`LinkGroupStore::link`].
    ///
    /// # Errors
    ///
    /// Propagates the store's [`LinkError`].
    pub fn link<W: DeviceView + ?Sized>(
        &self,
        world: &W,
        a: Position,
        b: Position,
    ) -> Result<LinkOutcome, LinkError> {
        self.mutate(|store| store.link(world, a, b))
    }

    /// See [`LinkGroupStore::unlink`].
    pub fn unlink(&self, position: Position) -> Option<Dissolved> {
        self.mutate(|store| store.unlink(position))
    }

    /// See [`LinkGroupStore::set_preference`].
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::NotLinked`] for an unlinked device.
    pub fn set_preference(
        &self,
        position: Position,
        input: &str,
        output: RuleId,
    ) -> Result<(), PreferenceError> {
        self.mutate(|store| store.set_preference(position, input, output))
    }

    /// See [`LinkGroupStore::clear_preference`].
    pub fn clear_preference(&self, position: Position, input: &str) -> bool {
        self.mutate(|store| store.clear_preference(position, input))
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ResolutionView> {
        Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Resolves a selection against the published snapshot.
    ///
    /// A stale-cache fault triggers a rebuild and republish under the writer
    /// lock; the current event still falls through to `default`.
    pub fn resolve<C: RuleCatalog + ?Sized>(
        &self,
        catalog: &C,
        controller: Position,
        default: C::Rule,
        possible_inputs: &[String],
    ) -> C::Rule {
        let view = self.snapshot();
        let resolution: Resolution<C::Rule> =
            self.hook.resolve(&*view, catalog, controller, &default, possible_inputs);
        if resolution.needs_cache_rebuild() {
            self.mutate(LinkGroupStore::rebuild_cache);
        }
        resolution.into_rule(default)
    }

    /// Unwraps the store.
    #[must_use]
    pub fn into_inner(self) -> LinkGroupStore<'a> {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, LinkGroupStore<'a>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, store: &LinkGroupStore<'a>) {
        let view = Arc::new(store.resolution_view());
        *self.published.write().unwrap_or_else(PoisonError::into_inner) = view;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::context::ServiceContext;
    use crate::grid::Axis;
    use crate::pairing::test_world::TestWorld;
    use crate::resolve::PairLookup;
    use crate::rules::Rule;
    use crate::store::LinkPolicy;

    fn catalog() -> Vec<Rule> {
        ["mod:recipe_a", "mod:recipe_b"]
            .into_iter()
            .map(|id| Rule {
                id: id.parse().unwrap(),
                inputs: vec!["ore_raw".to_string()],
                outputs: vec![],
            })
            .collect()
    }

    struct Catalog(Vec<Rule>);

    impl RuleCatalog for Catalog {
        type Rule = Rule;

        fn find_applicable(&self, input: &str, id: &RuleId) -> Option<Rule> {
            self.0.iter().find(|r| &r.id == id && r.accepts(input)).cloned()
        }
    }

    fn world() -> TestWorld {
        TestWorld::with(&[((0, 0, 0), Axis::Y), ((2, 0, 0), Axis::Y)])
    }

    #[test]
    fn mutations_publish_a_new_snapshot() {
        let ctx = ServiceContext::in_memory();
        let shared = SharedStore::new(LinkGroupStore::new(&ctx, LinkPolicy::Pairwise));
        let before = shared.snapshot();

        shared.link(&world(), Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();

        assert!(!before.is_active(Position::new(1, 0, 0)));
        assert!(shared.snapshot().is_active(Position::new(1, 0, 0)));
        assert!(shared.snapshot().audit_cache().is_consistent());
    }

    #[test]
    fn readers_see_default_or_preference_while_writer_churns() {
        let ctx = ServiceContext::in_memory();
        let shared = SharedStore::new(LinkGroupStore::new(&ctx, LinkPolicy::Pairwise));
        let world = world();
        let catalog = Catalog(catalog());
        let default = catalog.0[0].clone();
        let inputs = vec!["ore_raw".to_string()];

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..50 {
                    shared.link(&world, Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();
                    shared
                        .set_preference(
                            Position::new(0, 0, 0),
                            "ore_raw",
                            "mod:recipe_b".parse().unwrap(),
                        )
                        .unwrap();
                    shared.unlink(Position::new(2, 0, 0));
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let controller = Position::new(1, 0, 0);
                        let chosen =
                            shared.resolve(&catalog, controller, default.clone(), &inputs);
                        assert!(["mod:recipe_a", "mod:recipe_b"].contains(&chosen.id.as_str()));
                    }
                });
            }
        });

        let store = shared.into_inner();
        assert!(!store.is_linked(Position::new(0, 0, 0)));
        assert!(store.audit_cache().is_consistent());
    }

    #[test]
    fn stale_snapshot_is_rebuilt_and_republished() {
        let ctx = ServiceContext::in_memory();
        let mut store = LinkGroupStore::new(&ctx, LinkPolicy::Pairwise);
        store.link(&world(), Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();
        store.force_active(Position::new(7, 0, 7));
        let shared = SharedStore::new(store);
        let stale = shared.snapshot();
        assert!(stale.is_active(Position::new(7, 0, 7)));

        let catalog = Catalog(catalog());
        let chosen = shared.resolve(
            &catalog,
            Position::new(7, 0, 7),
            catalog.0[0].clone(),
            &["ore_raw".to_string()],
        );

        assert_eq!(chosen.id.as_str(), "mod:recipe_a");
        let fresh = shared.snapshot();
        assert!(!fresh.is_active(Position::new(7, 0, 7)));
        assert!(fresh.is_active(Position::new(1, 0, 0)));
        assert!(fresh.audit_cache().is_consistent());
        assert!(!stale.audit_cache().is_consistent());
    }

    #[test]
    fn override_is_visible_after_preference_is_published() {
        let ctx = ServiceContext::in_memory();
        let shared = SharedStore::new(LinkGroupStore::new(&ctx, LinkPolicy::Pairwise));
        let catalog = Catalog(catalog());
        shared.link(&world(), Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();
        shared
            .set_preference(Position::new(2, 0, 0), "ore_raw", "mod:recipe_b".parse().unwrap())
            .unwrap();

        let chosen = shared.resolve(
            &catalog,
            Position::new(1, 0, 0),
            catalog.0[0].clone(),
            &["ore_raw".to_string()],
        );
        assert_eq!(chosen.id.as_str(), "mod:recipe_b");
    }
}
