//! Preference resolution for ambiguous rule selections.
//!
//! When the host engine picks one of several rules for an input, it raises
//! a selection event at the controller position between two devices. The
//! resolution path decides whether the linked pair there has a recorded
//! preference that should replace the host's default pick.
//!
//! [`resolve`] is the pure algorithm; [`ResolutionHook`] wraps it with fault
//! containment and logging for use at the host boundary.

mod hook;
mod preference;

pub use hook::ResolutionHook;
pub use preference::{find_linked_neighbor, select_input};

use std::fmt;

use crate::grid::Position;
use crate::ports::RuleCatalog;
use crate::rules::{HostRule, RuleId};

/// Read access to link state needed by the resolution path.
///
/// Implemented by the live store and by frozen snapshots of it.
pub trait PairLookup {
    /// Returns `true` if `controller` sits between a linked pair.
    fn is_active(&self, controller: Position) -> bool;

    /// Returns `true` if the device at `position` is linked.
    fn is_linked(&self, position: Position) -> bool;

    /// The preferred rule for `input` in the group of `position`.
    fn preference(&self, position: Position, input: &str) -> Option<&RuleId>;
}

/// Why the host's default pick was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Passthrough {
    /// The controller is not between a linked pair.
    Inactive,
    /// The cache marks the controller active but no neighbour is linked.
    NoLinkedNeighbor,
    /// The event carried no input key the pending rule accepts.
    NoInput,
    /// The pair has no preference for this input.
    NoPreference,
    /// The default pick already is the preferred rule.
    AlreadyPreferred,
    /// The preferred rule is not among the host's applicable rules.
    Dangling(RuleId),
    /// A fault was contained while resolving.
    Fault(String),
}

impl fmt::Display for Passthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Passthrough::Inactive => f.write_str("no linked pair around the controller"),
            Passthrough::NoLinkedNeighbor => {
                f.write_str("active-pair cache was stale; no neighbor is linked")
            }
            Passthrough::NoInput => f.write_str("no input accepted by the default rule"),
            Passthrough::NoPreference => f.write_str("no preference for this input"),
            Passthrough::AlreadyPreferred => f.write_str("default is already the preferred rule"),
            Passthrough::Dangling(id) => write!(f, "preferred rule {id} is not applicable"),
            Passthrough::Fault(message) => write!(f, "resolution failed: {message}"),
        }
    }
}

/// Outcome of resolving one selection event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<R> {
    /// Replace the default pick with this rule.
    Override(R),
    /// Keep the default pick.
    Default(Passthrough),
}

impl<R> Resolution<R> {
    /// Returns `true` if the default pick is replaced.
    #[must_use]
    pub fn is_override(&self) -> bool {
        matches!(self, Resolution::Override(_))
    }

    /// Returns `true` if the outcome revealed a stale active-pair cache.
    #[must_use]
    pub fn needs_cache_rebuild(&self) -> bool {
        matches!(self, Resolution::Default(Passthrough::NoLinkedNeighbor))
    }

    /// The rule the host should use.
    pub fn into_rule(self, default: R) -> R {
        match self {
            Resolution::Override(rule) => rule,
            Resolution::Default(_) => default,
        }
    }
}

/// Resolves one ambiguous selection raised at `controller`.
///
/// 1. Unless the controller is active, return immediately; nothing else is
///    consulted.
/// 2. Find the first linked neighbour of the controller.
/// 3. Take the first input key of the event the default rule accepts.
/// 4. Look up that pair's preference for the input; keep the default when
///    there is none or it already is the default.
/// 5. Fetch the preferred rule from the catalog; keep the default when the
///    catalog no longer knows it.
pub fn resolve<L, C>(
    lookup: &L,
    catalog: &C,
    controller: Position,
    default: &C::Rule,
    possible_inputs: &[String],
) -> Resolution<C::Rule>
where
    L: PairLookup + ?Sized,
    C: RuleCatalog + ?Sized,
{
    if !lookup.is_active(controller) {
        return Resolution::Default(Passthrough::Inactive);
    }
    let Some(linked) = find_linked_neighbor(lookup, controller) else {
        return Resolution::Default(Passthrough::NoLinkedNeighbor);
    };
    let Some(input) = select_input(default, possible_inputs) else {
        return Resolution::Default(Passthrough::NoInput);
    };
    let Some(preferred) = lookup.preference(linked, input) else {
        return Resolution::Default(Passthrough::NoPreference);
    };
    if preferred == default.rule_id() {
        return Resolution::Default(Passthrough::AlreadyPreferred);
    }
    match catalog.find_applicable(input, preferred) {
        Some(rule) => Resolution::Override(rule),
        None => Resolution::Default(Passthrough::Dangling(preferred.clone())),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::PairLookup;
    use crate::grid::Position;
    use crate::ports::RuleCatalog;
    use crate::rules::{Rule, RuleId};

    /// Catalog over a fixed rule list.
    pub struct ListCatalog(pub Vec<Rule>);

    impl ListCatalog {
        pub fn of(rules: &[(&str, &str)]) -> Self {
            Self(
                rules
                    .iter()
                    .map(|&(id, input)| Rule {
                        id: id.parse().unwrap(),
                        inputs: vec![input.to_string()],
                        outputs: vec![],
                    })
                    .collect(),
            )
        }

        pub fn get(&self, id: &str) -> Rule {
            self.0.iter().find(|r| r.id.as_str() == id).cloned().unwrap()
        }
    }

    impl RuleCatalog for ListCatalog {
        type Rule = Rule;

        fn find_applicable(&self, input: &str, id: &RuleId) -> Option<Rule> {
            self.0.iter().find(|r| &r.id == id && r.accepts(input)).cloned()
        }
    }

    /// Lookup that counts every call it receives.
    #[derive(Default)]
    pub struct CountingLookup {
        pub active: Vec<Position>,
        pub linked: HashMap<Position, HashMap<String, RuleId>>,
        pub calls: Cell<usize>,
    }

    impl PairLookup for CountingLookup {
        fn is_active(&self, controller: Position) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.active.contains(&controller)
        }

        fn is_linked(&self, position: Position) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.linked.contains_key(&position)
        }

        fn preference(&self, position: Position, input: &str) -> Option<&RuleId> {
            self.calls.set(self.calls.get() + 1);
            self.linked.get(&position)?.get(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::test_support::{CountingLookup, ListCatalog};
    use super::*;

    fn p(x: i32, y: i32, z: i32) -> Position {
        Position::new(x, y, z)
    }

    fn inputs(keys: &[&str]) -> Vec<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    fn catalog() -> ListCatalog {
        ListCatalog::of(&[("mod:recipe_a", "ore_raw"), ("mod:recipe_b", "ore_raw")])
    }

    fn linked_pair(preference: Option<&str>) -> CountingLookup {
        let prefs: HashMap<String, RuleId> = preference
            .map(|id| ("ore_raw".to_string(), id.parse().unwrap()))
            .into_iter()
            .collect();
        CountingLookup {
            active: vec![p(1, 0, 0)],
            linked: [(p(0, 0, 0), prefs.clone()), (p(2, 0, 0), prefs)].into_iter().collect(),
            calls: std::cell::Cell::new(0),
        }
    }

    #[test]
    fn preferred_rule_replaces_the_default() {
        let catalog = catalog();
        let lookup = linked_pair(Some("mod:recipe_b"));
        let default = catalog.get("mod:recipe_a");

        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));

        assert_eq!(result, Resolution::Override(catalog.get("mod:recipe_b")));
    }

    #[test]
    fn inactive_controller_costs_one_lookup() {
        let catalog = catalog();
        let lookup = CountingLookup::default();
        let default = catalog.get("mod:recipe_a");

        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));

        assert_eq!(result, Resolution::Default(Passthrough::Inactive));
        assert_eq!(lookup.calls.get(), 1);
    }

    #[test]
    fn missing_preference_keeps_default() {
        let catalog = catalog();
        let lookup = linked_pair(None);
        let default = catalog.get("mod:recipe_a");

        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));

        assert_eq!(result, Resolution::Default(Passthrough::NoPreference));
        assert_eq!(result.into_rule(default.clone()), default);
    }

    #[test]
    fn preference_equal_to_default_is_not_an_override() {
        let catalog = catalog();
        let lookup = linked_pair(Some("mod:recipe_a"));
        let default = catalog.get("mod:recipe_a");
        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));
        assert_eq!(result, Resolution::Default(Passthrough::AlreadyPreferred));
    }

    #[test]
    fn vanished_rule_is_reported_as_dangling() {
        let catalog = catalog();
        let lookup = linked_pair(Some("mod:recipe_gone"));
        let default = catalog.get("mod:recipe_a");
        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));
        assert_eq!(
            result,
            Resolution::Default(Passthrough::Dangling("mod:recipe_gone".parse().unwrap()))
        );
    }

    #[test]
    fn active_controller_without_linked_neighbor_requests_rebuild() {
        let catalog = catalog();
        let lookup = CountingLookup { active: vec![p(1, 0, 0)], ..CountingLookup::default() };
        let default = catalog.get("mod:recipe_a");
        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["ore_raw"]));
        assert!(result.needs_cache_rebuild());
        assert!(!result.is_override());
    }

    #[test]
    fn empty_inputs_keep_default() {
        let catalog = catalog();
        let lookup = linked_pair(Some("mod:recipe_b"));
        let default = catalog.get("mod:recipe_a");
        let result = resolve(&lookup, &catalog, p(1, 0, 0), &default, &inputs(&["", ""]));
        assert_eq!(result, Resolution::Default(Passthrough::NoInput));
    }
}
