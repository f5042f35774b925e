//! Rule catalog port: the host's registry of transformation rules.

use crate::rules::{HostRule, RuleId};

/// Lookup into the rules the host considers applicable.
pub trait RuleCatalog {
    /// The host's rule handle returned from a selection.
    type Rule: HostRule;

    /// Finds the rule `id` among the rules applicable to `input`.
    ///
    /// Returns `None` when the rule no longer exists or does not accept the
    /// input.
    fn find_applicable(&self, input: &str, id: &RuleId) -> Option<Self::Rule>;
}
