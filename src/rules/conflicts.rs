//! Index of inputs that more than one distinct rule accepts.

use std::collections::{BTreeMap, HashSet};

use super::{Rule, RuleId};

/// One candidate rule for an ambiguous input.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    /// The candidate rule.
    pub rule_id: RuleId,
    /// Human-readable outputs, e.g. `gem x1`.
    pub outputs: Vec<String>,
    /// Order-independent output signature.
    pub signature: String,
}

impl Conflict {
    /// The first listed output item, or `"unknown"`.
    #[must_use]
    pub fn primary_output(&self) -> &str {
        self.outputs
            .first()
            .and_then(|o| o.split(' ').next())
            .unwrap_or("unknown")
    }
}

/// Inputs with more than one rule producing different results.
#[derive(Debug, Clone, Default)]
pub struct ConflictIndex {
    by_input: BTreeMap<String, Vec<Conflict>>,
}

impl ConflictIndex {
    /// Builds the index from the host's rule list.
    ///
    /// Rules are grouped by every input they accept. Within a group, rules
    /// whose output signature repeats an earlier rule's are dropped, so two
    /// mods shipping the same recipe do not count as a choice. Only inputs
    /// left with two or more candidates are kept.
    #[must_use]
    pub fn build(rules: &[Rule]) -> Self {
        let mut grouped: BTreeMap<&str, Vec<&Rule>> = BTreeMap::new();
        for rule in rules {
            for input in &rule.inputs {
                grouped.entry(input.as_str()).or_default().push(rule);
            }
        }

        let by_input = grouped
            .into_iter()
            .filter_map(|(input, candidates)| {
                let mut seen = HashSet::new();
                let unique: Vec<Conflict> = candidates
                    .into_iter()
                    .filter_map(|rule| {
                        let signature = rule.output_signature();
                        seen.insert(signature.clone()).then(|| Conflict {
                            rule_id: rule.id.clone(),
                            outputs: rule.outputs.iter().map(ToString::to_string).collect(),
                            signature,
                        })
                    })
                    .collect();
                (unique.len() > 1).then(|| (input.to_string(), unique))
            })
            .collect();

        Self { by_input }
    }

    /// Candidate rules for `input`; empty when the input is unambiguous.
    #[must_use]
    pub fn conflicts_for(&self, input: &str) -> &[Conflict] {
        self.by_input.get(input).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `input` has more than one distinct rule.
    #[must_use]
    pub fn is_ambiguous(&self, input: &str) -> bool {
        self.by_input.contains_key(input)
    }

    /// Ambiguous inputs in sorted order.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.by_input.keys().map(String::as_str)
    }

    /// Number of ambiguous inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_input.len()
    }

    /// Returns `true` if no input is ambiguous.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_input.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleOutput;

    fn rule(id: &str, inputs: &[&str], outputs: &[(&str, u32, f32)]) -> Rule {
        Rule {
            id: id.parse().unwrap(),
            inputs: inputs.iter().map(ToString::to_string).collect(),
            outputs: outputs
                .iter()
                .map(|&(item, count, chance)| RuleOutput { item: item.into(), count, chance })
                .collect(),
        }
    }

    #[test]
    fn finds_inputs_with_distinct_outputs() {
        let index = ConflictIndex::build(&[
            rule("a:gem", &["ore_raw"], &[("gem", 1, 1.0)]),
            rule("b:dust", &["ore_raw"], &[("dust", 2, 1.0)]),
            rule("c:sand", &["gravel"], &[("sand", 1, 1.0)]),
        ]);

        assert!(index.is_ambiguous("ore_raw"));
        assert!(!index.is_ambiguous("gravel"));
        assert_eq!(index.len(), 1);
        let ids: Vec<&str> =
            index.conflicts_for("ore_raw").iter().map(|c| c.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["a:gem", "b:dust"]);
    }

    #[test]
    fn duplicate_outputs_collapse_to_first_rule() {
        let index = ConflictIndex::build(&[
            rule("a:one", &["ore"], &[("gem", 1, 1.0), ("xp", 1, 0.5)]),
            rule("b:two", &["ore"], &[("xp", 1, 0.5), ("gem", 1, 1.0)]),
        ]);
        assert!(index.is_empty());
        assert!(index.conflicts_for("ore").is_empty());
    }

    #[test]
    fn multi_input_rules_count_for_each_input() {
        let index = ConflictIndex::build(&[
            rule("a:x", &["ore", "deepslate_ore"], &[("gem", 1, 1.0)]),
            rule("b:y", &["deepslate_ore"], &[("dust", 1, 1.0)]),
        ]);
        assert_eq!(index.inputs().collect::<Vec<_>>(), vec!["deepslate_ore"]);
        assert_eq!(index.conflicts_for("deepslate_ore")[1].primary_output(), "dust");
    }
}
