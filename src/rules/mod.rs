//! Transformation rules as supplied by the host.
//!
//! The core never discovers rules. Hosts hand over their rule list (or a
//! [`RuleCatalog`](crate::ports::RuleCatalog) over it); this module names
//! rules, describes their outputs, and finds the inputs whose result is
//! ambiguous.

mod conflicts;
mod id;

pub use conflicts::{Conflict, ConflictIndex};
pub use id::{KeyError, RuleId};

use serde::{Deserialize, Serialize};

/// A host rule handle that knows its own identifier.
pub trait HostRule {
    /// The rule's identifier.
    fn rule_id(&self) -> &RuleId;

    /// Returns `true` if the rule consumes `input`. Handles that carry no
    /// input list accept everything.
    fn accepts_input(&self, _input: &str) -> bool {
        true
    }
}

impl HostRule for RuleId {
    fn rule_id(&self) -> &RuleId {
        self
    }
}

/// One product of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutput {
    /// Produced item identifier.
    pub item: String,
    /// Stack size.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Probability in `0.0..=1.0`.
    #[serde(default = "default_chance")]
    pub chance: f32,
}

fn default_count() -> u32 {
    1
}

fn default_chance() -> f32 {
    1.0
}

impl RuleOutput {
    /// Signature part used to detect rules with identical products.
    ///
    /// Guaranteed outputs render as `item:count`; chanced outputs append the
    /// chance in permille.
    #[must_use]
    pub fn signature(&self) -> String {
        if self.chance >= 1.0 {
            format!("{}:{}", self.item, self.count)
        } else {
            format!("{}:{}:{}", self.item, self.count, permille(self.chance))
        }
    }
}

impl std::fmt::Display for RuleOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{}", self.item, self.count)?;
        if self.chance < 1.0 {
            write!(f, " ({}%)", permille(self.chance) / 10)?;
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn permille(chance: f32) -> i32 {
    (chance.clamp(0.0, 1.0) * 1000.0).round() as i32
}

/// A transformation rule: accepted inputs and what it produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: RuleId,
    /// Input keys the rule accepts.
    pub inputs: Vec<String>,
    /// Products.
    #[serde(default)]
    pub outputs: Vec<RuleOutput>,
}

impl Rule {
    /// Order-independent signature of all outputs.
    #[must_use]
    pub fn output_signature(&self) -> String {
        let mut parts: Vec<String> = self.outputs.iter().map(RuleOutput::signature).collect();
        parts.sort();
        parts.join("|")
    }

    /// Returns `true` if the rule accepts `input`.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        self.inputs.iter().any(|i| i == input)
    }
}

impl HostRule for Rule {
    fn rule_id(&self) -> &RuleId {
        &self.id
    }

    fn accepts_input(&self, input: &str) -> bool {
        self.accepts(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(item: &str, count: u32, chance: f32) -> RuleOutput {
        RuleOutput { item: item.to_string(), count, chance }
    }

    #[test]
    fn signature_ignores_output_order() {
        let id: RuleId = "create:crushing/a".parse().unwrap();
        let a = Rule {
            id: id.clone(),
            inputs: vec!["ore".into()],
            outputs: vec![output("gem", 1, 1.0), output("dust", 2, 0.25)],
        };
        let b = Rule {
            id,
            inputs: vec!["ore".into()],
            outputs: vec![output("dust", 2, 0.25), output("gem", 1, 1.0)],
        };
        assert_eq!(a.output_signature(), b.output_signature());
        assert_eq!(a.output_signature(), "dust:2:250|gem:1");
    }

    #[test]
    fn displays_chanced_outputs_as_percent() {
        assert_eq!(output("dust", 2, 0.25).to_string(), "dust x2 (25%)");
        assert_eq!(output("gem", 1, 1.0).to_string(), "gem x1");
    }

    #[test]
    fn output_defaults_apply_when_omitted() {
        let out: RuleOutput = serde_yaml::from_str("item: gravel\n").unwrap();
        assert_eq!(out.count, 1);
        assert!((out.chance - 1.0).abs() < f32::EPSILON);
    }
}
