//! Validated rule identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned for a malformed identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Nothing after the optional namespace.
    #[error("identifier '{0}' has an empty path")]
    EmptyPath(String),
    /// A character outside the allowed set.
    #[error("identifier '{id}' contains invalid character '{ch}'")]
    InvalidChar {
        /// The rejected identifier.
        id: String,
        /// The first offending character.
        ch: char,
    },
}

/// Identifier of a transformation rule, written `namespace:path`.
///
/// The namespace is optional. Neither part may contain whitespace or
/// control characters, and the namespace may not contain `/`. Case is kept
/// as written, so `recipe_A` and `recipe_a` are different rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// The identifier as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part, if present.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(':').map(|(ns, _)| ns)
    }

    /// The path part.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }
}

fn check(id: &str, part: &str, allow_slash: bool) -> Result<(), KeyError> {
    let bad = part
        .chars()
        .find(|&c| c.is_whitespace() || c.is_control() || (!allow_slash && c == '/'));
    match bad {
        Some(ch) => Err(KeyError::InvalidChar { id: id.to_string(), ch }),
        None => Ok(()),
    }
}

impl FromStr for RuleId {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = match s.split_once(':') {
            Some((ns, path)) => (Some(ns), path),
            None => (None, s),
        };
        if path.is_empty() {
            return Err(KeyError::EmptyPath(s.to_string()));
        }
        if let Some(ns) = namespace {
            check(s, ns, false)?;
        }
        check(s, path, true)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for RuleId {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self {
        id.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_and_bare_ids() {
        let id: RuleId = "create:crushing/raw_iron_ore".parse().unwrap();
        assert_eq!(id.namespace(), Some("create"));
        assert_eq!(id.path(), "crushing/raw_iron_ore");

        let bare: RuleId = "recipe_b".parse().unwrap();
        assert_eq!(bare.namespace(), None);
        assert_eq!(bare.path(), "recipe_b");
    }

    #[test]
    fn keeps_case_as_written() {
        let upper: RuleId = "recipe_B".parse().unwrap();
        assert_eq!(upper.as_str(), "recipe_B");
        assert_ne!(upper, "recipe_b".parse().unwrap());

        let namespaced: RuleId = "Create:Crushing/Raw_Ore".parse().unwrap();
        assert_eq!(namespaced.namespace(), Some("Create"));
    }

    #[test]
    fn rejects_bad_characters() {
        assert_eq!(
            "ns:has space".parse::<RuleId>(),
            Err(KeyError::InvalidChar { id: "ns:has space".into(), ch: ' ' })
        );
        assert_eq!(
            "a/b:c".parse::<RuleId>(),
            Err(KeyError::InvalidChar { id: "a/b:c".into(), ch: '/' })
        );
        assert!("ns:tab\there".parse::<RuleId>().is_err());
        assert_eq!("ns:".parse::<RuleId>(), Err(KeyError::EmptyPath("ns:".into())));
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_yaml::from_str::<RuleId>("\"ok:path\"").is_ok());
        assert!(serde_yaml::from_str::<RuleId>("recipe_A").is_ok());
        assert!(serde_yaml::from_str::<RuleId>("\"NOT OK\"").is_err());
    }
}
