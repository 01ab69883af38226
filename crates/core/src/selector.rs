//! Equality-based label selectors for list operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An equality-based label selector.
///
/// A resource matches when every `key=value` requirement is present
/// verbatim in its labels. An empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality requirement.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    /// Whether the given label set satisfies every requirement.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.match_labels {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_selector_matches_anything() {
        let selector = LabelSelector::new();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "widgets")])));
    }

    #[test]
    fn all_requirements_must_hold() {
        let selector = LabelSelector::new()
            .with("app", "widgets")
            .with("tier", "backend");

        assert!(selector.matches(&labels(&[
            ("app", "widgets"),
            ("tier", "backend"),
            ("extra", "ignored"),
        ])));
        assert!(!selector.matches(&labels(&[("app", "widgets")])));
        assert!(!selector.matches(&labels(&[("app", "widgets"), ("tier", "frontend")])));
    }

    #[test]
    fn display_joins_sorted_requirements() {
        let selector = LabelSelector::new()
            .with("tier", "backend")
            .with("app", "widgets");
        assert_eq!(selector.to_string(), "app=widgets,tier=backend");
    }
}
