//! The requirement rule store.
//!
//! Rules are read once from a JSON document of the form
//! `{"rules": [ {"name": ..., "type": ..., ...}, ... ]}` and are read-only
//! afterwards.

use std::{
    collections::{HashMap, hash_map::Entry},
    io,
    path::Path,
};

use serde::Deserialize;

use crate::domain::{Course, Rule};

/// An immutable, ordered collection of requirement rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct Document {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Loads rules from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// contains a malformed rule.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rules = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} requirement rules from {}",
            rules.len(),
            path.display()
        );
        Ok(rules)
    }

    /// Parses rules from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or contains a
    /// malformed rule.
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        let document: Document = serde_json::from_str(content)?;
        Ok(Self::new(document.rules))
    }

    /// Builds a rule set from already decoded rules.
    ///
    /// When several rules share a name, lookups by that name resolve to the
    /// first one. Every rule still takes part in [`RuleSet::all_satisfied`].
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            match index.entry(rule.name().to_string()) {
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
                Entry::Occupied(_) => {
                    tracing::warn!(
                        rule = rule.name(),
                        "duplicate requirement name, lookups use the first definition"
                    );
                }
            }
        }
        Self { rules, index }
    }

    /// Names of all rules, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    /// All rules, in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&position| &self.rules[position])
    }

    /// Looks up a rule by name, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if no rule has the given name.
    pub fn rule(&self, name: &str) -> Result<&Rule, UnknownRule> {
        self.get(name).ok_or_else(|| UnknownRule(name.to_string()))
    }

    /// The number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `course` satisfies the named requirement.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if no rule has the given name. This is distinct
    /// from the course not qualifying.
    pub fn fulfills(&self, course: &Course, requirement: &str) -> Result<bool, UnknownRule> {
        Ok(self.rule(requirement)?.is_satisfied_by(course.code.as_ref()))
    }

    /// Names of every requirement `course` satisfies, in document order.
    pub fn all_satisfied<'a>(&'a self, course: &'a Course) -> impl Iterator<Item = &'a str> {
        self.rules
            .iter()
            .filter(|rule| rule.is_satisfied_by(course.code.as_ref()))
            .map(Rule::name)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A requirement name that is not in the rule set.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Unknown requirement '{0}'")]
pub struct UnknownRule(pub String);

/// Errors that can occur while loading the rule set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The rules file could not be read.
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        /// Path of the rules file.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document is not valid JSON, or a rule is malformed.
    #[error("Failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),
}
