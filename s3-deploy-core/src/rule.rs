//! Include / exclude rules evaluated against a file's relative path.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::DeployError;

/// Predicate form of a [`Rule`].
pub type RulePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A filter over relative file paths.
///
/// `Pattern` is kept as source text and compiled on every test; file counts are
/// small enough that this is not worth caching. Use `Regex` for a precompiled form.
#[derive(Clone)]
pub enum Rule {
    Regex(Regex),
    Predicate(RulePredicate),
    /// Every sub-rule must match. An empty list matches everything.
    List(Vec<Rule>),
    Pattern(String),
}

impl Rule {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Rule::Pattern(pattern.into())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Rule::Predicate(Arc::new(f))
    }

    /// Compiles every nested pattern so a bad rule fails before any file is touched.
    pub fn validate(&self) -> Result<(), DeployError> {
        match self {
            Rule::Regex(_) | Rule::Predicate(_) => Ok(()),
            Rule::List(rules) => rules.iter().try_for_each(Rule::validate),
            Rule::Pattern(pattern) => compile(pattern).map(|_| ()),
        }
    }

    pub fn test(&self, subject: &str) -> Result<bool, DeployError> {
        test_rule(self, subject)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Rule::Predicate(_) => f.write_str("Predicate(<fn>)"),
            Rule::List(rules) => f.debug_tuple("List").field(rules).finish(),
            Rule::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
        }
    }
}

impl From<Regex> for Rule {
    fn from(re: Regex) -> Self {
        Rule::Regex(re)
    }
}

impl From<&str> for Rule {
    fn from(pattern: &str) -> Self {
        Rule::Pattern(pattern.to_string())
    }
}

impl From<Vec<Rule>> for Rule {
    fn from(rules: Vec<Rule>) -> Self {
        Rule::List(rules)
    }
}

/// Tests `subject` against `rule`. List rules short-circuit on the first miss.
pub fn test_rule(rule: &Rule, subject: &str) -> Result<bool, DeployError> {
    match rule {
        Rule::Regex(re) => Ok(re.is_match(subject)),
        Rule::Predicate(predicate) => Ok(predicate(subject)),
        Rule::List(rules) => {
            for condition in rules {
                if !test_rule(condition, subject)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Rule::Pattern(pattern) => Ok(compile(pattern)?.is_match(subject)),
    }
}

fn compile(pattern: &str) -> Result<Regex, DeployError> {
    Regex::new(pattern).map_err(|e| DeployError::InvalidRule(format!("{pattern:?}: {e}")))
}
