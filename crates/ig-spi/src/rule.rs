//! Rule execution.
//!
//! A [`Rule`] object only stores source text. Running it is delegated to a
//! [`RuleRunner`]. [`RuleLibrary`] is a runner backed by native Rust
//! functions registered under rule names, which is what tests and the
//! command-line tools use.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ig_model::{AttrValue, Attributes, Rule};
use tracing::debug;

use crate::error::{SpiError, SpiResult};

/// Runs rules.
#[async_trait]
pub trait RuleRunner: Send + Sync {
    /// Runs a rule with the given arguments and returns its value.
    ///
    /// ## Errors
    ///
    /// Returns `SpiError::RuleNotFound` if the runner cannot run the rule
    /// and `SpiError::RuleFailed` if the rule itself fails.
    async fn run_rule(&self, rule: &Rule, args: &Attributes) -> SpiResult<AttrValue>;
}

/// A native rule implementation.
pub type RuleFn = Arc<dyn Fn(&Rule, &Attributes) -> SpiResult<AttrValue> + Send + Sync>;

/// Rule runner backed by registered functions.
#[derive(Default)]
pub struct RuleLibrary {
    rules: DashMap<String, RuleFn>,
}

impl fmt::Debug for RuleLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleLibrary")
            .field("rules", &self.names())
            .finish()
    }
}

impl RuleLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an implementation for the named rule, replacing any
    /// earlier one.
    pub fn register<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&Rule, &Attributes) -> SpiResult<AttrValue> + Send + Sync + 'static,
    {
        self.rules.insert(name.into(), Arc::new(f));
    }

    /// Checks if an implementation is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Lists registered rule names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl RuleRunner for RuleLibrary {
    async fn run_rule(&self, rule: &Rule, args: &Attributes) -> SpiResult<AttrValue> {
        let name = rule.header.name.as_deref().unwrap_or_default();
        let f = self
            .rules
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SpiError::RuleNotFound(name.to_string()))?;
        debug!(rule = name, language = rule.language_or_default(), "Running rule");
        f(rule, args)
    }
}
