//! Condition Evaluation
//!
//! Conditions are data; evaluators give them meaning. [`ConditionEvaluators`]
//! is the dispatch table mapping an evaluator name to its implementation,
//! seeded from the [`CONDITION_EVALUATORS`](crate::registry::CONDITION_EVALUATORS)
//! slice and extendable by hand.

pub mod builtins;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use weave_domain::error::{Error, Result};
use weave_domain::ports::ConditionContext;
use weave_domain::value_objects::{Condition, Requirement};

use crate::registry::CONDITION_EVALUATORS;

/// Evaluates one kind of [`Requirement`].
///
/// Implementations may read the context but must be idempotent: the engine
/// re-evaluates pending conditions every round.
pub trait ConditionEvaluator: Send + Sync {
    /// Whether `requirement` holds against the current context
    fn evaluate(&self, requirement: &Requirement, context: &dyn ConditionContext) -> bool;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&Requirement, &dyn ConditionContext) -> bool + Send + Sync,
{
    fn evaluate(&self, requirement: &Requirement, context: &dyn ConditionContext) -> bool {
        self(requirement, context)
    }
}

/// Name → evaluator dispatch table
#[derive(Clone, Default)]
pub struct ConditionEvaluators {
    evaluators: HashMap<String, Arc<dyn ConditionEvaluator>>,
}

impl ConditionEvaluators {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with every evaluator submitted to the registry slice
    pub fn from_registry() -> Self {
        let mut table = Self::new();
        for entry in CONDITION_EVALUATORS {
            table.register(entry.name, entry.evaluate);
        }
        table
    }

    /// Add or replace an evaluator
    pub fn register<S, E>(&mut self, name: S, evaluator: E)
    where
        S: Into<String>,
        E: ConditionEvaluator + 'static,
    {
        self.evaluators.insert(name.into(), Arc::new(evaluator));
    }

    /// Whether an evaluator with `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    /// Registered evaluator names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluate a condition tree.
    ///
    /// Fails with [`Error::UnknownEvaluator`] when a visited leaf names an
    /// evaluator missing from the table. Leaves skipped by short-circuiting
    /// are not checked.
    pub fn evaluate(&self, condition: &Condition, context: &dyn ConditionContext) -> Result<bool> {
        let mut unknown: Option<String> = None;
        let satisfied = condition.evaluate(&mut |requirement: &Requirement| {
            match self.evaluators.get(requirement.evaluator.as_ref()) {
                Some(evaluator) => evaluator.evaluate(requirement, context),
                None => {
                    unknown.get_or_insert_with(|| requirement.evaluator.to_string());
                    false
                }
            }
        });
        match unknown {
            Some(name) => Err(Error::unknown_evaluator(name)),
            None => Ok(satisfied),
        }
    }
}

impl fmt::Debug for ConditionEvaluators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionEvaluators")
            .field("evaluators", &self.names())
            .finish()
    }
}
