//! Condition Evaluator Registry
//!
//! Evaluators are looked up by the name a [`Requirement`] carries. The
//! built-in ones live in [`crate::condition::builtins`] and submit themselves
//! here like any third-party evaluator would.

use weave_domain::ports::ConditionContext;
use weave_domain::value_objects::Requirement;

/// Registry entry for a condition evaluator
pub struct ConditionEvaluatorEntry {
    /// Evaluator name referenced by requirements
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Evaluation function
    pub evaluate: fn(&Requirement, &dyn ConditionContext) -> bool,
}

#[linkme::distributed_slice]
pub static CONDITION_EVALUATORS: [ConditionEvaluatorEntry] = [..];

/// List all registered condition evaluators
pub fn list_condition_evaluators() -> Vec<(&'static str, &'static str)> {
    let mut evaluators: Vec<(&'static str, &'static str)> = CONDITION_EVALUATORS
        .iter()
        .map(|entry| (entry.name, entry.description))
        .collect();
    evaluators.sort_by_key(|(name, _)| *name);
    evaluators
}
