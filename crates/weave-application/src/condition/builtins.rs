//! Built-in Condition Evaluators
//!
//! | Name | Holds when |
//! |------|------------|
//! | `present` | every listed type has a registered provider |
//! | `missing` | no listed type has a registered provider |
//! | `property` | every listed property is set (and equals its value, if given) |
//! | `no_property` | no listed property is set (or it differs from its value) |
//! | `profile` | any listed profile is active |

use weave_domain::constants::{
    EVALUATOR_MISSING, EVALUATOR_NO_PROPERTY, EVALUATOR_PRESENT, EVALUATOR_PROFILE,
    EVALUATOR_PROPERTY,
};
use weave_domain::ports::ConditionContext;
use weave_domain::value_objects::{PropertyCheck, Requirement};

use crate::registry::{CONDITION_EVALUATORS, ConditionEvaluatorEntry};

fn property_matches(check: &PropertyCheck, context: &dyn ConditionContext) -> bool {
    match (context.environment().property(&check.name), &check.value) {
        (Some(actual), Some(expected)) => actual == *expected,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Every listed type is registered
pub fn present(requirement: &Requirement, context: &dyn ConditionContext) -> bool {
    requirement.types.iter().all(|key| context.contains(key))
}

/// No listed type is registered
pub fn missing(requirement: &Requirement, context: &dyn ConditionContext) -> bool {
    !requirement.types.iter().any(|key| context.contains(key))
}

/// Every listed property matches
pub fn property(requirement: &Requirement, context: &dyn ConditionContext) -> bool {
    requirement
        .properties
        .iter()
        .all(|check| property_matches(check, context))
}

/// No listed property matches
pub fn no_property(requirement: &Requirement, context: &dyn ConditionContext) -> bool {
    !requirement
        .properties
        .iter()
        .any(|check| property_matches(check, context))
}

/// Any listed profile is active
pub fn profile(requirement: &Requirement, context: &dyn ConditionContext) -> bool {
    let environment = context.environment();
    requirement
        .profiles
        .iter()
        .any(|name| environment.is_profile_active(name))
}

#[linkme::distributed_slice(CONDITION_EVALUATORS)]
static PRESENT_EVALUATOR: ConditionEvaluatorEntry = ConditionEvaluatorEntry {
    name: EVALUATOR_PRESENT,
    description: "Every listed type has a registered provider",
    evaluate: present,
};

#[linkme::distributed_slice(CONDITION_EVALUATORS)]
static MISSING_EVALUATOR: ConditionEvaluatorEntry = ConditionEvaluatorEntry {
    name: EVALUATOR_MISSING,
    description: "No listed type has a registered provider",
    evaluate: missing,
};

#[linkme::distributed_slice(CONDITION_EVALUATORS)]
static PROPERTY_EVALUATOR: ConditionEvaluatorEntry = ConditionEvaluatorEntry {
    name: EVALUATOR_PROPERTY,
    description: "Every listed property is set and matches its expected value",
    evaluate: property,
};

#[linkme::distributed_slice(CONDITION_EVALUATORS)]
static NO_PROPERTY_EVALUATOR: ConditionEvaluatorEntry = ConditionEvaluatorEntry {
    name: EVALUATOR_NO_PROPERTY,
    description: "No listed property is set with its expected value",
    evaluate: no_property,
};

#[linkme::distributed_slice(CONDITION_EVALUATORS)]
static PROFILE_EVALUATOR: ConditionEvaluatorEntry = ConditionEvaluatorEntry {
    name: EVALUATOR_PROFILE,
    description: "Any listed profile is active",
    evaluate: profile,
};
