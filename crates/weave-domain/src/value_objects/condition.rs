//! Provider Eligibility Conditions
//!
//! A [`Condition`] is declarative: each leaf [`Requirement`] names an
//! evaluator and carries the metadata that evaluator inspects (type keys,
//! property checks, profiles). Leaves combine into `all`/`any`/`not` trees.
//! Evaluation is delegated to whoever walks the tree, so the same condition
//! can be re-checked every resolution round against a growing registry.
//!
//! ```rust
//! use weave_domain::value_objects::{Condition, TypeKey};
//!
//! let condition = Condition::present([TypeKey::of::<String>()])
//!     .and(Condition::property("cache.enabled", Some("true")));
//!
//! assert_eq!(condition.requirements().count(), 2);
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::constants::{
    EVALUATOR_MISSING, EVALUATOR_NO_PROPERTY, EVALUATOR_PRESENT, EVALUATOR_PROFILE,
    EVALUATOR_PROPERTY,
};
use crate::value_objects::TypeKey;

/// A property to look up, optionally with the value it must hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCheck {
    /// Property name
    pub name: String,
    /// Expected value; `None` only checks existence
    pub value: Option<String>,
}

impl PropertyCheck {
    /// Create a property check
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: Option<V>) -> Self {
        Self {
            name: name.into(),
            value: value.map(Into::into),
        }
    }
}

/// Leaf of a condition tree: evaluator name plus static metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Evaluator identifier, looked up in the evaluator table
    pub evaluator: Cow<'static, str>,
    /// Types the evaluator inspects
    pub types: Vec<TypeKey>,
    /// Properties the evaluator inspects
    pub properties: Vec<PropertyCheck>,
    /// Profiles the evaluator inspects
    pub profiles: Vec<String>,
}

impl Requirement {
    /// Requirement with no metadata for the named evaluator
    pub fn new<S: Into<Cow<'static, str>>>(evaluator: S) -> Self {
        Self {
            evaluator: evaluator.into(),
            types: Vec::new(),
            properties: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Add inspected types
    pub fn with_types<I: IntoIterator<Item = TypeKey>>(mut self, types: I) -> Self {
        self.types.extend(types);
        self
    }

    /// Add an inspected property
    pub fn with_property(mut self, check: PropertyCheck) -> Self {
        self.properties.push(check);
        self
    }

    /// Add inspected profiles
    pub fn with_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles.extend(profiles.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.evaluator)?;
        let mut parts: Vec<String> = self.types.iter().map(ToString::to_string).collect();
        parts.extend(self.properties.iter().map(|check| match &check.value {
            Some(value) => format!("{}={}", check.name, value),
            None => check.name.clone(),
        }));
        parts.extend(self.profiles.iter().cloned());
        write!(f, "{})", parts.join(", "))
    }
}

/// Eligibility predicate tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A single evaluator check
    Require(Requirement),
    /// Every child must hold
    All(Vec<Condition>),
    /// At least one child must hold
    Any(Vec<Condition>),
    /// The child must not hold
    Not(Box<Condition>),
}

impl Condition {
    /// Leaf for an arbitrary evaluator
    pub fn require(requirement: Requirement) -> Self {
        Self::Require(requirement)
    }

    /// Every listed type has a registered provider
    pub fn present<I: IntoIterator<Item = TypeKey>>(types: I) -> Self {
        Self::Require(Requirement::new(EVALUATOR_PRESENT).with_types(types))
    }

    /// None of the listed types has a registered provider
    pub fn missing<I: IntoIterator<Item = TypeKey>>(types: I) -> Self {
        Self::Require(Requirement::new(EVALUATOR_MISSING).with_types(types))
    }

    /// The property exists (and equals `value` when given)
    pub fn property<N: Into<String>>(name: N, value: Option<&str>) -> Self {
        Self::Require(
            Requirement::new(EVALUATOR_PROPERTY).with_property(PropertyCheck::new(name, value)),
        )
    }

    /// The property is absent (or differs from `value` when given)
    pub fn no_property<N: Into<String>>(name: N, value: Option<&str>) -> Self {
        Self::Require(
            Requirement::new(EVALUATOR_NO_PROPERTY).with_property(PropertyCheck::new(name, value)),
        )
    }

    /// Any of the listed profiles is active
    pub fn profile<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Require(Requirement::new(EVALUATOR_PROFILE).with_profiles(profiles))
    }

    /// Conjunction, flattening nested `All` nodes
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut children) => {
                children.push(other);
                Self::All(children)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Disjunction, flattening nested `Any` nodes
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut children) => {
                children.push(other);
                Self::Any(children)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    /// Negation
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate the tree, delegating leaves to `leaf`.
    ///
    /// `All` and `Any` short-circuit in declaration order. An empty `All`
    /// holds, an empty `Any` does not.
    pub fn evaluate<F>(&self, leaf: &mut F) -> bool
    where
        F: FnMut(&Requirement) -> bool,
    {
        match self {
            Self::Require(requirement) => leaf(requirement),
            Self::All(children) => children.iter().all(|child| child.evaluate(leaf)),
            Self::Any(children) => children.iter().any(|child| child.evaluate(leaf)),
            Self::Not(child) => !child.evaluate(leaf),
        }
    }

    /// Every leaf, depth first
    pub fn requirements(&self) -> Box<dyn Iterator<Item = &Requirement> + '_> {
        match self {
            Self::Require(requirement) => Box::new(std::iter::once(requirement)),
            Self::All(children) | Self::Any(children) => {
                Box::new(children.iter().flat_map(Condition::requirements))
            }
            Self::Not(child) => child.requirements(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Require(requirement) => write!(f, "{requirement}"),
            Self::All(children) | Self::Any(children) => {
                let joiner = if matches!(self, Self::All(_)) { " AND " } else { " OR " };
                let parts: Vec<String> = children.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(joiner))
            }
            Self::Not(child) => write!(f, "NOT {child}"),
        }
    }
}
