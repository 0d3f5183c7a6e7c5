//! Environment Ports
//!
//! The environment is the external configuration collaborator: properties
//! and active profiles. Conditions read it, together with the registry
//! state, through [`ConditionContext`].

use crate::value_objects::TypeKey;

/// Read-only view of external configuration
pub trait Environment: Send + Sync {
    /// Property value, if set
    fn property(&self, name: &str) -> Option<String>;

    /// Active profiles
    fn profiles(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether a property is set
    fn contains_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Whether `profile` is active
    fn is_profile_active(&self, profile: &str) -> bool {
        self.profiles().iter().any(|active| active == profile)
    }
}

/// What a condition may observe while the engine is loading
pub trait ConditionContext {
    /// Whether a provider is registered for `key` so far
    fn contains(&self, key: &TypeKey) -> bool;

    /// External configuration
    fn environment(&self) -> &dyn Environment;
}
