//! Prototype Scope

use std::fmt;
use std::sync::Arc;

use weave_domain::error::Result;
use weave_domain::ports::{Candidate, ConflictResolver, Instance, Provider, Resolver};
use weave_domain::value_objects::TypeKey;

use super::{ConstructionGuard, Lifecycle, Scope, ScopeState, SharedRegistries};
use crate::resolution::{ConflictPolicy, Registries};

/// Scope building a fresh instance on every lookup
pub struct PrototypeScope {
    name: String,
    lifecycle: Lifecycle,
    registries: SharedRegistries,
    policy: ConflictPolicy,
}

impl PrototypeScope {
    /// Scope over pre-loaded registries
    pub fn new(registries: Registries) -> Self {
        Self {
            name: "prototype".to_string(),
            lifecycle: Lifecycle::default(),
            registries: SharedRegistries::new(registries),
            policy: ConflictPolicy::default(),
        }
    }

    /// Rename the scope
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Policy used by [`Resolver::resolve`]
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Scope for PrototypeScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ScopeState {
        self.lifecycle.state()
    }

    fn start(&self) -> Result<()> {
        self.lifecycle.start(&self.name)
    }

    fn register(&self, provider: Arc<dyn Provider>) -> Result<()> {
        self.lifecycle.ensure_not_started(&self.name)?;
        self.registries.register(provider).map(|_| ())
    }

    fn candidates(&self, key: &TypeKey) -> Result<Vec<Candidate>> {
        self.lifecycle.ensure_started(&self.name)?;
        Ok(self.registries.load().candidates(key))
    }

    fn select(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Candidate> {
        self.lifecycle.ensure_started(&self.name)?;
        self.registries.load().resolve(key, policy)
    }

    fn instantiate(&self, candidate: &Candidate, origin: &dyn Resolver) -> Result<Instance> {
        let _guard = ConstructionGuard::enter(candidate)?;
        let instance = candidate.provider.get(origin, &candidate.key)?;
        candidate.provider.adapt(&instance, &candidate.key)
    }

    fn size(&self) -> usize {
        self.registries.load().provider_count()
    }
}

impl Resolver for PrototypeScope {
    fn resolve_with(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Instance> {
        self.instance_for(key, policy, self)
    }

    fn resolve(&self, key: &TypeKey) -> Result<Instance> {
        self.resolve_with(key, &self.policy)
    }

    fn resolve_all(&self, key: &TypeKey) -> Result<Vec<Instance>> {
        self.instances_for(key, self)
    }

    fn contains(&self, key: &TypeKey) -> bool {
        self.registries.load().contains(key)
    }
}

impl fmt::Debug for PrototypeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeScope")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("providers", &self.size())
            .finish()
    }
}
