//! Singleton Scope
//!
//! Builds each provider's instance at most once. Cached instances are read
//! without locking; first construction takes a per-provider lock and
//! re-checks the cache before building.

use std::fmt;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::trace;
use weave_domain::error::{Error, Result};
use weave_domain::ports::{Candidate, ConflictResolver, Instance, Provider, Resolver};
use weave_domain::value_objects::TypeKey;

use super::{ConstructionGuard, Lifecycle, Scope, ScopeState, SharedRegistries};
use crate::resolution::{ConflictPolicy, Registries, provider_identity};

/// Scope caching one instance per provider
pub struct SingletonScope {
    name: String,
    lifecycle: Lifecycle,
    registries: SharedRegistries,
    policy: ConflictPolicy,
    instances: DashMap<usize, Instance>,
    construction_locks: DashMap<usize, Arc<Mutex<()>>>,
}

impl SingletonScope {
    /// Scope over pre-loaded registries
    pub fn new(registries: Registries) -> Self {
        Self {
            name: "singleton".to_string(),
            lifecycle: Lifecycle::default(),
            registries: SharedRegistries::new(registries),
            policy: ConflictPolicy::default(),
            instances: DashMap::new(),
            construction_locks: DashMap::new(),
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

    /// Number of instances built so far
    pub fn cached(&self) -> usize {
        self.instances.len()
    }

    fn cached_instance(&self, identity: usize) -> Option<Instance> {
        self.instances
            .get(&identity)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn construction_lock(&self, identity: usize) -> Arc<Mutex<()>> {
        Arc::clone(
            self.construction_locks
                .entry(identity)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn build_once(&self, candidate: &Candidate, origin: &dyn Resolver) -> Result<Instance> {
        let identity = provider_identity(&candidate.provider);
        if let Some(instance) = self.cached_instance(identity) {
            return Ok(instance);
        }

        let _guard = ConstructionGuard::enter(candidate)?;
        let lock = self.construction_lock(identity);
        let _held = lock
            .lock()
            .map_err(|_| Error::internal("singleton construction lock poisoned"))?;

        if let Some(instance) = self.cached_instance(identity) {
            return Ok(instance);
        }
        trace!(provider = %candidate.provider.name(), scope = %self.name, "Constructing singleton");
        let instance = candidate.provider.get(origin, &candidate.key)?;
        self.instances.insert(identity, Arc::clone(&instance));
        Ok(instance)
    }
}

impl Scope for SingletonScope {
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
        let instance = self.build_once(candidate, origin)?;
        candidate.provider.adapt(&instance, &candidate.key)
    }

    fn size(&self) -> usize {
        self.registries.load().provider_count()
    }
}

impl Resolver for SingletonScope {
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

impl fmt::Debug for SingletonScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonScope")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("providers", &self.size())
            .field("cached", &self.cached())
            .finish()
    }
}
