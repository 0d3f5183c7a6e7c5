//! Container facade
//!
//! The object application code talks to. A container moves through two
//! phases:
//!
//! ```text
//! build() ──► announcing ──load()──► loaded
//!              announce() ok          get()/try_get()/get_all() ok
//!              get() -> NotLoaded     announce()/load() -> AlreadyLoaded
//! ```
//!
//! Loading runs the conditional rounds, then splits the registered providers
//! into a singleton scope and a prototype scope joined by a composite scope.
//! The composite hands candidates from both halves to one conflict policy, so
//! the split never changes which provider answers a lookup.

pub mod builder;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::info;
use weave_application::{
    AspectRegistry, ChainLink, CompositeScope, LoadReport, PrototypeScope, Registries,
    ResolutionEngine, RootMethod, Scope, SingletonScope,
};
use weave_domain::error::{Error, Result};
use weave_domain::ports::{
    ConflictResolver, Instance, Provider, Resolver, ResolverExt, downcast,
};
use weave_domain::value_objects::TypeKey;

pub use builder::ContainerBuilder;

use crate::config::ContainerConfig;
use crate::constants::CONTAINER_SCOPE_NAME;
use crate::environment::PropertyEnvironment;

struct Loaded {
    scope: CompositeScope,
    registries: Registries,
    report: LoadReport,
}

/// Dependency-injection container
pub struct Container {
    config: ContainerConfig,
    environment: Arc<PropertyEnvironment>,
    engine: Option<ResolutionEngine>,
    loaded: Option<Loaded>,
    aspects: AspectRegistry,
}

impl Container {
    /// Start building a container
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn new(
        config: ContainerConfig,
        environment: Arc<PropertyEnvironment>,
        engine: ResolutionEngine,
        aspects: AspectRegistry,
    ) -> Self {
        Self {
            config,
            environment,
            engine: Some(engine),
            loaded: None,
            aspects,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Register a provider before loading
    pub fn announce(&mut self, provider: Arc<dyn Provider>) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(Error::AlreadyLoaded)?;
        engine.announce(provider);
        Ok(())
    }

    /// Run conditional loading and start the scopes.
    ///
    /// A container loads once; a second call fails with `AlreadyLoaded`.
    pub fn load(&mut self) -> Result<LoadReport> {
        let mut engine = self.engine.take().ok_or(Error::AlreadyLoaded)?;
        let report = engine.load();
        let registries = engine.into_registries();

        let policy = self.config.resolution.default_policy;
        let singletons: Arc<dyn Scope> = Arc::new(
            SingletonScope::new(registries.filter(|provider| provider.is_singleton())?)
                .with_policy(policy),
        );
        let prototypes: Arc<dyn Scope> = Arc::new(
            PrototypeScope::new(registries.filter(|provider| !provider.is_singleton())?)
                .with_policy(policy),
        );
        let scope = CompositeScope::new(vec![singletons, prototypes])
            .named(CONTAINER_SCOPE_NAME)
            .with_policy(policy);
        scope.start()?;

        info!(
            providers = registries.provider_count(),
            types = registries.registered_types().len(),
            policy = %policy,
            "Container loaded"
        );
        self.loaded = Some(Loaded {
            scope,
            registries,
            report: report.clone(),
        });
        Ok(report)
    }

    /// Whether [`load`](Self::load) has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(Error::NotLoaded)
    }

    /// The root scope, for passing the container where a `Resolver` is expected
    pub fn scope(&self) -> Result<&CompositeScope> {
        Ok(&self.loaded()?.scope)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Instance for `key` using the configured default policy
    pub fn get(&self, key: &TypeKey) -> Result<Instance> {
        self.loaded()?.scope.resolve(key)
    }

    /// Like [`get`](Self::get), but `None` when nothing provides `key`
    pub fn try_get(&self, key: &TypeKey) -> Result<Option<Instance>> {
        self.loaded()?.scope.try_resolve(key)
    }

    /// Every instance for `key`, ordered by provider order then registration
    pub fn get_all(&self, key: &TypeKey) -> Result<Vec<Instance>> {
        self.loaded()?.scope.resolve_all(key)
    }

    /// Instance for `key`, choosing among candidates with `policy`
    pub fn get_with(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Instance> {
        self.loaded()?.scope.resolve_with(key, policy)
    }

    /// Whether any provider is registered for `key` so far
    pub fn contains(&self, key: &TypeKey) -> bool {
        match (&self.loaded, &self.engine) {
            (Some(loaded), _) => loaded.registries.contains(key),
            (None, Some(engine)) => engine.registries().contains(key),
            (None, None) => false,
        }
    }

    /// Typed instance of `T`
    pub fn get_typed<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        downcast(&key, self.get(&key)?)
    }

    /// Typed instance of `T`, `None` when nothing provides it
    pub fn try_get_typed<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>> {
        self.loaded()?.scope.try_get::<T>()
    }

    /// Every typed instance of `T`
    pub fn get_all_typed<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>> {
        self.loaded()?.scope.get_all::<T>()
    }

    /// Trait object registered as `dyn T`
    pub fn get_dyn<T: ?Sized + 'static>(&self) -> Result<Arc<T>>
    where
        Arc<T>: Send + Sync,
    {
        self.loaded()?.scope.get_dyn::<T>()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Properties and profiles visible to conditions
    pub fn environment(&self) -> &PropertyEnvironment {
        &self.environment
    }

    /// Configuration the container was built with
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Summary of the load, once loaded
    pub fn report(&self) -> Option<&LoadReport> {
        self.loaded.as_ref().map(|loaded| &loaded.report)
    }

    /// Names of providers dropped because their condition never held
    pub fn dropped(&self) -> &[String] {
        match self.report() {
            Some(report) => &report.dropped,
            None => &[],
        }
    }

    /// Number of registered providers
    pub fn size(&self) -> usize {
        match (&self.loaded, &self.engine) {
            (Some(loaded), _) => loaded.registries.provider_count(),
            (None, Some(engine)) => engine.registries().provider_count(),
            (None, None) => 0,
        }
    }

    /// Every key with at least one provider, sorted
    pub fn registered_types(&self) -> Vec<TypeKey> {
        match (&self.loaded, &self.engine) {
            (Some(loaded), _) => loaded.registries.registered_types(),
            (None, Some(engine)) => engine.registries().registered_types(),
            (None, None) => Vec::new(),
        }
    }

    // ========================================================================
    // Aspects
    // ========================================================================

    /// Aspect handlers known to this container
    pub fn aspects(&self) -> &AspectRegistry {
        &self.aspects
    }

    /// Wrap `method` with every handler whose tag it carries
    pub fn weave(&self, method: RootMethod) -> ChainLink {
        self.aspects.weave(method)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("loaded", &self.is_loaded())
            .field("size", &self.size())
            .field("aspects", &self.aspects.len())
            .finish_non_exhaustive()
    }
}
