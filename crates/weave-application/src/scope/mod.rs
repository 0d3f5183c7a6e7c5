//! Scopes
//!
//! A scope decides how many instances of a type exist and for how long.
//!
//! | Scope | Cardinality |
//! |-------|-------------|
//! | [`SingletonScope`] | one instance per provider, built on first lookup |
//! | [`PrototypeScope`] | a fresh instance per lookup |
//! | [`CompositeScope`] | delegates to ordered child scopes |
//!
//! Every scope moves `NotStarted -> Started` exactly once. Providers may be
//! registered only before start; lookups only after.

pub mod composite;
pub mod prototype;
pub mod singleton;

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use weave_domain::error::{Error, Result};
use weave_domain::ports::{Candidate, ConflictResolver, Instance, Provider, Resolver};
use weave_domain::value_objects::TypeKey;

use crate::resolution::{Registries, provider_identity};

pub use composite::CompositeScope;
pub use prototype::PrototypeScope;
pub use singleton::SingletonScope;

/// Lifecycle state of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Accepting registrations, refusing lookups
    NotStarted,
    /// Serving lookups
    Started,
}

/// Lifecycle and lookup policy over a set of providers
pub trait Scope: Resolver {
    /// Scope name, used in errors and logs
    fn name(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> ScopeState;

    /// Activate the scope; a second call fails
    fn start(&self) -> Result<()>;

    /// Add a provider before the scope starts
    fn register(&self, provider: Arc<dyn Provider>) -> Result<()>;

    /// Whether this scope has a provider for `key`
    fn owns(&self, key: &TypeKey) -> bool {
        self.contains(key)
    }

    /// Compatible candidates, ordered
    fn candidates(&self, key: &TypeKey) -> Result<Vec<Candidate>>;

    /// Reduce the candidates for `key` to one
    fn select(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Candidate>;

    /// Produce the instance for a selected candidate.
    ///
    /// `origin` is the resolver handed to the provider for its own
    /// dependencies, normally the outermost scope.
    fn instantiate(&self, candidate: &Candidate, origin: &dyn Resolver) -> Result<Instance>;

    /// Number of registered providers
    fn size(&self) -> usize;

    /// Select and instantiate
    fn instance_for(
        &self,
        key: &TypeKey,
        policy: &dyn ConflictResolver,
        origin: &dyn Resolver,
    ) -> Result<Instance> {
        let candidate = self.select(key, policy)?;
        self.instantiate(&candidate, origin)
    }

    /// Instantiate every candidate, ordered
    fn instances_for(&self, key: &TypeKey, origin: &dyn Resolver) -> Result<Vec<Instance>> {
        self.candidates(key)?
            .iter()
            .map(|candidate| self.instantiate(candidate, origin))
            .collect()
    }
}

/// One-way `NotStarted -> Started` switch
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    started: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> ScopeState {
        if self.started.load(Ordering::Acquire) {
            ScopeState::Started
        } else {
            ScopeState::NotStarted
        }
    }

    pub(crate) fn start(&self, scope: &str) -> Result<()> {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| Error::scope_already_started(scope))
    }

    pub(crate) fn ensure_started(&self, scope: &str) -> Result<()> {
        match self.state() {
            ScopeState::Started => Ok(()),
            ScopeState::NotStarted => Err(Error::scope_not_started(scope)),
        }
    }

    pub(crate) fn ensure_not_started(&self, scope: &str) -> Result<()> {
        match self.state() {
            ScopeState::NotStarted => Ok(()),
            ScopeState::Started => Err(Error::scope_already_started(scope)),
        }
    }
}

/// Registries readable without locking, written under a mutex
pub(crate) struct SharedRegistries {
    current: ArcSwap<Registries>,
    write: Mutex<()>,
}

impl SharedRegistries {
    pub(crate) fn new(registries: Registries) -> Self {
        Self {
            current: ArcSwap::from_pointee(registries),
            write: Mutex::new(()),
        }
    }

    pub(crate) fn load(&self) -> Arc<Registries> {
        self.current.load_full()
    }

    pub(crate) fn register(&self, provider: Arc<dyn Provider>) -> Result<usize> {
        let _write = self
            .write
            .lock()
            .map_err(|_| Error::internal("scope registry lock poisoned"))?;
        let mut next = Registries::clone(&self.current.load());
        let sequence = next.register(provider)?;
        self.current.store(Arc::new(next));
        Ok(sequence)
    }
}

thread_local! {
    static CONSTRUCTING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a provider as under construction on the current thread.
///
/// Entering the same provider twice before the first guard drops means the
/// dependency graph loops back on itself.
pub(crate) struct ConstructionGuard {
    identity: usize,
}

impl ConstructionGuard {
    pub(crate) fn enter(candidate: &Candidate) -> Result<Self> {
        let identity = provider_identity(&candidate.provider);
        CONSTRUCTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&identity) {
                return Err(Error::circular_dependency(candidate.key.clone()));
            }
            stack.push(identity);
            Ok(Self { identity })
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().rposition(|id| *id == self.identity) {
                stack.remove(position);
            }
        });
    }
}
