//! Resolver Ports
//!
//! [`Resolver`] is what providers and application code call to obtain
//! instances. [`ConflictResolver`] is the strategy consulted when more than
//! one provider answers a lookup.

use std::any::{Any, type_name};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ports::provider::{Instance, Provider};
use crate::value_objects::TypeKey;

/// A provider competing for a lookup
#[derive(Clone)]
pub struct Candidate {
    /// Key the provider was registered under
    pub key: TypeKey,
    /// The provider itself
    pub provider: Arc<dyn Provider>,
    /// Registration sequence, used as the tie-breaker for equal orders
    pub sequence: usize,
}

impl Candidate {
    /// Declared order of the provider
    pub fn order(&self) -> i32 {
        self.provider.order()
    }

    /// True when the provider declares exactly `query` as its type
    pub fn is_direct_match(&self, query: &TypeKey) -> bool {
        self.provider.type_key() == *query
    }

    /// Stable diagnostic form used in conflict reports
    pub fn describe(&self) -> String {
        format!("{}(order={})", self.provider.name(), self.order())
    }
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("key", &self.key)
            .field("provider", &self.provider.name())
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Tie-breaking strategy for lookups with several candidates
pub trait ConflictResolver: Send + Sync {
    /// Strategy name, reported in conflict errors
    fn name(&self) -> &str;

    /// Pick exactly one candidate or fail with a conflict error
    fn select(&self, query: &TypeKey, candidates: &[Candidate]) -> Result<Candidate>;
}

/// Instance lookup exposed to providers and application code
pub trait Resolver: Send + Sync {
    /// Resolve one instance, breaking ties with `policy`
    fn resolve_with(&self, key: &TypeKey, policy: &dyn ConflictResolver) -> Result<Instance>;

    /// Resolve one instance with the resolver's default policy
    fn resolve(&self, key: &TypeKey) -> Result<Instance>;

    /// Every instance for `key`, ordered by provider order
    fn resolve_all(&self, key: &TypeKey) -> Result<Vec<Instance>>;

    /// Whether at least one provider answers `key`
    fn contains(&self, key: &TypeKey) -> bool;

    /// Like [`Resolver::resolve`], with "not found" mapped to `None`
    fn try_resolve(&self, key: &TypeKey) -> Result<Option<Instance>> {
        match self.resolve(key) {
            Ok(instance) => Ok(Some(instance)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Downcast an erased instance to a sized type
pub fn downcast<T: Any + Send + Sync>(key: &TypeKey, instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(key.clone(), type_name::<T>()))
}

/// Downcast an erased instance stored as `Arc<T>` for an unsized `T`
pub fn downcast_dyn<T: ?Sized + 'static>(key: &TypeKey, instance: Instance) -> Result<Arc<T>>
where
    Arc<T>: Send + Sync,
{
    instance
        .downcast::<Arc<T>>()
        .map(|inner| Arc::clone(&*inner))
        .map_err(|_| Error::type_mismatch(key.clone(), type_name::<T>()))
}

/// Typed convenience lookups on any [`Resolver`]
pub trait ResolverExt {
    /// Resolve a sized type by its Rust type key
    fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>>;

    /// Resolve a trait object (`dyn Trait`) by its Rust type key
    fn get_dyn<T: ?Sized + 'static>(&self) -> Result<Arc<T>>
    where
        Arc<T>: Send + Sync;

    /// Resolve a sized type, `None` when nothing provides it
    fn try_get<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>>;

    /// Every instance of a sized type
    fn get_all<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>>;
}

impl<R: Resolver + ?Sized> ResolverExt for R {
    fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        downcast(&key, self.resolve(&key)?)
    }

    fn get_dyn<T: ?Sized + 'static>(&self) -> Result<Arc<T>>
    where
        Arc<T>: Send + Sync,
    {
        let key = TypeKey::of::<T>();
        downcast_dyn(&key, self.resolve(&key)?)
    }

    fn try_get<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>> {
        let key = TypeKey::of::<T>();
        self.try_resolve(&key)?
            .map(|instance| downcast(&key, instance))
            .transpose()
    }

    fn get_all<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>> {
        let key = TypeKey::of::<T>();
        self.resolve_all(&key)?
            .into_iter()
            .map(|instance| downcast(&key, instance))
            .collect()
    }
}
