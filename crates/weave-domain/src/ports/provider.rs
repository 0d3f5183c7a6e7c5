//! Provider Ports
//!
//! A provider is a factory for one typed instance plus the metadata the
//! runtime needs to decide whether and when to use it. Providers are written
//! by hand or emitted by a code generator; the runtime never mutates them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::constants::DEFAULT_PROVIDER_ORDER;
use crate::error::Result;
use crate::ports::resolver::Resolver;
use crate::value_objects::{Condition, TypeKey};

/// Type-erased instance handed out by the runtime.
///
/// Instances for unsized keys (`dyn Trait`) are stored as `Arc<dyn Trait>`
/// inside the erased `Arc`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory for a typed instance
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use weave_domain::{Instance, Provider, Resolver, Result, TypeKey};
///
/// struct Greeting;
///
/// impl Provider for Greeting {
///     fn type_key(&self) -> TypeKey {
///         TypeKey::of::<String>()
///     }
///
///     fn get(&self, _resolver: &dyn Resolver, _requested: &TypeKey) -> Result<Instance> {
///         Ok(Arc::new("hello".to_string()))
///     }
/// }
/// ```
pub trait Provider: Send + Sync {
    /// The type this provider declares
    fn type_key(&self) -> TypeKey;

    /// Further keys the same instance is registered under
    fn additional_types(&self) -> Vec<TypeKey> {
        Vec::new()
    }

    /// Construct once and cache (`true`) or construct per request (`false`)
    fn is_singleton(&self) -> bool {
        true
    }

    /// Lower orders win ties and sort first in "get all" results
    fn order(&self) -> i32 {
        DEFAULT_PROVIDER_ORDER
    }

    /// Eligibility condition; `None` means always eligible
    fn condition(&self) -> Option<Condition> {
        None
    }

    /// Diagnostic name used in logs and conflict reports
    fn name(&self) -> String {
        self.type_key().to_string()
    }

    /// Construct the instance.
    ///
    /// `resolver` supplies dependencies; `requested` is the key the caller
    /// asked for, which may be an additional type or a generic specialization.
    fn get(&self, resolver: &dyn Resolver, requested: &TypeKey) -> Result<Instance>;

    /// Present a (possibly cached) instance as `requested`.
    ///
    /// Singleton scopes cache the instance built by [`Provider::get`] once
    /// per provider and call this for every lookup, so one object can be
    /// served under several keys.
    fn adapt(&self, instance: &Instance, _requested: &TypeKey) -> Result<Instance> {
        Ok(Arc::clone(instance))
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("type_key", &self.type_key())
            .field("order", &self.order())
            .field("singleton", &self.is_singleton())
            .finish()
    }
}

/// A supply of providers, iterated once per load cycle
pub trait ProviderSource: Send + Sync {
    /// Source name for diagnostics
    fn name(&self) -> &str;

    /// Every provider this source contributes, in a stable order
    fn providers(&self) -> Vec<Arc<dyn Provider>>;
}
