//! Closure-backed Providers
//!
//! [`FnProvider`] turns a factory closure into a [`Provider`] so that
//! applications can register typed services without writing a provider
//! struct per type.
//!
//! ```
//! use std::sync::Arc;
//! use weave_application::FnProvider;
//! use weave_domain::{Condition, TypeKey};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let provider = FnProvider::singleton(|_| Ok(English))
//!     .with_order(10)
//!     .with_condition(Condition::profile(["en"]))
//!     .also_provides::<dyn Greeter>(|english| english)
//!     .into_provider();
//!
//! assert_eq!(provider.additional_types(), vec![TypeKey::of::<dyn Greeter>()]);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use weave_domain::constants::DEFAULT_PROVIDER_ORDER;
use weave_domain::error::Result;
use weave_domain::ports::{Instance, Provider, Resolver, downcast};
use weave_domain::value_objects::{Condition, TypeKey};

type Factory<T> = dyn Fn(&dyn Resolver) -> Result<T> + Send + Sync;
type Adapter = dyn Fn(Instance) -> Result<Instance> + Send + Sync;

/// Provider built from a factory closure
pub struct FnProvider<T> {
    key: TypeKey,
    name: Option<String>,
    singleton: bool,
    order: i32,
    condition: Option<Condition>,
    factory: Arc<Factory<T>>,
    adapters: Vec<(TypeKey, Arc<Adapter>)>,
}

impl<T: Any + Send + Sync> FnProvider<T> {
    fn with_scope<F>(factory: F, singleton: bool) -> Self
    where
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            key: TypeKey::of::<T>(),
            name: None,
            singleton,
            order: DEFAULT_PROVIDER_ORDER,
            condition: None,
            factory: Arc::new(factory),
            adapters: Vec::new(),
        }
    }

    /// Constructed once, cached by the singleton scope
    pub fn singleton<F>(factory: F) -> Self
    where
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_scope(factory, true)
    }

    /// Constructed on every lookup
    pub fn prototype<F>(factory: F) -> Self
    where
        F: Fn(&dyn Resolver) -> Result<T> + Send + Sync + 'static,
    {
        Self::with_scope(factory, false)
    }

    /// Declare a key other than `T`'s own, e.g. a generic specialization
    pub fn with_key(mut self, key: TypeKey) -> Self {
        self.key = key;
        self
    }

    /// Set the order (lower wins ties)
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Gate the provider on a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Diagnostic name
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Also serve the instance as `U`, typically a trait object.
    ///
    /// `cast` is usually the identity closure `|value| value`, which lets
    /// the compiler apply the unsizing coercion.
    pub fn also_provides<U>(mut self, cast: fn(Arc<T>) -> Arc<U>) -> Self
    where
        U: ?Sized + 'static,
        Arc<U>: Send + Sync,
    {
        let key = TypeKey::of::<U>();
        let own = self.key.clone();
        let adapter = move |instance: Instance| -> Result<Instance> {
            let typed = downcast::<T>(&own, instance)?;
            let adapted: Instance = Arc::new(cast(typed));
            Ok(adapted)
        };
        self.adapters.push((key, Arc::new(adapter)));
        self
    }

    /// Also serve the unchanged instance under `key`
    pub fn also_provides_key(mut self, key: TypeKey) -> Self {
        let adapter: Arc<Adapter> =
            Arc::new(|instance: Instance| -> Result<Instance> { Ok(instance) });
        self.adapters.push((key, adapter));
        self
    }

    /// Erase into a shareable provider
    pub fn into_provider(self) -> Arc<dyn Provider> {
        Arc::new(self)
    }
}

impl<T: Any + Send + Sync> Provider for FnProvider<T> {
    fn type_key(&self) -> TypeKey {
        self.key.clone()
    }

    fn additional_types(&self) -> Vec<TypeKey> {
        self.adapters.iter().map(|(key, _)| key.clone()).collect()
    }

    fn is_singleton(&self) -> bool {
        self.singleton
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn condition(&self) -> Option<Condition> {
        self.condition.clone()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.key.to_string())
    }

    fn get(&self, resolver: &dyn Resolver, _requested: &TypeKey) -> Result<Instance> {
        let value: Instance = Arc::new((self.factory)(resolver)?);
        Ok(value)
    }

    fn adapt(&self, instance: &Instance, requested: &TypeKey) -> Result<Instance> {
        match self.adapters.iter().find(|(key, _)| key == requested) {
            Some((_, adapter)) => adapter(Arc::clone(instance)),
            None => Ok(Arc::clone(instance)),
        }
    }
}

impl<T> fmt::Debug for FnProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("singleton", &self.singleton)
            .field("order", &self.order)
            .finish()
    }
}
