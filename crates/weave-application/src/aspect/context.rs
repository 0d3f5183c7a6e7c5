//! Per-invocation execution context

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use weave_domain::error::{Error, Result};
use weave_domain::value_objects::TypeKey;

use super::chain::{ChainLink, Link, RootMethod};

/// Type-erased invocation result
pub type Value = Box<dyn Any + Send>;

type Argument = Box<dyn Any + Send + Sync>;

/// Arguments and position of one invocation walking a chain
pub struct ExecutionContext {
    chain: ChainLink,
    cursor: Option<Arc<Link>>,
    arguments: HashMap<String, Argument>,
}

impl ExecutionContext {
    /// Context positioned before the chain head
    pub fn new(chain: ChainLink) -> Self {
        Self {
            chain,
            cursor: None,
            arguments: HashMap::new(),
        }
    }

    /// The method being intercepted
    pub fn method(&self) -> &RootMethod {
        self.chain.root_method()
    }

    /// Set or replace an argument
    pub fn set_argument<T, S>(&mut self, name: S, value: T)
    where
        T: Any + Send + Sync,
        S: Into<String>,
    {
        self.arguments.insert(name.into(), Box::new(value));
    }

    /// Argument value, `None` when absent or of another type
    pub fn get_argument<T: Any>(&self, name: &str) -> Option<&T> {
        self.arguments
            .get(name)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Argument value, failing when absent or of another type
    pub fn require_argument<T: Any>(&self, name: &str) -> Result<&T> {
        self.arguments
            .get(name)
            .ok_or_else(|| Error::missing_argument(name))?
            .downcast_ref::<T>()
            .ok_or_else(|| Error::argument_type(name, type_name::<T>()))
    }

    /// Whether an argument is set
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Names of the arguments currently set
    pub fn argument_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.arguments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the chain from its head.
    ///
    /// The argument map is cleared afterwards whatever the outcome, so the
    /// context can be filled again for the next call.
    pub fn run(&mut self) -> Result<Value> {
        self.cursor = Some(Arc::clone(&self.chain.head));
        let result = self.proceed();
        self.cursor = None;
        self.arguments.clear();
        result
    }

    /// [`ExecutionContext::run`] with the result downcast to `T`
    pub fn run_as<T: Any>(&mut self) -> Result<T> {
        let value = self.run()?;
        value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            Error::type_mismatch(
                TypeKey::named(self.method().name().to_string()),
                type_name::<T>(),
            )
        })
    }

    /// Advance one link toward the root and return its result.
    ///
    /// A handler may call this several times; each call re-runs the rest of
    /// the chain. Calling it from the root body, or outside [`run`], fails
    /// with [`Error::IllegalChainState`].
    ///
    /// [`run`]: ExecutionContext::run
    pub fn proceed(&mut self) -> Result<Value> {
        let link = self.cursor.take().ok_or_else(|| {
            Error::illegal_chain_state(format!(
                "proceed() called past the root of '{}'",
                self.method().name()
            ))
        })?;

        let result = match link.as_ref() {
            Link::Root(method) => method.execute_raw(self),
            Link::Aspect { handler, next } => {
                self.cursor = Some(Arc::clone(next));
                handler.invoke(self)
            }
        };
        self.cursor = Some(link);
        result
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("method", &self.method().name())
            .field("arguments", &self.argument_names())
            .field("running", &self.cursor.is_some())
            .finish()
    }
}
