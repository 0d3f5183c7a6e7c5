//! Aspect handlers and the tag → handler table

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use weave_domain::error::Result;

use super::chain::{ChainLink, RootMethod};
use super::context::{ExecutionContext, Value};
use crate::registry::ASPECT_HANDLERS;

/// Cross-cutting behaviour wrapped around a root method
pub trait AspectHandler: Send + Sync {
    /// Handler name, reported in chain diagnostics
    fn name(&self) -> &str;

    /// Lower orders run further out
    fn order(&self) -> i32 {
        0
    }

    /// Handle one invocation.
    ///
    /// Call [`ExecutionContext::proceed`] to continue toward the root, or
    /// return a value to short-circuit.
    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value>;
}

struct Registration {
    tag: String,
    handler: Arc<dyn AspectHandler>,
    sequence: usize,
}

/// Handlers keyed by the metadata tag they apply to
#[derive(Default)]
pub struct AspectRegistry {
    registrations: Vec<Registration>,
}

impl AspectRegistry {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded from the [`ASPECT_HANDLERS`] slice
    pub fn from_registry() -> Self {
        let mut registry = Self::new();
        for entry in ASPECT_HANDLERS {
            registry.register(entry.tag, (entry.factory)());
        }
        registry
    }

    /// Add a handler for `tag`
    pub fn register<S: Into<String>>(&mut self, tag: S, handler: Arc<dyn AspectHandler>) {
        let sequence = self.registrations.len();
        self.registrations.push(Registration {
            tag: tag.into(),
            handler,
            sequence,
        });
    }

    /// Distinct tags with at least one handler, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .registrations
            .iter()
            .map(|registration| registration.tag.as_str())
            .collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Handlers applying to `method`, outermost first.
    ///
    /// A handler registered under several of the method's tags appears once.
    pub fn matching(&self, method: &RootMethod) -> Vec<Arc<dyn AspectHandler>> {
        let mut matched: Vec<&Registration> = Vec::new();
        for registration in &self.registrations {
            if !method.has_tag(&registration.tag) {
                continue;
            }
            let seen = matched
                .iter()
                .any(|existing| Arc::ptr_eq(&existing.handler, &registration.handler));
            if !seen {
                matched.push(registration);
            }
        }
        matched.sort_by_key(|registration| (registration.handler.order(), registration.sequence));
        matched
            .into_iter()
            .map(|registration| Arc::clone(&registration.handler))
            .collect()
    }

    /// Build the chain for `method` from the matching handlers
    pub fn weave(&self, method: RootMethod) -> ChainLink {
        let handlers = self.matching(&method);
        let mut chain = ChainLink::root(method);
        for handler in handlers.into_iter().rev() {
            chain = chain.prepend(handler);
        }
        debug!(
            method = chain.root_method().name(),
            handlers = ?chain.handler_names(),
            "Built interception chain"
        );
        chain
    }
}

impl fmt::Debug for AspectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AspectRegistry")
            .field("tags", &self.tags())
            .field("handlers", &self.registrations.len())
            .finish()
    }
}
