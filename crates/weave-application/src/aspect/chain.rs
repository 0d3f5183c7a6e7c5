//! Root methods and chain links

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use weave_domain::error::Result;
use weave_domain::value_objects::TypeDescriptor;

use super::context::{ExecutionContext, Value};
use super::handler::AspectHandler;

type MethodBody = dyn Fn(&mut ExecutionContext) -> Result<Value> + Send + Sync;

/// The real method at the end of a chain
pub struct RootMethod {
    name: String,
    parameters: Vec<(String, TypeDescriptor)>,
    tags: Vec<String>,
    body: Arc<MethodBody>,
}

impl RootMethod {
    /// Wrap a method body; the body reads its arguments from the context
    pub fn new<S, F, R>(name: S, body: F) -> Self
    where
        S: Into<String>,
        F: Fn(&mut ExecutionContext) -> Result<R> + Send + Sync + 'static,
        R: Any + Send,
    {
        let erased = move |context: &mut ExecutionContext| -> Result<Value> {
            let value: Value = Box::new(body(context)?);
            Ok(value)
        };
        Self {
            name: name.into(),
            parameters: Vec::new(),
            tags: Vec::new(),
            body: Arc::new(erased),
        }
    }

    /// Declare a parameter
    pub fn with_parameter<T: ?Sized + 'static, S: Into<String>>(mut self, name: S) -> Self {
        self.parameters.push((name.into(), TypeDescriptor::of::<T>()));
        self
    }

    /// Attach a metadata tag
    pub fn with_tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in order
    pub fn parameters(&self) -> &[(String, TypeDescriptor)] {
        &self.parameters
    }

    /// Declared type of a parameter
    pub fn parameter_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.parameters
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, descriptor)| descriptor)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|own| own == tag)
    }

    /// Invoke the body directly, bypassing every handler
    pub fn execute_raw(&self, context: &mut ExecutionContext) -> Result<Value> {
        (self.body)(context)
    }
}

impl fmt::Debug for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootMethod")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("tags", &self.tags)
            .finish()
    }
}

pub(crate) enum Link {
    Root(Arc<RootMethod>),
    Aspect {
        handler: Arc<dyn AspectHandler>,
        next: Arc<Link>,
    },
}

/// Head of an immutable interception chain
#[derive(Clone)]
pub struct ChainLink {
    pub(crate) head: Arc<Link>,
}

impl ChainLink {
    /// Chain consisting of the root method only
    pub fn root(method: RootMethod) -> Self {
        Self {
            head: Arc::new(Link::Root(Arc::new(method))),
        }
    }

    /// New head running `handler` before the current chain
    pub fn prepend(&self, handler: Arc<dyn AspectHandler>) -> ChainLink {
        ChainLink {
            head: Arc::new(Link::Aspect {
                handler,
                next: Arc::clone(&self.head),
            }),
        }
    }

    /// The method at the end of the chain
    pub fn root_method(&self) -> &RootMethod {
        let mut link = self.head.as_ref();
        loop {
            match link {
                Link::Root(method) => return method,
                Link::Aspect { next, .. } => link = next.as_ref(),
            }
        }
    }

    /// Handler names in execution order
    pub fn handler_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut link = self.head.as_ref();
        while let Link::Aspect { handler, next } = link {
            names.push(handler.name().to_string());
            link = next.as_ref();
        }
        names
    }

    /// Number of handlers in front of the root
    pub fn depth(&self) -> usize {
        self.handler_names().len()
    }

    /// Fresh context for one invocation
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.clone())
    }

    /// Run one invocation: `setup` fills the arguments, then the chain runs
    pub fn invoke<F>(&self, setup: F) -> Result<Value>
    where
        F: FnOnce(&mut ExecutionContext),
    {
        let mut context = self.context();
        setup(&mut context);
        context.run()
    }

    /// [`ChainLink::invoke`] with the result downcast to `T`
    pub fn invoke_as<T: Any, F>(&self, setup: F) -> Result<T>
    where
        F: FnOnce(&mut ExecutionContext),
    {
        let mut context = self.context();
        setup(&mut context);
        context.run_as()
    }
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLink")
            .field("method", &self.root_method().name())
            .field("handlers", &self.handler_names())
            .finish()
    }
}
