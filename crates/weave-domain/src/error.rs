//! Error handling types

use thiserror::Error;

use crate::value_objects::TypeKey;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Weave runtime
#[derive(Error, Debug)]
pub enum Error {
    /// The same provider was registered twice under the same key
    #[error("Duplicate provider {provider} for {key}")]
    DuplicateProvider {
        /// Registration key
        key: TypeKey,
        /// Diagnostic name of the provider
        provider: String,
    },

    /// No eligible provider is registered for the requested key
    #[error("No provider registered for {key}")]
    NoProvider {
        /// Requested key
        key: TypeKey,
    },

    /// No scope was able to supply the requested key
    #[error("Missing bean {key} in scope {scope}")]
    MissingBean {
        /// Requested key
        key: TypeKey,
        /// Name of the scope that was asked
        scope: String,
    },

    /// A conflict resolver could not reduce the candidates to one
    #[error(
        "Unable to resolve {key} with resolver {resolver}: {matched} of {total} candidates matched [{}]",
        .candidates.join(", ")
    )]
    Conflict {
        /// Requested key
        key: TypeKey,
        /// Name of the resolver that gave up
        resolver: String,
        /// Candidates left after the resolver's filter
        matched: usize,
        /// Candidates handed to the resolver
        total: usize,
        /// Diagnostic form of every candidate, in input order
        candidates: Vec<String>,
    },

    /// `proceed()` was called with no link left to run
    #[error("Illegal chain state: {message}")]
    IllegalChainState {
        /// Description of the broken invariant
        message: String,
    },

    /// A scope was queried before `start()`
    #[error("Scope {scope} has not been started")]
    ScopeNotStarted {
        /// Scope name
        scope: String,
    },

    /// `start()` was called twice
    #[error("Scope {scope} has already been started")]
    ScopeAlreadyStarted {
        /// Scope name
        scope: String,
    },

    /// Construction of `key` requires `key` itself
    #[error("Circular dependency detected while constructing {key}")]
    CircularDependency {
        /// Key whose construction re-entered itself
        key: TypeKey,
    },

    /// An instance could not be downcast to the requested Rust type
    #[error("Instance for {key} is not a {expected}")]
    TypeMismatch {
        /// Requested key
        key: TypeKey,
        /// Rust type name the caller asked for
        expected: &'static str,
    },

    /// `require_argument` found no argument under `name`
    #[error("Missing argument: {name}")]
    MissingArgument {
        /// Argument name
        name: String,
    },

    /// An argument exists but holds another type
    #[error("Argument {name} is not a {expected}")]
    ArgumentType {
        /// Argument name
        name: String,
        /// Rust type name the caller asked for
        expected: &'static str,
    },

    /// A condition names an evaluator nobody registered
    #[error("Unknown condition evaluator: {name}")]
    UnknownEvaluator {
        /// Evaluator name
        name: String,
    },

    /// The container was already loaded
    #[error("Container has already been loaded")]
    AlreadyLoaded,

    /// The container has not been loaded yet
    #[error("Container has not been loaded")]
    NotLoaded,

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error raised by an aspect handler
    #[error("Aspect {handler} failed: {message}")]
    Aspect {
        /// Handler name
        handler: String,
        /// Description of the failure
        message: String,
    },

    /// Internal runtime error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Resolution error creation methods
impl Error {
    /// Create a duplicate provider error
    pub fn duplicate_provider<S: Into<String>>(key: TypeKey, provider: S) -> Self {
        Self::DuplicateProvider {
            key,
            provider: provider.into(),
        }
    }

    /// Create a no provider error
    pub fn no_provider(key: TypeKey) -> Self {
        Self::NoProvider { key }
    }

    /// Create a missing bean error
    pub fn missing_bean<S: Into<String>>(key: TypeKey, scope: S) -> Self {
        Self::MissingBean {
            key,
            scope: scope.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(
        key: TypeKey,
        resolver: S,
        matched: usize,
        candidates: Vec<String>,
    ) -> Self {
        Self::Conflict {
            key,
            resolver: resolver.into(),
            matched,
            total: candidates.len(),
            candidates,
        }
    }

    /// Create a circular dependency error
    pub fn circular_dependency(key: TypeKey) -> Self {
        Self::CircularDependency { key }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(key: TypeKey, expected: &'static str) -> Self {
        Self::TypeMismatch { key, expected }
    }
}

// Scope and chain error creation methods
impl Error {
    /// Create a scope not started error
    pub fn scope_not_started<S: Into<String>>(scope: S) -> Self {
        Self::ScopeNotStarted {
            scope: scope.into(),
        }
    }

    /// Create a scope already started error
    pub fn scope_already_started<S: Into<String>>(scope: S) -> Self {
        Self::ScopeAlreadyStarted {
            scope: scope.into(),
        }
    }

    /// Create an illegal chain state error
    pub fn illegal_chain_state<S: Into<String>>(message: S) -> Self {
        Self::IllegalChainState {
            message: message.into(),
        }
    }

    /// Create a missing argument error
    pub fn missing_argument<S: Into<String>>(name: S) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    /// Create an argument type error
    pub fn argument_type<S: Into<String>>(name: S, expected: &'static str) -> Self {
        Self::ArgumentType {
            name: name.into(),
            expected,
        }
    }

    /// Create an aspect error
    pub fn aspect<H: Into<String>, M: Into<String>>(handler: H, message: M) -> Self {
        Self::Aspect {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

// Configuration and internal error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unknown evaluator error
    pub fn unknown_evaluator<S: Into<String>>(name: S) -> Self {
        Self::UnknownEvaluator { name: name.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// True for "nothing can supply this key" errors.
    ///
    /// `try_get` style lookups turn exactly these into an empty result;
    /// conflicts and construction failures still surface.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoProvider { .. } | Self::MissingBean { .. })
    }
}
