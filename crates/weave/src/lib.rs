//! # Weave
//!
//! A dependency-injection runtime with conditional providers, conflict
//! policies, singleton/prototype/composite scopes and aspect chains.
//!
//! ## Example
//!
//! ```
//! use weave::prelude::*;
//!
//! struct Database(&'static str);
//! struct Repository(Arc<Database>);
//!
//! let mut container = Container::builder()
//!     .with_provider(FnProvider::singleton(|_| Ok(Database("sqlite"))).into_provider())
//!     .with_provider(
//!         FnProvider::prototype(|resolver: &dyn Resolver| Ok(Repository(resolver.get()?)))
//!             .with_condition(Condition::present([TypeKey::of::<Database>()]))
//!             .into_provider(),
//!     )
//!     .build();
//!
//! let report = container.load()?;
//! assert_eq!(report.to_string(), "Applied 1 conditional providers in 2 rounds");
//!
//! let repository = container.get_typed::<Repository>()?;
//! assert_eq!(repository.0.0, "sqlite");
//! # Ok::<(), weave::domain::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - `domain` - type keys, conditions, ports and the error taxonomy
//! - `application` - resolution engine, conflict policies, scopes, aspect chains
//! - `infrastructure` - container facade, configuration, logging, built-in aspects

/// Domain layer - value objects, ports and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use weave_domain::*;
}

/// Application layer - the resolution and interception algorithms
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use weave_application::*;
}

/// Infrastructure layer - container, configuration and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use weave_infrastructure::*;
}

pub use weave_domain::{Error, Result};
pub use weave_infrastructure::{Container, ContainerBuilder};

/// Everything a typical application needs in one import
pub mod prelude {
    pub use std::sync::Arc;

    pub use weave_application::{
        AspectHandler, ChainLink, ConflictPolicy, ExecutionContext, FnProvider,
        ManualProviderSource, RootMethod, Value,
    };
    pub use weave_domain::ports::{Environment, Provider, ProviderSource, Resolver, ResolverExt};
    pub use weave_domain::{Condition, Error, Result, TypeDescriptor, TypeKey};
    pub use weave_infrastructure::{ConfigLoader, Container, ContainerConfig, PropertyEnvironment};
}
