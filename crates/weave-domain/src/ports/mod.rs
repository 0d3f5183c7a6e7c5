//! Domain Port Interfaces
//!
//! Boundary contracts between the runtime and the code that feeds it.
//!
//! ## Organization
//!
//! - **provider** - factories the runtime consumes (`Provider`, `ProviderSource`)
//! - **resolver** - lookups the runtime exposes (`Resolver`, `ConflictResolver`)
//! - **environment** - external configuration and the state conditions read

/// Environment and condition-evaluation context
pub mod environment;
/// Provider and provider source contracts
pub mod provider;
/// Lookup and conflict-resolution contracts
pub mod resolver;

pub use environment::{ConditionContext, Environment};
pub use provider::{Instance, Provider, ProviderSource};
pub use resolver::{
    Candidate, ConflictResolver, Resolver, ResolverExt, downcast, downcast_dyn,
};
