//! # Weave Domain Layer
//!
//! Core types shared by every layer of the Weave dependency-injection runtime.
//! Nothing in here runs an algorithm: the crate defines the vocabulary the
//! resolution engine, the scopes and the aspect chain speak.
//!
//! ## Contents
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value_objects`] | `TypeKey`, `TypeDescriptor`, `Condition` |
//! | [`ports`] | `Provider`, `ProviderSource`, `Resolver`, `ConflictResolver`, `Environment` |
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`constants`] | Evaluator names and shared defaults |

/// Shared constants (evaluator names, defaults)
pub mod constants;
/// Error taxonomy for resolution, scopes and aspects
pub mod error;
/// Boundary contracts consumed and exposed by the runtime
pub mod ports;
/// Immutable value objects
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{
    Candidate, ConditionContext, ConflictResolver, Environment, Instance, Provider,
    ProviderSource, Resolver, ResolverExt,
};
pub use value_objects::{Condition, PropertyCheck, Requirement, TypeDescriptor, TypeKey};
