//! Application Layer - Weave
//!
//! The algorithmic core of the runtime: everything between "here is a pile of
//! providers" and "here is your instance".
//!
//! ## Architecture
//!
//! ```text
//! ProviderSource(s) ──► ResolutionEngine ──► Registries ──► Scope(s) ──► Resolver
//!                        (round loop,          (TypeRegistry    (singleton /
//!                         conditions)           per root type)   prototype /
//!                                                                composite)
//!
//! RootMethod ◄── ChainLink::prepend(handler) ◄── AspectRegistry::weave(method)
//!      ▲
//! ExecutionContext::run() walks handlers outside-in, then the root
//! ```
//!
//! ## Modules
//!
//! - [`condition`]: evaluator table and the built-in evaluators
//! - [`resolution`]: conflict policies, type registries, the round-based engine
//! - [`scope`]: singleton, prototype and composite scopes
//! - [`aspect`]: root methods, chain links, execution contexts, handler table
//! - [`registry`]: compile-time registration slices (linkme)

pub mod aspect;
pub mod condition;
pub mod registry;
pub mod resolution;
pub mod scope;

pub use aspect::{AspectHandler, AspectRegistry, ChainLink, ExecutionContext, RootMethod, Value};
pub use condition::{ConditionEvaluator, ConditionEvaluators};
pub use resolution::{
    ConflictPolicy, FnProvider, LoadReport, ManualProviderSource, Registries, ResolutionEngine,
    RoundOutcome, TypeRegistry,
};
pub use scope::{CompositeScope, PrototypeScope, Scope, ScopeState, SingletonScope};
