//! Compile-time Registration
//!
//! Uses the `linkme` crate so providers, condition evaluators and aspect
//! handlers defined anywhere in the final binary are discovered at runtime
//! without a central list.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Registration Flow                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Contributor:  #[linkme::distributed_slice(PROVIDERS)]       │
//! │                   static ENTRY: ProviderEntry = ...             │
//! │                              ↓                                  │
//! │  2. Slice:        #[linkme::distributed_slice]                  │
//! │                   pub static PROVIDERS: [ProviderEntry] = [..]  │
//! │                              ↓                                  │
//! │  3. Source:       StaticProviderSource → ResolutionEngine       │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Registering a Provider
//!
//! ```ignore
//! use weave_application::registry::{ProviderEntry, PROVIDERS};
//!
//! #[linkme::distributed_slice(PROVIDERS)]
//! static CLOCK: ProviderEntry = ProviderEntry {
//!     name: "system_clock",
//!     description: "Wall clock backed by std::time",
//!     factory: || FnProvider::singleton(|_| Ok(SystemClock)).into_provider(),
//! };
//! ```

pub mod aspects;
pub mod conditions;
pub mod providers;

pub use aspects::{ASPECT_HANDLERS, AspectHandlerEntry, list_aspect_handlers};
pub use conditions::{CONDITION_EVALUATORS, ConditionEvaluatorEntry, list_condition_evaluators};
pub use providers::{PROVIDERS, ProviderEntry, StaticProviderSource, list_providers};
