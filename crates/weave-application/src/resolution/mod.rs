//! Conditional Provider Resolution
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`policy`] | The five named conflict-resolution strategies |
//! | [`type_registry`] | Per-root-type provider tables and their aggregate |
//! | [`engine`] | Round-based fixed-point loading of conditional providers |
//! | [`source`] | Provider sources for hand-built provider lists |
//! | [`fn_provider`] | Closure-backed typed providers |

pub mod engine;
pub mod fn_provider;
pub mod policy;
pub mod source;
pub mod type_registry;

pub use engine::{LoadReport, ResolutionEngine, RoundOutcome};
pub use fn_provider::FnProvider;
pub use policy::ConflictPolicy;
pub use source::ManualProviderSource;
pub use type_registry::{Registries, TypeRegistry, provider_identity};
