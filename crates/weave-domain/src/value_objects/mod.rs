//! Domain Value Objects
//!
//! Immutable value objects compared structurally.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`TypeKey`] | Root type plus ordered generic parameters, used as a map key |
//! | [`TypeDescriptor`] | A single named type, or the `?` wildcard |
//! | [`Condition`] | Eligibility predicate tree attached to a provider |

/// Provider eligibility conditions
pub mod condition;
/// Generic-aware type identifiers
pub mod type_key;

pub use condition::{Condition, PropertyCheck, Requirement};
pub use type_key::{TypeDescriptor, TypeKey};
