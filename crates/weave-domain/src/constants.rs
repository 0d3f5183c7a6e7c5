//! Domain constants
//!
//! Names of the built-in condition evaluators and defaults shared between
//! the application and infrastructure layers.

// ============================================================================
// CONDITION EVALUATORS
// ============================================================================

/// Evaluator: every listed type has at least one registered provider
pub const EVALUATOR_PRESENT: &str = "present";

/// Evaluator: none of the listed types has a registered provider
pub const EVALUATOR_MISSING: &str = "missing";

/// Evaluator: every listed property exists (and equals the given value, if any)
pub const EVALUATOR_PROPERTY: &str = "property";

/// Evaluator: no listed property exists (or it differs from the given value)
pub const EVALUATOR_NO_PROPERTY: &str = "no_property";

/// Evaluator: any listed profile is active
pub const EVALUATOR_PROFILE: &str = "profile";

// ============================================================================
// TYPE KEYS
// ============================================================================

/// Descriptor name matching any descriptor at the same generic position
pub const WILDCARD_DESCRIPTOR: &str = "?";

// ============================================================================
// RESOLUTION
// ============================================================================

/// Round count above which the engine warns even without a hard cap
pub const DEFAULT_WARN_ROUNDS: usize = 10;

/// Default provider ordering when none is declared
pub const DEFAULT_PROVIDER_ORDER: i32 = 0;
