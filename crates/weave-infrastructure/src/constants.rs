//! Infrastructure layer constants
//!
//! Constants for configuration discovery and logging. Resolution defaults
//! shared with the application layer live in `weave_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "weave.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "weave";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WEAVE";

/// Separator between nested keys in environment variable names
/// (`WEAVE_RESOLUTION__MAX_ROUNDS`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "WEAVE_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fallback file stem for rotated log files
pub const DEFAULT_LOG_FILE_STEM: &str = "weave";

// ============================================================================
// CONTAINER CONSTANTS
// ============================================================================

/// Name of the container's root scope
pub const CONTAINER_SCOPE_NAME: &str = "container";

/// Name of the manual provider source fed by `ContainerBuilder::with_provider`
pub const MANUAL_SOURCE_NAME: &str = "manual";

// ============================================================================
// ASPECT CONSTANTS
// ============================================================================

/// Tag selecting the built-in timing aspect
pub const TIMED_TAG: &str = "timed";
