//! Configuration types
//!
//! Every field has a default so an empty file, or no file at all, yields a
//! usable container.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use weave_application::ConflictPolicy;
use weave_domain::constants::DEFAULT_WARN_ROUNDS;

use crate::constants::DEFAULT_LOG_LEVEL;

/// Root configuration of a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Conditional loading and lookup settings
    pub resolution: ResolutionConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Properties visible to conditions and to the environment accessor
    pub properties: BTreeMap<String, String>,

    /// Active profiles
    pub profiles: Vec<String>,
}

/// Resolution engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Hard cap on conditional rounds; unlimited when absent
    pub max_rounds: Option<usize>,

    /// Warn when convergence takes more rounds than this
    pub warn_rounds: usize,

    /// Conflict policy used by lookups that do not name one
    pub default_policy: ConflictPolicy,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            warn_rounds: DEFAULT_WARN_ROUNDS,
            default_policy: ConflictPolicy::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rotated file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
