//! Configuration loader
//!
//! Merges, later sources overriding earlier ones:
//! 1. `ContainerConfig::default()`
//! 2. a TOML file (explicit path, or `weave.toml` found by search)
//! 3. environment variables such as `WEAVE_RESOLUTION__MAX_ROUNDS`

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use weave_domain::error::{Error, Result};

use crate::config::ContainerConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<ContainerConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(ContainerConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            } else {
                log_config_loaded(config_path, false);
            }
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let config: ContainerConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &ContainerConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;
        Ok(())
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a loaded configuration
pub fn validate_config(config: &ContainerConfig) -> Result<()> {
    if config.resolution.max_rounds == Some(0) {
        return Err(Error::configuration(
            "resolution.max_rounds cannot be 0; omit it for no cap",
        ));
    }
    if config.resolution.warn_rounds == 0 {
        return Err(Error::configuration("resolution.warn_rounds cannot be 0"));
    }
    parse_log_level(&config.logging.level)?;
    if config.profiles.iter().any(|profile| profile.trim().is_empty()) {
        return Err(Error::configuration("profile names cannot be empty"));
    }
    Ok(())
}

/// Programmatic configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: ContainerConfig,
}

impl ConfigBuilder {
    /// Start from defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of conditional rounds
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.config.resolution.max_rounds = Some(max_rounds);
        self
    }

    /// Round count above which convergence is logged as slow
    pub fn with_warn_rounds(mut self, warn_rounds: usize) -> Self {
        self.config.resolution.warn_rounds = warn_rounds;
        self
    }

    /// Policy for lookups that do not name one
    pub fn with_default_policy(mut self, policy: weave_application::ConflictPolicy) -> Self {
        self.config.resolution.default_policy = policy;
        self
    }

    /// Set a property
    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.config.properties.insert(name.into(), value.into());
        self
    }

    /// Activate a profile
    pub fn with_profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.config.profiles.push(profile.into());
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: crate::config::LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ContainerConfig {
        self.config
    }
}
