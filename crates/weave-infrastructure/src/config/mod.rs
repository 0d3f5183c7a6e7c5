//! Configuration
//!
//! Figment-based loading of [`ContainerConfig`]: defaults, then TOML, then
//! `WEAVE_`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader, validate_config};
pub use types::{ContainerConfig, LoggingConfig, ResolutionConfig};
