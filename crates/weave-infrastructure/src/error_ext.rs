//! Error extension utilities
//!
//! Context helpers turning foreign errors (I/O, figment, TOML) into the
//! domain error type.

use std::fmt;

use weave_domain::error::{Error, Result};

/// Extension trait for adding context to errors
///
/// # Example
///
/// ```
/// use weave_domain::Error;
/// use weave_infrastructure::error_ext::ErrorContext;
///
/// let missing = std::fs::read_to_string("/definitely/not/here.toml")
///     .config_context("Failed to read config file");
/// assert!(matches!(missing, Err(Error::Configuration { .. })));
/// ```
pub trait ErrorContext<T> {
    /// Add context, converting the error to an internal domain error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context with lazy evaluation for expensive context creation
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Add context for configuration operations, keeping the source error
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::internal(format!("{context}: {err}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::internal(format!("{}: {}", f(), err)))
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::configuration_with_source(format!("{context}: {err}"), err))
    }
}
