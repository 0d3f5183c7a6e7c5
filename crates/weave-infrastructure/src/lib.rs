//! # Weave Infrastructure Layer
//!
//! Everything between the algorithms of `weave-application` and a running
//! program: the container facade, configuration, logging and built-in
//! aspects.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`container`] | `Container` and `ContainerBuilder` |
//! | [`config`] | Figment-based `ConfigLoader` and `ContainerConfig` |
//! | [`environment`] | `PropertyEnvironment`, the `Environment` seen by conditions |
//! | [`logging`] | `tracing-subscriber` initialisation |
//! | [`aspects`] | `TimingAspect` for methods tagged `timed` |
//! | [`error_ext`] | Context helpers for foreign errors |
//!
//! ## Example
//!
//! ```
//! use weave_application::FnProvider;
//! use weave_infrastructure::Container;
//!
//! let mut container = Container::builder()
//!     .with_provider(FnProvider::singleton(|_| Ok(42u32)).into_provider())
//!     .build();
//! container.load().unwrap();
//! assert_eq!(*container.get_typed::<u32>().unwrap(), 42);
//! ```

pub mod aspects;
pub mod config;
pub mod constants;
pub mod container;
pub mod environment;
pub mod error_ext;
pub mod logging;

pub use config::{ConfigLoader, ContainerConfig, LoggingConfig, ResolutionConfig};
pub use container::{Container, ContainerBuilder};
pub use environment::PropertyEnvironment;
pub use error_ext::ErrorContext;
