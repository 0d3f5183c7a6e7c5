//! Built-in aspect handlers
//!
//! Submitted to the `ASPECT_HANDLERS` slice, so `AspectRegistry::from_registry`
//! picks them up without manual registration.

pub mod timing;

pub use timing::{TimedOperation, TimingAspect};
