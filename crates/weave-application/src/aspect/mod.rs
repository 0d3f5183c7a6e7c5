//! Aspect Execution
//!
//! An intercepted method is a persistent linked chain built back to front:
//!
//! ```text
//!   prepend(H1)          prepend(H2)
//! R ──────────► H1 → R ──────────► H2 → H1 → R
//! ```
//!
//! The last handler prepended runs first. Each handler receives the
//! invocation's [`ExecutionContext`] and decides whether to call
//! [`ExecutionContext::proceed`] (zero, one or several times) or to return a
//! value of its own. Chains are immutable once built; only the per-call
//! context is mutable, so one chain serves concurrent callers.

pub mod chain;
pub mod context;
pub mod handler;

pub use chain::{ChainLink, RootMethod};
pub use context::{ExecutionContext, Value};
pub use handler::{AspectHandler, AspectRegistry};
