//! Timing aspect
//!
//! Wraps methods tagged `timed` and reports how long the rest of the chain
//! took, success or failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use weave_application::registry::{ASPECT_HANDLERS, AspectHandlerEntry};
use weave_application::{AspectHandler, ExecutionContext, Value};
use weave_domain::Result;

use crate::constants::TIMED_TAG;

/// Elapsed-time tracker for one operation
///
/// # Example
///
/// ```
/// use weave_infrastructure::aspects::TimedOperation;
///
/// let timer = TimedOperation::start();
/// assert!(timer.elapsed_secs() >= 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in whole milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Elapsed time as Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Aspect logging the duration of every invocation it wraps
#[derive(Debug, Default)]
pub struct TimingAspect {
    invocations: AtomicU64,
    failures: AtomicU64,
    total_micros: AtomicU64,
}

impl TimingAspect {
    /// Fresh aspect with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations observed so far
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Invocations whose chain returned an error
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Accumulated time spent below this aspect
    pub fn total_elapsed(&self) -> Duration {
        Duration::from_micros(self.total_micros.load(Ordering::Relaxed))
    }
}

impl AspectHandler for TimingAspect {
    fn name(&self) -> &str {
        "timing"
    }

    // Outermost, so the measurement covers every other handler
    fn order(&self) -> i32 {
        i32::MIN
    }

    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value> {
        let method = context.method().name().to_string();
        let timer = TimedOperation::start();
        let result = context.proceed();
        let elapsed = timer.elapsed();

        self.invocations.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(
            u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
        match &result {
            Ok(_) => debug!(method = %method, elapsed_ms = timer.elapsed_ms(), "Invocation finished"),
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(method = %method, elapsed_ms = timer.elapsed_ms(), "Invocation failed: {}", err);
            }
        }
        result
    }
}

#[linkme::distributed_slice(ASPECT_HANDLERS)]
static TIMING_ASPECT: AspectHandlerEntry = AspectHandlerEntry {
    tag: TIMED_TAG,
    description: "Logs the elapsed time of each invocation",
    factory: || Arc::new(TimingAspect::new()),
};
