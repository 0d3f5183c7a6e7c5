//! Tests for interception chains and execution contexts

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use weave_application::{
    AspectHandler, AspectRegistry, ChainLink, ExecutionContext, RootMethod, Value,
};
use weave_domain::{Error, Result};

type Journal = Arc<Mutex<Vec<String>>>;

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Records its name, then proceeds
struct Recording {
    name: &'static str,
    journal: Journal,
}

impl AspectHandler for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value> {
        self.journal.lock().unwrap().push(self.name.to_string());
        context.proceed()
    }
}

/// Returns a fixed value without proceeding
struct ShortCircuit;

impl AspectHandler for ShortCircuit {
    fn name(&self) -> &str {
        "short-circuit"
    }

    fn invoke(&self, _context: &mut ExecutionContext) -> Result<Value> {
        Ok(Box::new(-1i64))
    }
}

/// Proceeds until the rest of the chain succeeds, at most `attempts` times
struct Retry {
    attempts: usize,
}

impl AspectHandler for Retry {
    fn name(&self) -> &str {
        "retry"
    }

    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value> {
        let mut last = None;
        for _ in 0..self.attempts {
            match context.proceed() {
                Ok(value) => return Ok(value),
                Err(err) => last = Some(err),
            }
        }
        Err(last.unwrap_or_else(|| Error::aspect("retry", "no attempts configured")))
    }
}

/// Doubles the `amount` argument before proceeding
struct Doubling;

impl AspectHandler for Doubling {
    fn name(&self) -> &str {
        "doubling"
    }

    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value> {
        let amount = *context.require_argument::<i64>("amount")?;
        context.set_argument("amount", amount * 2);
        context.proceed()
    }
}

fn recording_root(journal: &Journal) -> RootMethod {
    let journal = Arc::clone(journal);
    RootMethod::new("transfer", move |context: &mut ExecutionContext| {
        journal.lock().unwrap().push("R".to_string());
        Ok(*context.require_argument::<i64>("amount")?)
    })
    .with_parameter::<i64, _>("amount")
    .with_tag("audited")
}

// ============================================================================
// Ordering and short-circuit
// ============================================================================

#[test]
fn test_last_prepended_runs_first() {
    let journal = journal();
    let h1 = Arc::new(Recording {
        name: "H1",
        journal: Arc::clone(&journal),
    });
    let h2 = Arc::new(Recording {
        name: "H2",
        journal: Arc::clone(&journal),
    });

    let chain = ChainLink::root(recording_root(&journal))
        .prepend(h1)
        .prepend(h2);
    assert_eq!(chain.handler_names(), vec!["H2", "H1"]);
    assert_eq!(chain.depth(), 2);

    let result: i64 = chain
        .invoke_as(|context| context.set_argument("amount", 10i64))
        .unwrap();
    assert_eq!(result, 10);
    assert_eq!(entries(&journal), vec!["H2", "H1", "R"]);
}

#[test]
fn test_handler_that_does_not_proceed_stops_the_chain() {
    let journal = journal();
    let h1 = Arc::new(Recording {
        name: "H1",
        journal: Arc::clone(&journal),
    });

    let chain = ChainLink::root(recording_root(&journal))
        .prepend(h1)
        .prepend(Arc::new(ShortCircuit));

    let result: i64 = chain
        .invoke_as(|context| context.set_argument("amount", 10i64))
        .unwrap();
    assert_eq!(result, -1);
    assert!(entries(&journal).is_empty());
}

#[test]
fn test_handler_can_rewrite_arguments() {
    let journal = journal();
    let chain = ChainLink::root(recording_root(&journal)).prepend(Arc::new(Doubling));

    let result: i64 = chain
        .invoke_as(|context| context.set_argument("amount", 21i64))
        .unwrap();
    assert_eq!(result, 42);
}

// ============================================================================
// Proceed semantics
// ============================================================================

#[test]
fn test_retry_proceeds_several_times() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let flaky = RootMethod::new("flaky", move |_: &mut ExecutionContext| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        if attempt < 2 {
            Err(Error::internal(format!("attempt {attempt} failed")))
        } else {
            Ok(attempt)
        }
    });

    let chain = ChainLink::root(flaky).prepend(Arc::new(Retry { attempts: 3 }));
    let result: usize = chain.invoke_as(|_| {}).unwrap();
    assert_eq!(result, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_retry_gives_up_with_last_error() {
    let always_failing = RootMethod::new("broken", |_: &mut ExecutionContext| -> Result<()> {
        Err(Error::internal("boom"))
    });
    let chain = ChainLink::root(always_failing).prepend(Arc::new(Retry { attempts: 2 }));

    let err = chain.invoke(|_| {}).unwrap_err();
    assert!(matches!(err, Error::Internal { ref message } if message == "boom"));
}

#[test]
fn test_proceed_past_root_is_illegal() {
    let greedy = RootMethod::new("greedy", |context: &mut ExecutionContext| {
        context.proceed().map(|_| ())
    });
    let err = ChainLink::root(greedy).invoke(|_| {}).unwrap_err();
    assert!(matches!(err, Error::IllegalChainState { .. }));
}

#[test]
fn test_proceed_outside_run_is_illegal() {
    let chain = ChainLink::root(RootMethod::new("noop", |_: &mut ExecutionContext| Ok(())));
    let mut context = chain.context();
    assert!(matches!(
        context.proceed(),
        Err(Error::IllegalChainState { .. })
    ));
}

#[test]
fn test_root_errors_propagate_unchanged() {
    let journal = journal();
    let chain = ChainLink::root(recording_root(&journal)).prepend(Arc::new(Recording {
        name: "H1",
        journal: Arc::clone(&journal),
    }));

    let err = chain.invoke(|_| {}).unwrap_err();
    assert!(matches!(err, Error::MissingArgument { ref name } if name == "amount"));
    assert_eq!(entries(&journal), vec!["H1", "R"]);
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn test_arguments_are_cleared_after_success_and_failure() {
    let journal = journal();
    let chain = ChainLink::root(recording_root(&journal));
    let mut context = chain.context();

    context.set_argument("amount", 5i64);
    assert_eq!(context.run_as::<i64>().unwrap(), 5);
    assert!(!context.has_argument("amount"));

    context.set_argument("amount", "not a number".to_string());
    let err = context.run().unwrap_err();
    assert!(matches!(err, Error::ArgumentType { .. }));
    assert!(context.argument_names().is_empty());

    context.set_argument("amount", 6i64);
    assert_eq!(context.run_as::<i64>().unwrap(), 6);
}

#[test]
fn test_argument_accessors() {
    let chain = ChainLink::root(RootMethod::new("noop", |_: &mut ExecutionContext| Ok(())));
    let mut context = chain.context();
    context.set_argument("name", "weave".to_string());

    assert_eq!(context.get_argument::<String>("name").unwrap(), "weave");
    assert!(context.get_argument::<i32>("name").is_none());
    assert!(matches!(
        context.require_argument::<i32>("missing"),
        Err(Error::MissingArgument { .. })
    ));
    assert_eq!(context.method().name(), "noop");
}

#[test]
fn test_root_metadata() {
    let method = recording_root(&journal());
    assert_eq!(method.name(), "transfer");
    assert!(method.has_tag("audited"));
    assert_eq!(
        method.parameter_type("amount").map(|descriptor| descriptor.name()),
        Some("i64")
    );
    assert!(method.parameter_type("currency").is_none());
}

#[test]
fn test_concurrent_invocations_do_not_share_arguments() {
    let chain = ChainLink::root(RootMethod::new(
        "echo",
        |context: &mut ExecutionContext| Ok(*context.require_argument::<usize>("value")?),
    ))
    .prepend(Arc::new(PresenceCheck));

    thread::scope(|s| {
        for value in 0..8usize {
            let chain = &chain;
            s.spawn(move || {
                for _ in 0..50 {
                    let echoed: usize = chain
                        .invoke_as(|context| context.set_argument("value", value))
                        .unwrap();
                    assert_eq!(echoed, value);
                }
            });
        }
    });
}

/// Passes through after checking the argument is present
struct PresenceCheck;

impl AspectHandler for PresenceCheck {
    fn name(&self) -> &str {
        "presence-check"
    }

    fn invoke(&self, context: &mut ExecutionContext) -> Result<Value> {
        context.require_argument::<usize>("value")?;
        context.proceed()
    }
}

// ============================================================================
// Registry weaving
// ============================================================================

#[test]
fn test_weave_applies_matching_handlers_only() {
    let journal = journal();
    let mut registry = AspectRegistry::new();
    registry.register(
        "audited",
        Arc::new(Recording {
            name: "audit",
            journal: Arc::clone(&journal),
        }),
    );
    registry.register(
        "cached",
        Arc::new(Recording {
            name: "cache",
            journal: Arc::clone(&journal),
        }),
    );

    let chain = registry.weave(recording_root(&journal));
    let result: i64 = chain
        .invoke_as(|context| context.set_argument("amount", 3i64))
        .unwrap();
    assert_eq!(result, 3);
    assert_eq!(entries(&journal), vec!["audit", "R"]);
}
