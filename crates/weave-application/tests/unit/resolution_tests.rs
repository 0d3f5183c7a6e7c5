//! Tests for the round-based resolution engine and conflict policies

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use weave_application::{
    ConditionEvaluators, ConflictPolicy, FnProvider, ManualProviderSource, Registries,
    ResolutionEngine,
};
use weave_domain::ports::{ConflictResolver, Environment, Provider};
use weave_domain::{Condition, Error, TypeDescriptor, TypeKey};

struct Properties(HashMap<String, String>);

impl Environment for Properties {
    fn property(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }

    fn profiles(&self) -> Vec<String> {
        vec!["test".to_string()]
    }
}

fn engine() -> ResolutionEngine {
    ResolutionEngine::new(
        ConditionEvaluators::from_registry(),
        Arc::new(Properties(HashMap::from([(
            "cache.mode".to_string(),
            "redis".to_string(),
        )]))),
    )
}

fn link(index: usize) -> TypeKey {
    TypeKey::named(format!("Link{index}"))
}

// ============================================================================
// Round convergence
// ============================================================================

fn scenario_source() -> ManualProviderSource {
    ManualProviderSource::new("scenario")
        .with_provider(
            FnProvider::singleton(|_| Ok("x".to_string()))
                .named("Base")
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1i32))
                .named("First")
                .with_condition(
                    Condition::present([TypeKey::of::<String>()])
                        .and(Condition::present([TypeKey::of::<f32>()])),
                )
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1.0f32))
                .named("Second")
                .with_condition(Condition::present([TypeKey::of::<String>()]))
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1.0f64))
                .named("Never")
                .with_condition(Condition::present([TypeKey::of::<f64>()]))
                .into_provider(),
        )
}

#[test]
fn test_scenario_converges_in_three_rounds() {
    let mut engine = engine();
    engine.add_source(&scenario_source());
    let report = engine.load();

    assert_eq!(report.rounds, 3);
    assert_eq!(report.applied_conditional, 2);
    assert_eq!(report.registered, 3);
    assert_eq!(report.dropped, vec!["Never".to_string()]);
    assert!(!report.capped);
    assert_eq!(
        report.to_string(),
        "Applied 2 conditional providers in 3 rounds"
    );
    assert_eq!(engine.registries().provider_count(), 3);
    assert!(!engine.registries().contains(&TypeKey::of::<f64>()));
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_scenario_logs_summary_and_dropped_provider() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let report = tracing::subscriber::with_default(subscriber, || {
        let mut engine = engine();
        engine.add_source(&scenario_source());
        engine.load()
    });

    let lines = logs.lines();
    let summary: Vec<&String> = lines
        .iter()
        .filter(|line| line.contains(" INFO ") && line.contains("conditional providers"))
        .collect();
    assert_eq!(summary.len(), 1, "{lines:#?}");
    assert!(summary[0].contains("Applied 2 conditional providers in 3 rounds"));
    assert!(summary[0].contains(&report.to_string()));

    let dropped: Vec<&String> = lines
        .iter()
        .filter(|line| line.contains(" WARN ") && line.contains("Dropping provider"))
        .collect();
    assert_eq!(dropped.len(), 1, "{lines:#?}");
    assert!(dropped[0].contains("provider=Never"));
}

#[test]
fn test_chain_of_depth_d_converges_in_d_plus_one_rounds() {
    // Depth counts dependency edges below the unconditional base
    for depth in 0..6 {
        let mut engine = engine();
        engine.announce(FnProvider::singleton(|_| Ok(0u8)).into_provider());

        // Announced back to front so every round unlocks exactly one link
        for index in (0..depth).rev() {
            let dependency = if index == 0 {
                TypeKey::of::<u8>()
            } else {
                link(index - 1)
            };
            engine.announce(
                FnProvider::singleton(move |_| Ok(index))
                    .with_key(link(index))
                    .with_condition(Condition::present([dependency]))
                    .into_provider(),
            );
        }

        let report = engine.load();
        assert_eq!(report.rounds, depth + 1, "depth {depth}");
        assert_eq!(report.applied_conditional, depth);
        assert_eq!(report.registered, depth + 1);
        assert!(report.dropped.is_empty());
    }
}

#[test]
fn test_unsatisfied_provider_does_not_change_round_count() {
    let chain = || {
        ManualProviderSource::new("chain")
            .with_provider(FnProvider::singleton(|_| Ok("x".to_string())).into_provider())
            .with_provider(
                FnProvider::singleton(|_| Ok(1.0f32))
                    .with_condition(Condition::present([TypeKey::of::<String>()]))
                    .into_provider(),
            )
            .with_provider(
                FnProvider::singleton(|_| Ok(1i32))
                    .with_condition(Condition::present([TypeKey::of::<f32>()]))
                    .into_provider(),
            )
    };

    let mut clean = engine();
    clean.add_source(&chain());
    let clean = clean.load();

    let mut crowded = engine();
    crowded.add_source(&chain().with_provider(
        FnProvider::singleton(|_| Ok(1.0f64))
            .named("Never")
            .with_condition(Condition::present([TypeKey::of::<f64>()]))
            .into_provider(),
    ));
    let crowded = crowded.load();

    assert_eq!(clean.rounds, 3);
    assert_eq!(crowded.rounds, clean.rounds);
    assert_eq!(crowded.to_string(), clean.to_string());
    assert_eq!(crowded.dropped, vec!["Never".to_string()]);
}

#[test]
fn test_unsatisfiable_provider_does_not_inflate_count() {
    let mut engine = engine();
    engine.announce(FnProvider::singleton(|_| Ok(0u8)).into_provider());
    engine.announce(
        FnProvider::singleton(|_| Ok(0u16))
            .with_condition(Condition::missing([TypeKey::of::<u8>()]))
            .into_provider(),
    );

    let report = engine.load();
    assert_eq!(report.registered, 1);
    assert_eq!(report.rounds, 1);
    assert_eq!(report.dropped.len(), 1);
}

#[test]
fn test_fixed_point_is_idempotent() {
    let mut engine = engine();
    engine.announce(FnProvider::singleton(|_| Ok(0u8)).into_provider());
    engine.announce(
        FnProvider::singleton(|_| Ok(0u16))
            .with_condition(Condition::present([TypeKey::of::<u8>()]))
            .into_provider(),
    );
    engine.announce(
        FnProvider::singleton(|_| Ok(0u32))
            .with_condition(Condition::present([TypeKey::of::<u64>()]))
            .into_provider(),
    );

    let first = engine.converge();
    let before = engine.report();
    assert_eq!(first, 2);

    assert_eq!(engine.converge(), 0);
    assert_eq!(engine.report(), before);

    let report = engine.load();
    assert_eq!(report.rounds, before.rounds);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(engine.converge(), 0);
}

#[test]
fn test_late_announcement_reopens_convergence() {
    let mut engine = engine();
    engine.announce(
        FnProvider::singleton(|_| Ok(0u16))
            .with_condition(Condition::present([TypeKey::of::<u8>()]))
            .into_provider(),
    );
    assert_eq!(engine.converge(), 1);
    assert_eq!(engine.pending().count(), 1);

    engine.announce(FnProvider::singleton(|_| Ok(0u8)).into_provider());
    assert_eq!(engine.converge(), 1);
    assert_eq!(engine.pending().count(), 0);
}

#[test]
fn test_property_and_profile_conditions() {
    let mut engine = engine();
    engine.announce(
        FnProvider::singleton(|_| Ok("redis".to_string()))
            .named("redis")
            .with_condition(Condition::property("cache.mode", Some("redis")))
            .into_provider(),
    );
    engine.announce(
        FnProvider::singleton(|_| Ok("moka".to_string()))
            .named("moka")
            .with_condition(Condition::property("cache.mode", Some("moka")))
            .into_provider(),
    );
    engine.announce(
        FnProvider::singleton(|_| Ok(1u8))
            .named("test-only")
            .with_condition(Condition::profile(["test"]))
            .into_provider(),
    );

    let report = engine.load();
    assert_eq!(report.applied_conditional, 2);
    assert_eq!(report.dropped, vec!["moka".to_string()]);
}

#[test]
fn test_round_cap_drops_remaining() {
    let mut engine = engine().with_max_rounds(Some(2));
    engine.announce(FnProvider::singleton(|_| Ok(0u8)).into_provider());
    for index in (0..4).rev() {
        let dependency = if index == 0 {
            TypeKey::of::<u8>()
        } else {
            link(index - 1)
        };
        engine.announce(
            FnProvider::singleton(move |_| Ok(index))
                .named(format!("link{index}"))
                .with_key(link(index))
                .with_condition(Condition::present([dependency]))
                .into_provider(),
        );
    }

    let report = engine.load();
    assert!(report.capped);
    assert_eq!(report.rounds, 2);
    assert_eq!(report.applied_conditional, 1);
    assert_eq!(
        report.dropped,
        vec!["link3".to_string(), "link2".to_string(), "link1".to_string()]
    );
}

// ============================================================================
// Conflict policies
// ============================================================================

fn crowded_registries() -> Registries {
    let mut registries = Registries::new();
    let specs: [(&str, bool, i32); 5] = [
        ("direct-late", true, 7),
        ("alias-early", false, -2),
        ("direct-early", true, 1),
        ("alias-late", false, 9),
        ("direct-tied", true, 1),
    ];
    for (name, direct, order) in specs {
        let provider: Arc<dyn Provider> = if direct {
            FnProvider::singleton(|_| Ok(0u8))
                .with_key(TypeKey::named("Greeter"))
                .named(name)
                .with_order(order)
                .into_provider()
        } else {
            FnProvider::singleton(|_| Ok(0u8))
                .with_key(TypeKey::named(format!("{name}-impl")))
                .also_provides_key(TypeKey::named("Greeter"))
                .named(name)
                .with_order(order)
                .into_provider()
        };
        registries.register(provider).unwrap();
    }
    registries
}

#[test]
fn test_policies_on_crowded_registry() {
    let registries = crowded_registries();
    let greeter = TypeKey::named("Greeter");
    let pick = |policy: ConflictPolicy| {
        registries
            .resolve(&greeter, &policy)
            .map(|candidate| candidate.provider.name())
    };

    assert_eq!(pick(ConflictPolicy::First).unwrap(), "alias-early");
    assert_eq!(pick(ConflictPolicy::BestMatch).unwrap(), "direct-early");
    assert_eq!(pick(ConflictPolicy::FirstDirectMatch).unwrap(), "direct-early");

    let err = pick(ConflictPolicy::DirectMatch).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to resolve Greeter with resolver DirectMatch: 3 of 5 candidates matched \
         [alias-early(order=-2), direct-early(order=1), direct-tied(order=1), \
         direct-late(order=7), alias-late(order=9)]"
    );

    let err = pick(ConflictPolicy::None).unwrap_err();
    assert!(matches!(err, Error::Conflict { matched: 0, total: 5, .. }));
}

#[test]
fn test_policies_are_total_over_every_prefix() {
    let registries = crowded_registries();
    let greeter = TypeKey::named("Greeter");
    let all = registries.resolve_all(&greeter);

    for len in 1..=all.len() {
        let candidates = &all[..len];
        for policy in ConflictPolicy::ALL {
            match policy.select(&greeter, candidates) {
                Ok(chosen) => {
                    assert_ne!(policy, ConflictPolicy::None);
                    assert!(candidates.iter().any(|c| c.sequence == chosen.sequence));
                }
                Err(Error::Conflict { total, .. }) => assert_eq!(total, len),
                Err(other) => panic!("{policy} raised a non-conflict error: {other}"),
            }
        }
    }
}

#[test]
fn test_wildcard_generic_lookup() {
    let mut registries = Registries::new();
    for entity in ["User", "Order"] {
        registries
            .register(
                FnProvider::singleton(move |_| Ok(entity))
                    .with_key(TypeKey::named("Repository").with_generic(TypeDescriptor::named(entity)))
                    .into_provider(),
            )
            .unwrap();
    }

    let any = TypeKey::named("Repository").with_generic(TypeDescriptor::wildcard());
    assert_eq!(registries.resolve_all(&any).len(), 2);
    assert!(registries.resolve(&any, &ConflictPolicy::DirectMatch).is_err());

    let users = TypeKey::named("Repository").with_generic(TypeDescriptor::named("User"));
    assert!(registries.resolve(&users, &ConflictPolicy::DirectMatch).is_ok());
}
