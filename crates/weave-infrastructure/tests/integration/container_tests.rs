//! Container lifecycle, conditional loading and lookups

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use weave_application::registry::{PROVIDERS, ProviderEntry};
use weave_application::{ConflictPolicy, FnProvider, ManualProviderSource};
use weave_domain::ports::{ConditionContext, Environment, Provider, Resolver, ResolverExt};
use weave_domain::{Condition, Error, Requirement, TypeKey};
use weave_infrastructure::config::ConfigBuilder;
use weave_infrastructure::{Container, PropertyEnvironment};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct Polite;

impl Greeter for Polite {
    fn greet(&self) -> String {
        "good morning".to_string()
    }
}

struct Clock(u64);

#[linkme::distributed_slice(PROVIDERS)]
static INTEGRATION_CLOCK: ProviderEntry = ProviderEntry {
    name: "integration_clock",
    description: "Clock contributed from the integration suite",
    factory: || FnProvider::singleton(|_| Ok(Clock(1_700_000_000))).into_provider(),
};

fn scenario_source() -> ManualProviderSource {
    ManualProviderSource::new("scenario")
        .with_provider(
            FnProvider::singleton(|_| Ok("x".to_string()))
                .named("Base")
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1.0f32))
                .named("Second")
                .with_condition(Condition::present([TypeKey::of::<String>()]))
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1i32))
                .named("First")
                .with_condition(Condition::present([
                    TypeKey::of::<String>(),
                    TypeKey::of::<f32>(),
                ]))
                .into_provider(),
        )
        .with_provider(
            FnProvider::singleton(|_| Ok(1.0f64))
                .named("Never")
                .with_condition(Condition::present([TypeKey::of::<f64>()]))
                .into_provider(),
        )
}

fn loaded(container: Container) -> Container {
    let mut container = container;
    container.load().unwrap();
    container
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_scenario_loads_three_providers() {
    let mut container = Container::builder().with_source(scenario_source()).build();
    let report = container.load().unwrap();

    assert_eq!(report.rounds, 3);
    assert_eq!(report.applied_conditional, 2);
    assert_eq!(
        report.to_string(),
        "Applied 2 conditional providers in 3 rounds"
    );
    assert_eq!(container.size(), 3);
    assert_eq!(container.dropped(), ["Never".to_string()]);
    assert_eq!(*container.get_typed::<i32>().unwrap(), 1);
    assert!(container.get_typed::<f64>().unwrap_err().is_not_found());
    assert_eq!(container.try_get_typed::<f64>().unwrap(), None);
}

#[test]
fn test_lookups_before_load_fail() {
    let container = Container::builder().with_source(scenario_source()).build();

    assert!(!container.is_loaded());
    assert!(matches!(
        container.get(&TypeKey::of::<String>()),
        Err(Error::NotLoaded)
    ));
    assert!(matches!(container.get_typed::<i32>(), Err(Error::NotLoaded)));
    assert!(container.dropped().is_empty());
    assert!(container.report().is_none());
    // Unconditional providers are visible as soon as they are announced
    assert!(container.contains(&TypeKey::of::<String>()));
    assert!(!container.contains(&TypeKey::of::<f32>()));
}

#[test]
fn test_load_and_announce_after_load_fail() {
    let mut container = loaded(Container::builder().build());

    assert!(matches!(container.load(), Err(Error::AlreadyLoaded)));
    let late = FnProvider::singleton(|_| Ok(1u8)).into_provider();
    assert!(matches!(container.announce(late), Err(Error::AlreadyLoaded)));
}

#[test]
fn test_announced_provider_unlocks_conditional_one() {
    let mut container = Container::builder()
        .with_provider(
            FnProvider::singleton(|_| Ok(2u16))
                .with_condition(Condition::present([TypeKey::of::<u8>()]))
                .into_provider(),
        )
        .build();
    container
        .announce(FnProvider::singleton(|_| Ok(1u8)).into_provider())
        .unwrap();

    let report = container.load().unwrap();
    assert_eq!(report.applied_conditional, 1);
    assert!(container.dropped().is_empty());
    assert_eq!(*container.get_typed::<u16>().unwrap(), 2);
}

#[test]
fn test_round_cap_from_configuration() {
    let mut container = Container::builder()
        .with_config(ConfigBuilder::new().with_max_rounds(1).build())
        .with_source(scenario_source())
        .build();

    let report = container.load().unwrap();
    assert!(report.capped);
    assert_eq!(report.rounds, 1);
    assert_eq!(report.applied_conditional, 0);
    assert_eq!(
        container.dropped(),
        [
            "Second".to_string(),
            "First".to_string(),
            "Never".to_string()
        ]
    );
}

#[test]
fn test_static_providers_are_loaded() {
    let container = loaded(Container::builder().with_static_providers().build());
    assert_eq!(container.get_typed::<Clock>().unwrap().0, 1_700_000_000);
}

// ============================================================================
// Environment
// ============================================================================

#[test]
fn test_properties_and_profiles_gate_providers() {
    let config = ConfigBuilder::new()
        .with_property("cache.mode", "redis")
        .with_profile("prod")
        .build();
    let container = loaded(
        Container::builder()
            .with_config(config)
            .with_provider(
                FnProvider::singleton(|_| Ok("redis"))
                    .named("redis-cache")
                    .with_condition(Condition::property("cache.mode", Some("redis")))
                    .into_provider(),
            )
            .with_provider(
                FnProvider::singleton(|_| Ok("in-memory"))
                    .named("memory-cache")
                    .with_condition(Condition::no_property("cache.mode", None))
                    .into_provider(),
            )
            .with_provider(
                FnProvider::singleton(|_| Ok(true))
                    .named("debug-banner")
                    .with_condition(Condition::profile(["dev"]))
                    .into_provider(),
            )
            .build(),
    );

    assert_eq!(*container.get_typed::<&'static str>().unwrap(), "redis");
    assert_eq!(
        container.dropped(),
        ["memory-cache".to_string(), "debug-banner".to_string()]
    );
    assert_eq!(
        container.environment().property("cache.mode").as_deref(),
        Some("redis")
    );
    assert!(container.environment().is_profile_active("prod"));
}

#[test]
fn test_explicit_environment_replaces_config_properties() {
    let container = loaded(
        Container::builder()
            .with_config(ConfigBuilder::new().with_property("region", "eu").build())
            .with_environment(PropertyEnvironment::new().with_property("region", "us"))
            .build(),
    );
    assert_eq!(
        container.environment().property("region").as_deref(),
        Some("us")
    );
}

#[test]
fn test_custom_evaluator() {
    let container = loaded(
        Container::builder()
            .with_config(ConfigBuilder::new().with_property("flags", "beta").build())
            .with_evaluator(
                "flag",
                |requirement: &Requirement, context: &dyn ConditionContext| {
                    requirement.evaluator == "flag"
                        && context
                            .environment()
                            .property("flags")
                            .is_some_and(|flags| flags.split(',').any(|flag| flag == "beta"))
                },
            )
            .with_provider(
                FnProvider::singleton(|_| Ok(7u8))
                    .with_condition(Condition::require(Requirement::new("flag")))
                    .into_provider(),
            )
            .build(),
    );
    assert_eq!(*container.get_typed::<u8>().unwrap(), 7);
}

// ============================================================================
// Lookups
// ============================================================================

#[test]
fn test_singletons_cached_and_prototypes_fresh() {
    let singletons = Arc::new(AtomicUsize::new(0));
    let prototypes = Arc::new(AtomicUsize::new(0));
    let (s, p) = (Arc::clone(&singletons), Arc::clone(&prototypes));

    let container = loaded(
        Container::builder()
            .with_provider(
                FnProvider::singleton(move |_| Ok(s.fetch_add(1, Ordering::SeqCst) as u64))
                    .into_provider(),
            )
            .with_provider(
                FnProvider::prototype(move |_| Ok(p.fetch_add(1, Ordering::SeqCst) as u32))
                    .into_provider(),
            )
            .build(),
    );

    let a = container.get_typed::<u64>().unwrap();
    let b = container.get_typed::<u64>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(singletons.load(Ordering::SeqCst), 1);

    let c = container.get_typed::<u32>().unwrap();
    let d = container.get_typed::<u32>().unwrap();
    assert_eq!((*c, *d), (0, 1));
}

#[test]
fn test_dependencies_resolve_across_scopes() {
    let container = loaded(
        Container::builder()
            .with_provider(FnProvider::singleton(|_| Ok(40u32)).into_provider())
            .with_provider(
                FnProvider::prototype(|resolver: &dyn Resolver| {
                    Ok(u64::from(*resolver.get::<u32>()?) + 2)
                })
                .into_provider(),
            )
            .build(),
    );
    assert_eq!(*container.get_typed::<u64>().unwrap(), 42);
}

#[test]
fn test_default_policy_and_per_lookup_policy() {
    let providers: Vec<Arc<dyn Provider>> = vec![
        FnProvider::singleton(|_| Ok("late")).with_order(5).into_provider(),
        FnProvider::singleton(|_| Ok("early")).with_order(-5).into_provider(),
    ];
    let key = TypeKey::of::<&'static str>();

    let mut builder = Container::builder().with_config(
        ConfigBuilder::new()
            .with_default_policy(ConflictPolicy::DirectMatch)
            .build(),
    );
    for provider in providers {
        builder = builder.with_provider(provider);
    }
    let container = loaded(builder.build());

    assert!(matches!(container.get(&key), Err(Error::Conflict { .. })));
    assert!(matches!(container.try_get(&key), Err(Error::Conflict { .. })));

    let first = container.get_with(&key, &ConflictPolicy::First).unwrap();
    assert_eq!(*first.downcast::<&'static str>().unwrap(), "early");

    let all: Vec<&str> = container
        .get_all_typed::<&'static str>()
        .unwrap()
        .iter()
        .map(|value| **value)
        .collect();
    assert_eq!(all, vec!["early", "late"]);
}

#[test]
fn test_singleton_and_prototype_compete_under_one_policy() {
    let container = loaded(
        Container::builder()
            .with_provider(
                FnProvider::singleton(|_| Ok("singleton"))
                    .with_order(5)
                    .into_provider(),
            )
            .with_provider(
                FnProvider::prototype(|_| Ok("prototype"))
                    .with_order(-5)
                    .into_provider(),
            )
            .build(),
    );
    let key = TypeKey::of::<&'static str>();

    assert!(matches!(
        container.get_with(&key, &ConflictPolicy::None),
        Err(Error::Conflict { total: 2, .. })
    ));

    let first = container.get_with(&key, &ConflictPolicy::First).unwrap();
    assert_eq!(*first.downcast::<&'static str>().unwrap(), "prototype");
    assert_eq!(*container.get_typed::<&'static str>().unwrap(), "prototype");

    let all: Vec<&str> = container
        .get_all_typed::<&'static str>()
        .unwrap()
        .iter()
        .map(|value| **value)
        .collect();
    assert_eq!(all, vec!["prototype", "singleton"]);
}

#[test]
fn test_typed_access_reports_mismatch() {
    let container = loaded(
        Container::builder()
            .with_provider(
                FnProvider::singleton(|_| Ok("not a number".to_string()))
                    .with_key(TypeKey::of::<u32>())
                    .into_provider(),
            )
            .build(),
    );
    assert!(matches!(
        container.get_typed::<u32>(),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_trait_objects_and_introspection() {
    let container = loaded(
        Container::builder()
            .with_provider(
                FnProvider::singleton(|_| Ok(Polite))
                    .also_provides::<dyn Greeter>(|polite| polite)
                    .into_provider(),
            )
            .build(),
    );

    assert_eq!(container.get_dyn::<dyn Greeter>().unwrap().greet(), "good morning");
    assert_eq!(container.size(), 1);

    let types = container.registered_types();
    assert!(types.contains(&TypeKey::of::<Polite>()));
    assert!(types.contains(&TypeKey::of::<dyn Greeter>()));
    let mut sorted = types.clone();
    sorted.sort();
    assert_eq!(types, sorted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_container_across_blocking_tasks() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let container = Arc::new(loaded(
        Container::builder()
            .with_provider(
                FnProvider::singleton(move |_| {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    Ok(counter.fetch_add(1, Ordering::SeqCst))
                })
                .into_provider(),
            )
            .build(),
    ));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let container = Arc::clone(&container);
        tasks.push(tokio::task::spawn_blocking(move || {
            container.get_typed::<usize>().map(|value| *value)
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 0);
    }
    assert_eq!(built.load(Ordering::SeqCst), 1);
}
