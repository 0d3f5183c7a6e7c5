//! Unit tests for domain error types

use weave_domain::{Error, TypeKey};

#[test]
fn test_lookup_errors_name_the_key() {
    let key = TypeKey::named("Cache");
    assert_eq!(
        Error::no_provider(key.clone()).to_string(),
        "No provider registered for Cache"
    );
    assert_eq!(
        Error::missing_bean(key.clone(), "container").to_string(),
        "Missing bean Cache in scope container"
    );
    assert_eq!(
        Error::circular_dependency(key).to_string(),
        "Circular dependency detected while constructing Cache"
    );
}

#[test]
fn test_conflict_counts_candidates() {
    match Error::conflict(
        TypeKey::named("Cache"),
        "DirectMatch",
        2,
        vec!["a(order=0)".into(), "b(order=0)".into(), "c(order=3)".into()],
    ) {
        Error::Conflict {
            resolver,
            matched,
            total,
            ..
        } => {
            assert_eq!(resolver, "DirectMatch");
            assert_eq!((matched, total), (2, 3));
        }
        other => panic!("Expected Conflict error, got {other}"),
    }
}

#[test]
fn test_configuration_with_source() {
    let io = std::io::Error::other("disk on fire");
    match Error::configuration_with_source("cannot read weave.toml", io) {
        Error::Configuration { message, source } => {
            assert_eq!(message, "cannot read weave.toml");
            assert_eq!(source.map(|err| err.to_string()).as_deref(), Some("disk on fire"));
        }
        other => panic!("Expected Configuration error, got {other}"),
    }
}

#[test]
fn test_lifecycle_errors() {
    assert_eq!(Error::AlreadyLoaded.to_string(), "Container has already been loaded");
    assert_eq!(Error::NotLoaded.to_string(), "Container has not been loaded");
    assert!(matches!(
        Error::scope_not_started("singleton"),
        Error::ScopeNotStarted { ref scope } if scope == "singleton"
    ));
}
