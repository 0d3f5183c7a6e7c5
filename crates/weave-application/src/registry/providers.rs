//! Provider Registry
//!
//! Generated or hand-written providers register themselves into
//! [`PROVIDERS`]; [`StaticProviderSource`] hands them to the engine.

use std::sync::Arc;

use weave_domain::ports::{Provider, ProviderSource};

/// Registry entry for a provider
///
/// The factory is called once per load cycle when the source is iterated.
pub struct ProviderEntry {
    /// Unique entry name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function creating the provider
    pub factory: fn() -> Arc<dyn Provider>,
}

// Auto-collection via linkme distributed slices - contributors submit entries at compile time
#[linkme::distributed_slice]
pub static PROVIDERS: [ProviderEntry] = [..];

/// List all registered provider entries
///
/// Returns (name, description) tuples sorted by name.
pub fn list_providers() -> Vec<(&'static str, &'static str)> {
    let mut providers: Vec<(&'static str, &'static str)> = PROVIDERS
        .iter()
        .map(|entry| (entry.name, entry.description))
        .collect();
    providers.sort_by_key(|(name, _)| *name);
    providers
}

/// Provider source backed by the [`PROVIDERS`] slice
///
/// Link order is not stable across builds, so entries are yielded sorted by
/// name to keep round-by-round resolution reproducible.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticProviderSource;

impl StaticProviderSource {
    /// Create the source
    pub fn new() -> Self {
        Self
    }
}

impl ProviderSource for StaticProviderSource {
    fn name(&self) -> &str {
        "static"
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        let mut entries: Vec<&ProviderEntry> = PROVIDERS.iter().collect();
        entries.sort_by_key(|entry| entry.name);
        entries.into_iter().map(|entry| (entry.factory)()).collect()
    }
}
