//! Hand-built Provider Sources

use std::sync::Arc;

use weave_domain::ports::{Provider, ProviderSource};

/// A provider list assembled in code
#[derive(Debug, Default, Clone)]
pub struct ManualProviderSource {
    name: String,
    providers: Vec<Arc<dyn Provider>>,
}

impl ManualProviderSource {
    /// Empty source with a diagnostic name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            providers: Vec::new(),
        }
    }

    /// Append a provider (builder form)
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Append a provider
    pub fn push(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Extend<Arc<dyn Provider>> for ManualProviderSource {
    fn extend<I: IntoIterator<Item = Arc<dyn Provider>>>(&mut self, iter: I) {
        self.providers.extend(iter);
    }
}

impl ProviderSource for ManualProviderSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.clone()
    }
}
