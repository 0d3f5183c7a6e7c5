//! Container builder
//!
//! Collects configuration, provider sources, condition evaluators and
//! aspect handlers, then announces every provider to a fresh engine.

use std::sync::Arc;

use tracing::debug;
use weave_application::registry::StaticProviderSource;
use weave_application::{
    AspectHandler, AspectRegistry, ConditionEvaluator, ConditionEvaluators, ManualProviderSource,
    ResolutionEngine,
};
use weave_domain::ports::{Environment, Provider, ProviderSource};

use super::Container;
use crate::config::ContainerConfig;
use crate::constants::MANUAL_SOURCE_NAME;
use crate::environment::PropertyEnvironment;

/// Builder for [`Container`]
pub struct ContainerBuilder {
    config: ContainerConfig,
    environment: Option<PropertyEnvironment>,
    sources: Vec<Arc<dyn ProviderSource>>,
    manual: ManualProviderSource,
    evaluators: ConditionEvaluators,
    aspects: AspectRegistry,
}

impl ContainerBuilder {
    /// Default configuration, built-in evaluators and registered aspect handlers
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            environment: None,
            sources: Vec::new(),
            manual: ManualProviderSource::new(MANUAL_SOURCE_NAME),
            evaluators: ConditionEvaluators::from_registry(),
            aspects: AspectRegistry::from_registry(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this environment instead of the one described by the configuration
    pub fn with_environment(mut self, environment: PropertyEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Read providers submitted to the `PROVIDERS` slice
    pub fn with_static_providers(self) -> Self {
        self.with_source(StaticProviderSource::new())
    }

    /// Add a provider source; sources are read in the order added
    pub fn with_source<S: ProviderSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add a single provider after every source
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.manual.push(provider);
        self
    }

    /// Add or replace a condition evaluator
    pub fn with_evaluator<S, E>(mut self, name: S, evaluator: E) -> Self
    where
        S: Into<String>,
        E: ConditionEvaluator + 'static,
    {
        self.evaluators.register(name, evaluator);
        self
    }

    /// Register an aspect handler for a metadata tag
    pub fn with_aspect<S: Into<String>>(mut self, tag: S, handler: Arc<dyn AspectHandler>) -> Self {
        self.aspects.register(tag, handler);
        self
    }

    /// Create the container; nothing is resolved until [`Container::load`]
    pub fn build(self) -> Container {
        let environment = Arc::new(
            self.environment
                .unwrap_or_else(|| PropertyEnvironment::from_config(&self.config)),
        );
        let conditions: Arc<dyn Environment> = environment.clone();
        let resolution = &self.config.resolution;
        let mut engine = ResolutionEngine::new(self.evaluators, conditions)
            .with_max_rounds(resolution.max_rounds)
            .with_warn_rounds(resolution.warn_rounds);

        for source in &self.sources {
            engine.add_source(source.as_ref());
        }
        engine.add_source(&self.manual);
        debug!(
            sources = self.sources.len() + 1,
            aspects = self.aspects.len(),
            "Container built"
        );

        Container::new(self.config, environment, engine, self.aspects)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
