//! Property-backed environment
//!
//! The `Environment` the container hands to conditions, built from the
//! `properties` table and `profiles` list of the configuration.

use std::collections::BTreeMap;

use weave_domain::ports::Environment;

use crate::config::ContainerConfig;

/// Properties and active profiles held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyEnvironment {
    properties: BTreeMap<String, String>,
    profiles: Vec<String>,
}

impl PropertyEnvironment {
    /// Empty environment: no properties, no profiles
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment described by a configuration
    pub fn from_config(config: &ContainerConfig) -> Self {
        Self {
            properties: config.properties.clone(),
            profiles: config.profiles.clone(),
        }
    }

    /// Set a property, replacing any previous value
    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Activate a profile
    pub fn with_profile<S: Into<String>>(mut self, profile: S) -> Self {
        let profile = profile.into();
        if !self.profiles.contains(&profile) {
            self.profiles.push(profile);
        }
        self
    }

    /// All properties, sorted by name
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl Environment for PropertyEnvironment {
    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn profiles(&self) -> Vec<String> {
        self.profiles.clone()
    }
}
