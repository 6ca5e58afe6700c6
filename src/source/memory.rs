//! In-process source backed by a concurrent map.

use dashmap::DashMap;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Environment, PropertySet};
use crate::source::ConfigSource;

/// Source holding one property set per environment name, updatable at runtime.
#[derive(Debug, Default)]
pub struct InMemorySource {
    environments: DashMap<Environment, PropertySet>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source serving `properties` for the root environment.
    pub fn with_root(properties: PropertySet) -> Self {
        let source = Self::new();
        source.set(Environment::default(), properties);
        source
    }

    /// Replace the properties served for `environment`.
    pub fn set(&self, environment: impl Into<Environment>, properties: PropertySet) {
        self.environments.insert(environment.into(), properties);
    }

    /// Set a single key for `environment`, creating the environment if needed.
    pub fn put(&self, environment: impl Into<Environment>, key: &str, value: &str) {
        self.environments
            .entry(environment.into())
            .or_default()
            .insert(key, value);
    }

    pub fn remove(&self, environment: &Environment) -> Option<PropertySet> {
        self.environments.remove(environment).map(|(_, props)| props)
    }
}

impl ConfigSource for InMemorySource {
    fn fetch(&self, environment: &Environment) -> ConfigResult<PropertySet> {
        self.environments
            .get(environment)
            .map(|r| r.value().clone())
            .ok_or_else(|| ConfigError::EnvironmentNotFound {
                environment: environment.name().to_string(),
            })
    }
}
