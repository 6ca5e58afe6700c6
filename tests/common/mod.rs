//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use livecfg::reload::ImmediateReloadStrategy;
use livecfg::source::ConfigSource;
use livecfg::{
    CacheMode, ConfigError, ConfigProvider, ConfigResult, Environment, PropertySet, ProviderBuilder,
};

/// A programmable source: returns its current properties unless a failure
/// has been scripted for the next fetch.
#[derive(Default)]
pub struct ScriptedSource {
    properties: Mutex<PropertySet>,
    failures: Mutex<VecDeque<ConfigError>>,
    delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Arc<Self> {
        let source = Self::default();
        source.replace(entries);
        Arc::new(source)
    }

    /// Replace every property.
    pub fn replace<'a>(&self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) {
        *self.properties.lock().unwrap() = entries.into_iter().collect();
    }

    pub fn set(&self, key: &str, value: &str) {
        self.properties.lock().unwrap().insert(key, value);
    }

    pub fn remove(&self, key: &str) {
        self.properties.lock().unwrap().remove(key);
    }

    /// Fail the next fetch with `error`.
    pub fn fail_next(&self, error: ConfigError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Sleep inside every fetch, to widen race windows.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ConfigSource for ScriptedSource {
    fn fetch(&self, _environment: &Environment) -> ConfigResult<PropertySet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.properties.lock().unwrap().clone())
    }
}

/// Provider over `source` with an immediate first load.
pub fn provider(source: &Arc<ScriptedSource>, mode: CacheMode) -> ConfigProvider {
    ProviderBuilder::new()
        .with_shared_source(source.clone())
        .with_mode(mode)
        .with_reload_strategy(ImmediateReloadStrategy)
        .build()
        .unwrap()
}
