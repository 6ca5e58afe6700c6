//! Atomically published per-environment snapshots.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Environment, PropertySet, Snapshot};
use crate::observability::metrics;
use crate::reload::Reloadable;
use crate::resolver::Pipeline;
use crate::source::ConfigSource;

/// How reads before the first load and reload failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Reads fail until loaded; reload errors propagate.
    #[default]
    Strict,
    /// Reads never fail for "not loaded"; reload errors are swallowed and
    /// fetched keys are merged over the previous snapshot.
    Resilient,
}

/// Holds the last successfully resolved snapshot for each environment.
pub struct SnapshotCache {
    source: Arc<dyn ConfigSource>,
    pipeline: Pipeline,
    mode: CacheMode,
    metrics_enabled: bool,
    snapshots: ArcSwap<HashMap<Environment, Arc<Snapshot>>>,
    empty: Arc<Snapshot>,
    /// Serializes publication; guards the generation counter.
    publish: Mutex<u64>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn ConfigSource>, pipeline: Pipeline, mode: CacheMode) -> Self {
        Self {
            source,
            pipeline,
            mode,
            metrics_enabled: false,
            snapshots: ArcSwap::from_pointee(HashMap::new()),
            empty: Arc::new(Snapshot::empty()),
            publish: Mutex::new(0),
        }
    }

    /// Record fetch/reload metrics through the `metrics` facade.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Current snapshot for `environment`.
    pub fn snapshot(&self, environment: &Environment) -> ConfigResult<Arc<Snapshot>> {
        let snapshots = self.snapshots.load();
        match (snapshots.get(environment), self.mode) {
            (Some(snapshot), _) => Ok(Arc::clone(snapshot)),
            (None, CacheMode::Resilient) => Ok(Arc::clone(&self.empty)),
            (None, CacheMode::Strict) => Err(ConfigError::NoEnvironment {
                environment: environment.name().to_string(),
            }),
        }
    }

    /// Environments that have a published snapshot.
    pub fn environments(&self) -> Vec<Environment> {
        let mut environments: Vec<Environment> = self.snapshots.load().keys().cloned().collect();
        environments.sort();
        environments
    }

    /// Fetch, resolve and publish a new snapshot for `environment`.
    ///
    /// Strict mode returns the failure; resilient mode logs it and keeps the
    /// previous snapshot.
    pub fn reload(&self, environment: &Environment) -> ConfigResult<()> {
        match (self.refresh(environment), self.mode) {
            (Ok(_), _) => Ok(()),
            (Err(e), CacheMode::Strict) => {
                tracing::warn!(environment = %environment, error = %e, "Reload failed");
                Err(e)
            }
            (Err(e), CacheMode::Resilient) => {
                tracing::error!(
                    environment = %environment,
                    error = %e,
                    "Reload failed. Keeping current configuration."
                );
                Ok(())
            }
        }
    }

    fn refresh(&self, environment: &Environment) -> ConfigResult<u64> {
        tracing::debug!(environment = %environment, "Reloading configuration");
        let start = Instant::now();
        let fetched = self
            .source
            .fetch(environment)
            .and_then(|props| self.pipeline.resolve(props));
        if self.metrics_enabled {
            metrics::record_fetch(environment, start, fetched.is_ok());
        }

        let generation = self.publish(environment, fetched?);
        Ok(generation)
    }

    fn publish(&self, environment: &Environment, fetched: PropertySet) -> u64 {
        let mut generation = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;

        let current = self.snapshots.load_full();
        let properties = match (self.mode, current.get(environment)) {
            (CacheMode::Resilient, Some(previous)) => previous.properties().merged_with(&fetched),
            _ => fetched,
        };
        let keys = properties.len();

        let mut next = HashMap::clone(&current);
        next.insert(environment.clone(), Arc::new(Snapshot::new(properties, *generation)));
        self.snapshots.store(Arc::new(next));

        if self.metrics_enabled {
            metrics::record_snapshot_size(environment, keys);
        }
        tracing::info!(
            environment = %environment,
            generation = *generation,
            keys,
            "Configuration snapshot published"
        );
        *generation
    }
}

impl fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("mode", &self.mode)
            .field("pipeline", &self.pipeline)
            .field("environments", &self.environments())
            .finish()
    }
}

/// Reloads one environment of a shared cache; what reload schedules drive.
#[derive(Debug, Clone)]
pub struct EnvironmentReloader {
    cache: Arc<SnapshotCache>,
    environment: Environment,
}

impl EnvironmentReloader {
    pub fn new(cache: Arc<SnapshotCache>, environment: Environment) -> Self {
        Self { cache, environment }
    }
}

impl Reloadable for EnvironmentReloader {
    fn reload(&self) -> ConfigResult<()> {
        self.cache.reload(&self.environment)
    }

    fn describe(&self) -> String {
        format!("environment {}", self.environment)
    }
}
