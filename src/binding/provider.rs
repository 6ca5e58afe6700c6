//! Application-facing configuration provider.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::binding::bind::{Bind, Reader};
use crate::binding::parse::ParserRegistry;
use crate::binding::schema::{AccessorInfo, Schema, SchemaBinding};
use crate::binding::validation;
use crate::cache::{EnvironmentReloader, SnapshotCache};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{Environment, PropertySet, Snapshot};
use crate::reload::{ReloadStrategy, Reloadable};

/// Deepest prefix (in path segments) a schema may be bound at. Guards against
/// self-referential schemas recursing forever during validation.
const MAX_BIND_DEPTH: usize = 64;

struct ProviderInner {
    cache: Arc<SnapshotCache>,
    environment: Environment,
    parsers: ParserRegistry,
    reloadable: Arc<dyn Reloadable>,
    strategy: Option<Arc<dyn ReloadStrategy>>,
    next_binding: AtomicU64,
}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        if let Some(strategy) = &self.strategy {
            strategy.deregister(&self.reloadable);
        }
    }
}

/// Typed access to the current snapshot of one environment.
///
/// Cheap to clone; clones share the cache, parsers and reload registration.
/// Bound schema objects keep the provider alive, and the reload registration
/// is cancelled once the last clone and bound object are dropped.
#[derive(Clone)]
pub struct ConfigProvider {
    inner: Arc<ProviderInner>,
}

impl ConfigProvider {
    /// Create a provider over `cache` for `environment`, registering it with
    /// `strategy` (which performs the first reload).
    pub fn new(
        cache: Arc<SnapshotCache>,
        environment: Environment,
        strategy: Option<Arc<dyn ReloadStrategy>>,
    ) -> ConfigResult<Self> {
        let reloadable: Arc<dyn Reloadable> =
            Arc::new(EnvironmentReloader::new(Arc::clone(&cache), environment.clone()));
        if let Some(strategy) = &strategy {
            strategy.register(Arc::clone(&reloadable))?;
        }

        Ok(Self {
            inner: Arc::new(ProviderInner {
                cache,
                environment,
                parsers: ParserRegistry::new(),
                reloadable,
                strategy,
                next_binding: AtomicU64::new(1),
            }),
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.inner.cache
    }

    pub(crate) fn parsers(&self) -> &ParserRegistry {
        &self.inner.parsers
    }

    /// The snapshot currently published for this provider's environment.
    pub fn snapshot(&self) -> ConfigResult<Arc<Snapshot>> {
        self.inner.cache.snapshot(&self.inner.environment)
    }

    /// A reader pinned to the current snapshot, for one logical read.
    pub fn reader(&self) -> ConfigResult<Reader<'_>> {
        Ok(Reader::new(self, self.snapshot()?))
    }

    /// Reload now, outside any schedule.
    pub fn reload(&self) -> ConfigResult<()> {
        self.inner.reloadable.reload()
    }

    /// Every property of the current snapshot.
    pub fn all_properties(&self) -> ConfigResult<PropertySet> {
        Ok(self.snapshot()?.properties().clone())
    }

    /// Read `key` as `T`.
    pub fn get_property<T: Bind>(&self, key: &str) -> ConfigResult<T> {
        let reader = self.reader()?;
        T::bind(&reader, key)
    }

    /// Read `key` as `T`, parsing `default` if the key is absent.
    pub fn get_property_or<T: Bind>(&self, key: &str, default: &str) -> ConfigResult<T> {
        let reader = self.reader()?;
        T::bind_or_default(&reader, key, default)
    }

    /// Register a parser for `T`, overriding its built-in parsing.
    pub fn register_parser<T, F>(&self, parser: F)
    where
        T: std::any::Any + Send,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        self.inner.parsers.register(parser);
    }

    /// The accessor table of `S`: name, key, strategy and default per accessor.
    pub fn describe<S: Schema>(&self) -> Vec<AccessorInfo> {
        S::describe()
    }

    /// Bind schema `S` at `prefix` and validate it eagerly.
    ///
    /// The returned object re-reads the current snapshot on every accessor
    /// call; it is a view, not a copy.
    pub fn bind<S: Schema>(&self, prefix: &str) -> ConfigResult<S> {
        let reader = self.reader()?;
        self.bind_in(&reader, prefix)
    }

    /// Bind schema `S` at `prefix`, validating against `reader`'s snapshot.
    ///
    /// Nested and mapped schemas bind through here so that one read checks
    /// one snapshot, even if a reload publishes while it runs.
    pub fn bind_in<S: Schema>(&self, reader: &Reader<'_>, prefix: &str) -> ConfigResult<S> {
        if prefix.split('.').count() > MAX_BIND_DEPTH {
            return Err(ConfigError::Misconfigured(format!(
                "{} bound deeper than {} levels at {:?}; is the schema recursive?",
                S::NAME,
                MAX_BIND_DEPTH,
                prefix
            )));
        }

        let id = self.inner.next_binding.fetch_add(1, Ordering::Relaxed);
        let bound = S::from_binding(SchemaBinding::new(self.clone(), prefix, id));
        validation::validate(&bound, reader)?;
        tracing::debug!(
            schema = S::NAME,
            prefix = %prefix,
            binding = id,
            generation = reader.snapshot().generation(),
            "Schema bound"
        );
        Ok(bound)
    }
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("environment", &self.inner.environment)
            .field("cache", &self.inner.cache)
            .field("strategy", &self.inner.strategy)
            .finish()
    }
}
