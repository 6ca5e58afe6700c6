//! Provider assembly.

use std::sync::Arc;
use std::time::Duration;

use crate::binding::ConfigProvider;
use crate::cache::{CacheMode, SnapshotCache};
use crate::error::{ConfigError, ConfigResult};
use crate::model::Environment;
use crate::reload::{
    FileWatchReloadStrategy, ImmediateReloadStrategy, PeriodicalReloadStrategy, ReloadStrategy,
};
use crate::resolver::{
    ExtendsResolver, LinkResolver, Pipeline, PlaceholderResolver, Resolver, TagResolver,
};
use crate::settings::schema::{ProviderSettings, ReloadKind, ResolverKind};
use crate::source::{ConfigSource, FileSource};

/// Wires a source, resolver pipeline, cache and reload strategy into a
/// [`ConfigProvider`].
///
/// ```no_run
/// use livecfg::settings::ProviderBuilder;
/// use livecfg::source::InMemorySource;
/// use livecfg::reload::ImmediateReloadStrategy;
///
/// let provider = ProviderBuilder::new()
///     .with_source(InMemorySource::new())
///     .with_reload_strategy(ImmediateReloadStrategy)
///     .build()?;
/// # Ok::<(), livecfg::ConfigError>(())
/// ```
#[derive(Default)]
pub struct ProviderBuilder {
    source: Option<Arc<dyn ConfigSource>>,
    pipeline: Pipeline,
    strategy: Option<Arc<dyn ReloadStrategy>>,
    mode: CacheMode,
    environment: Environment,
    metrics: bool,
}

impl ProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, source: impl ConfigSource + 'static) -> Self {
        self.with_shared_source(Arc::new(source))
    }

    /// Use a source the caller keeps a handle to (e.g. to mutate it in tests).
    pub fn with_shared_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Append one resolver stage.
    pub fn with_resolver(mut self, stage: impl Resolver + 'static) -> Self {
        self.pipeline = self.pipeline.then(stage);
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_reload_strategy(self, strategy: impl ReloadStrategy + 'static) -> Self {
        self.with_shared_reload_strategy(Arc::new(strategy))
    }

    pub fn with_shared_reload_strategy(mut self, strategy: Arc<dyn ReloadStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<Environment>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics = enabled;
        self
    }

    /// Map a settings file onto a builder. Relative paths in `settings` are
    /// taken as-is; [`load_settings`](crate::settings::load_settings) already
    /// anchors them to the settings file.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let environment = Environment::new(settings.environment.as_str());
        let source = FileSource::new(settings.source.root.clone(), settings.source.files.clone());

        let mut pipeline = Pipeline::default();
        for kind in &settings.resolvers {
            pipeline = match kind {
                ResolverKind::Placeholder => pipeline.then(PlaceholderResolver::system()),
                ResolverKind::Extends => pipeline.then(ExtendsResolver),
                ResolverKind::Link => pipeline.then(LinkResolver),
                ResolverKind::Tags => {
                    pipeline.then(TagResolver::new(settings.tags.iter().cloned()))
                }
            };
        }

        let strategy: Option<Arc<dyn ReloadStrategy>> = match settings.reload.strategy {
            ReloadKind::None => None,
            ReloadKind::Immediate => Some(Arc::new(ImmediateReloadStrategy)),
            ReloadKind::Periodic => Some(Arc::new(PeriodicalReloadStrategy::new(Duration::from_secs(
                settings.reload.interval_secs,
            )))),
            ReloadKind::OnChange => Some(Arc::new(FileWatchReloadStrategy::new(vec![
                source.environment_dir(&environment),
            ]))),
        };

        let mut builder = Self::new()
            .with_source(source)
            .with_pipeline(pipeline)
            .with_mode(settings.mode)
            .with_environment(environment)
            .with_metrics(settings.metrics);
        builder.strategy = strategy;
        builder
    }

    /// Initialize the source and create the provider. A reload strategy, if
    /// set, performs the first load here.
    pub fn build(self) -> ConfigResult<ConfigProvider> {
        let source = self
            .source
            .ok_or_else(|| ConfigError::Misconfigured("no configuration source set".into()))?;
        source.init()?;

        tracing::info!(
            environment = %self.environment,
            mode = ?self.mode,
            stages = ?self.pipeline.stage_names(),
            "Building configuration provider"
        );

        let cache = SnapshotCache::new(source, self.pipeline, self.mode).with_metrics(self.metrics);
        ConfigProvider::new(Arc::new(cache), self.environment, self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertySet;
    use crate::settings::schema::{ReloadSettings, SourceSettings};
    use crate::source::InMemorySource;
    use std::fs;

    #[test]
    fn test_build_requires_source() {
        let err = ProviderBuilder::new().build().unwrap_err();
        assert!(matches!(err, ConfigError::Misconfigured(_)));
    }

    #[test]
    fn test_without_strategy_nothing_is_loaded() {
        let source = InMemorySource::with_root([("a", "1")].into_iter().collect::<PropertySet>());
        let provider = ProviderBuilder::new().with_source(source).build().unwrap();

        let err = provider.get_property::<String>("a").unwrap_err();
        assert!(matches!(err, ConfigError::NoEnvironment { .. }));

        provider.reload().unwrap();
        assert_eq!(provider.get_property::<String>("a").unwrap(), "1");
    }

    #[test]
    fn test_from_settings_builds_file_provider() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("dev");
        fs::create_dir(&env_dir).unwrap();
        fs::write(
            env_dir.join("application.toml"),
            concat!(
                "[server]\nport = 8080\nhost = \"example.com\"\nalias = \"${server.port}\"\n\n",
                "[server.\"$eu\"]\nhost = \"eu.example.com\"\n",
            ),
        )
        .unwrap();

        let settings = ProviderSettings {
            environment: "dev".into(),
            resolvers: vec![ResolverKind::Tags],
            tags: vec!["eu".into()],
            reload: ReloadSettings {
                strategy: ReloadKind::Immediate,
                interval_secs: 30,
            },
            source: SourceSettings {
                root: dir.path().to_path_buf(),
                files: vec!["application.toml".into()],
            },
            ..ProviderSettings::default()
        };

        let provider = ProviderBuilder::from_settings(&settings).build().unwrap();
        assert_eq!(provider.get_property::<u16>("server.port").unwrap(), 8080);
        assert_eq!(provider.get_property::<String>("server.host").unwrap(), "eu.example.com");
        // Placeholder stage not configured: text stays literal.
        assert_eq!(provider.get_property::<String>("server.alias").unwrap(), "${server.port}");
    }

    #[test]
    fn test_omitted_resolvers_mean_no_stages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("application.toml"), "home = \"${HOME}\"\n").unwrap();

        let settings: ProviderSettings = toml::from_str("").unwrap();
        let settings = ProviderSettings {
            source: SourceSettings {
                root: dir.path().to_path_buf(),
                files: vec!["application.toml".into()],
            },
            ..settings
        };

        let provider = ProviderBuilder::from_settings(&settings).build().unwrap();
        assert_eq!(provider.get_property::<String>("home").unwrap(), "${HOME}");
    }

    #[test]
    fn test_from_settings_missing_environment_is_strict_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            environment: "prod".into(),
            source: SourceSettings {
                root: dir.path().to_path_buf(),
                files: vec!["application.toml".into()],
            },
            ..ProviderSettings::default()
        };

        let err = ProviderBuilder::from_settings(&settings).build().unwrap_err();
        assert!(matches!(err, ConfigError::EnvironmentNotFound { .. }));
    }
}
