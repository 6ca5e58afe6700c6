//! Settings file schema.
//!
//! Describes how a provider is assembled: which environment, which backend
//! files, which resolver stages, and how reloads are scheduled. All types
//! derive Serde traits for deserialization from a TOML file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::CacheMode;

/// Root settings for one `ConfigProvider`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Environment name. Empty selects the root scope.
    pub environment: String,

    /// Cache failure mode.
    pub mode: CacheMode,

    /// Resolver stages, applied in this order. Absent means no stages.
    pub resolvers: Vec<ResolverKind>,

    /// Active tags for the tag stage.
    pub tags: Vec<String>,

    /// Record `metrics` counters and histograms.
    pub metrics: bool,

    pub reload: ReloadSettings,

    pub source: SourceSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            environment: String::new(),
            mode: CacheMode::Strict,
            resolvers: Vec::new(),
            tags: Vec::new(),
            metrics: false,
            reload: ReloadSettings::default(),
            source: SourceSettings::default(),
        }
    }
}

/// A resolver pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    Placeholder,
    Extends,
    Link,
    Tags,
}

/// When the cache is refreshed from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadKind {
    /// Never load; reads fail with `NoEnvironment` until a manual reload.
    None,
    /// Load once, at provider creation.
    #[default]
    Immediate,
    /// Load at creation, then on a fixed interval.
    Periodic,
    /// Load at creation, then whenever a source file changes.
    OnChange,
}

/// Reload schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadSettings {
    pub strategy: ReloadKind,

    /// Period for the `periodic` strategy, in seconds.
    pub interval_secs: u64,
}

impl Default for ReloadSettings {
    fn default() -> Self {
        Self {
            strategy: ReloadKind::Immediate,
            interval_secs: 30,
        }
    }
}

/// File-backed source location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Directory holding one sub-directory per environment.
    pub root: PathBuf,

    /// Files read from the environment directory, later ones overriding earlier.
    pub files: Vec<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("config"),
            files: vec![PathBuf::from("application.toml")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_settings_use_defaults() {
        let settings: ProviderSettings = toml::from_str("environment = \"staging\"").unwrap();
        assert_eq!(settings.environment, "staging");
        assert_eq!(settings.mode, CacheMode::Strict);
        assert!(settings.resolvers.is_empty());
        assert_eq!(settings.reload.strategy, ReloadKind::Immediate);
        assert_eq!(settings.source.files, vec![PathBuf::from("application.toml")]);
    }

    #[test]
    fn test_full_settings() {
        let text = r#"
            environment = "us-west-1"
            mode = "resilient"
            resolvers = ["placeholder", "tags"]
            tags = ["dev1", "us"]
            metrics = true

            [reload]
            strategy = "on_change"
            interval_secs = 5

            [source]
            root = "/etc/app"
            files = ["application.toml", "overrides.properties"]
        "#;
        let settings: ProviderSettings = toml::from_str(text).unwrap();
        assert_eq!(settings.mode, CacheMode::Resilient);
        assert_eq!(settings.resolvers, vec![ResolverKind::Placeholder, ResolverKind::Tags]);
        assert_eq!(settings.reload.strategy, ReloadKind::OnChange);
        assert_eq!(settings.source.files.len(), 2);
        assert!(settings.metrics);
    }

    #[test]
    fn test_unknown_resolver_rejected() {
        assert!(toml::from_str::<ProviderSettings>("resolvers = [\"magic\"]").is_err());
    }
}
