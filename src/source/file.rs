//! Directory-backed source.
//!
//! Layout: `<root>/<environment>/<file>` for each configured file; the root
//! environment reads `<root>/<file>`. Files are merged in order, so later files
//! override earlier ones.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Environment, PropertySet};
use crate::source::format::Format;
use crate::source::ConfigSource;

/// Source reading TOML/JSON/properties files from an environment directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the files for `environment`.
    pub fn environment_dir(&self, environment: &Environment) -> PathBuf {
        if environment.is_root() {
            self.root.clone()
        } else {
            self.root.join(environment.name())
        }
    }

    fn format_of(path: &Path) -> ConfigResult<Format> {
        Format::from_path(path).ok_or_else(|| {
            ConfigError::Misconfigured(format!(
                "unsupported configuration file type: {}",
                path.display()
            ))
        })
    }
}

impl ConfigSource for FileSource {
    fn init(&self) -> ConfigResult<()> {
        if self.files.is_empty() {
            return Err(ConfigError::Misconfigured("file source needs at least one file".into()));
        }
        for file in &self.files {
            Self::format_of(file)?;
        }
        if !self.root.is_dir() {
            return Err(ConfigError::Misconfigured(format!(
                "configuration root is not a directory: {}",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn fetch(&self, environment: &Environment) -> ConfigResult<PropertySet> {
        let dir = self.environment_dir(environment);
        if !dir.is_dir() {
            return Err(ConfigError::EnvironmentNotFound {
                environment: environment.name().to_string(),
            });
        }

        let mut props = PropertySet::new();
        for file in &self.files {
            let path = dir.join(file);
            let format = Self::format_of(&path)?;
            let text = fs::read_to_string(&path).map_err(|e| {
                ConfigError::CommunicationFailure(format!("{}: {}", path.display(), e))
            })?;
            let parsed = format.parse(&text).map_err(|e| match e {
                ConfigError::Malformed(msg) => {
                    ConfigError::Malformed(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })?;
            tracing::debug!(
                path = %path.display(),
                keys = parsed.len(),
                "Loaded configuration file"
            );
            props.extend(parsed);
        }
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_merges_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("dev");
        fs::create_dir(&env_dir).unwrap();
        fs::write(env_dir.join("base.toml"), "a = 1\nb = 2\n").unwrap();
        fs::write(env_dir.join("override.properties"), "b=20\n").unwrap();

        let source = FileSource::new(
            dir.path(),
            vec!["base.toml".into(), "override.properties".into()],
        );
        source.init().unwrap();

        let props = source.fetch(&Environment::new("dev")).unwrap();
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("20"));
    }

    #[test]
    fn test_error_kinds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.json"), "{ not json").unwrap();

        let source = FileSource::new(dir.path(), vec!["app.json".into()]);
        assert!(matches!(
            source.fetch(&Environment::new("absent")),
            Err(ConfigError::EnvironmentNotFound { .. })
        ));
        assert!(matches!(source.fetch(&Environment::default()), Err(ConfigError::Malformed(_))));

        let missing = FileSource::new(dir.path(), vec!["missing.toml".into()]);
        assert!(matches!(
            missing.fetch(&Environment::default()),
            Err(ConfigError::CommunicationFailure(_))
        ));

        let bad_ext = FileSource::new(dir.path(), vec!["app.yaml".into()]);
        assert!(matches!(bad_ext.init(), Err(ConfigError::Misconfigured(_))));
    }
}
