//! Settings loading from disk.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::settings::schema::ProviderSettings;
use crate::settings::validation::validate_settings;

/// Load and validate settings from a TOML file.
///
/// Relative `source.root` paths are resolved against the settings file's
/// directory.
pub fn load_settings(path: &Path) -> ConfigResult<ProviderSettings> {
    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::Misconfigured(format!("cannot read settings {}: {}", path.display(), e))
    })?;
    let mut settings: ProviderSettings = toml::from_str(&content).map_err(|e| {
        ConfigError::Misconfigured(format!("cannot parse settings {}: {}", path.display(), e))
    })?;

    validate_settings(&settings).map_err(|errors| {
        let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        ConfigError::Misconfigured(format!("invalid settings {}: {}", path.display(), joined))
    })?;

    if settings.source.root.is_relative() {
        if let Some(dir) = path.parent() {
            settings.source.root = dir.join(&settings.source.root);
        }
    }

    tracing::debug!(path = %path.display(), environment = %settings.environment, "Settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_resolves_relative_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livecfg.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "environment = \"dev\"\n[source]\nroot = \"conf\"\nfiles = [\"a.toml\"]"
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.environment, "dev");
        assert_eq!(settings.source.root, dir.path().join("conf"));
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livecfg.toml");
        fs::write(&path, "tags = [\"\"]\n[source]\nfiles = []\n").unwrap();

        let err = load_settings(&path).unwrap_err();
        let ConfigError::Misconfigured(msg) = err else { panic!("unexpected error") };
        assert!(msg.contains("at least one file"));
        assert!(msg.contains("blank"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings(Path::new("/nonexistent/livecfg.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Misconfigured(_)));
    }
}
