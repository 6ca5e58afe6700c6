//! Error taxonomy shared by every stage of the provider.
//!
//! Errors raised by resolvers and scalar access travel through the binding
//! engine unchanged; only `Option<T>` accessors absorb [`ConfigError::NotFound`].

use thiserror::Error;

/// Errors that can occur while fetching, resolving, caching or binding configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The backend has no configuration for the requested environment.
    #[error("Environment not found upstream: {environment:?}")]
    EnvironmentNotFound { environment: String },

    /// Nothing has been loaded for the environment yet (strict cache).
    #[error("No configuration loaded for environment {environment:?}")]
    NoEnvironment { environment: String },

    /// Transient backend failure (I/O, network).
    #[error("Communication failure: {0}")]
    CommunicationFailure(String),

    /// Programmer or setup error.
    #[error("Misconfigured: {0}")]
    Misconfigured(String),

    /// Backend returned data that could not be parsed into properties.
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// Key is absent from the current snapshot.
    #[error("Property not found: {key}")]
    NotFound { key: String },

    /// Key is present but its value cannot be parsed into the requested shape.
    #[error("Property {key} = {value:?} is not a valid {expected}: {reason}")]
    TypeMismatch {
        key: String,
        value: String,
        expected: &'static str,
        reason: String,
    },

    /// A resolver stage could not substitute or locate a referenced value.
    #[error("Unresolvable: {0}")]
    Unresolvable(String),

    /// Two equally specific tagged keys collapse onto the same key.
    #[error("Ambiguous match for {key}: {candidates:?}")]
    AmbiguousMatch { key: String, candidates: Vec<String> },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::NotFound`].
    pub fn not_found(key: impl Into<String>) -> Self {
        ConfigError::NotFound { key: key.into() }
    }

    /// True only for [`ConfigError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(ConfigError::not_found("a.b").is_not_found());
        assert!(!ConfigError::Unresolvable("x".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::TypeMismatch {
            key: "server.port".into(),
            value: "eighty".into(),
            expected: "u16",
            reason: "invalid digit found in string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("server.port"));
        assert!(msg.contains("u16"));

        let err = ConfigError::NoEnvironment { environment: "us-west-1".into() };
        assert_eq!(err.to_string(), "No configuration loaded for environment \"us-west-1\"");
    }
}
