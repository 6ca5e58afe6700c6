//! `${name}` substitution from an external lookup.
//!
//! Tokens are looked up in an external source (process environment variables
//! by default), never in the property set being resolved. Substituted text is
//! not rescanned. An unterminated `${` is left as literal text.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::model::PropertySet;
use crate::resolver::Resolver;

/// External values placeholders are resolved against.
pub trait PlaceholderLookup: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentVariables;

impl PlaceholderLookup for EnvironmentVariables {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl PlaceholderLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl PlaceholderLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Replaces every `${name}` token in keys and values.
#[derive(Clone)]
pub struct PlaceholderResolver {
    lookup: Arc<dyn PlaceholderLookup>,
}

impl PlaceholderResolver {
    pub fn new(lookup: impl PlaceholderLookup + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    /// Resolver backed by process environment variables.
    pub fn system() -> Self {
        Self::new(EnvironmentVariables)
    }

    fn substitute(&self, text: &str) -> ConfigResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            let name = &after[..end];
            let value = if name.is_empty() {
                None
            } else {
                self.lookup.lookup(name)
            };
            let value = value.ok_or_else(|| {
                ConfigError::Unresolvable(format!(
                    "no value for placeholder ${{{}}} in {:?}",
                    name, text
                ))
            })?;
            out.push_str(&rest[..start]);
            out.push_str(&value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl Resolver for PlaceholderResolver {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn resolve(&self, properties: &PropertySet) -> ConfigResult<PropertySet> {
        let mut resolved = PropertySet::new();
        let mut origins: HashMap<String, &str> = HashMap::new();
        for (key, value) in properties.iter() {
            let new_key = self.substitute(key)?;
            let new_value = self.substitute(value)?;
            if let Some(previous) = origins.insert(new_key.clone(), key) {
                return Err(ConfigError::AmbiguousMatch {
                    key: new_key,
                    candidates: vec![previous.to_string(), key.to_string()],
                });
            }
            resolved.insert(new_key, new_value);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlaceholderResolver {
        let lookup: HashMap<String, String> =
            [("HOST", "db.local"), ("PORT", "5432"), ("REGION", "eu")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        PlaceholderResolver::new(lookup)
    }

    #[test]
    fn test_replaces_all_tokens_in_keys_and_values() {
        let props: PropertySet = [("db.url", "pg://${HOST}:${PORT}/app"), ("${REGION}.zone", "a")]
            .into_iter()
            .collect();
        let out = resolver().resolve(&props).unwrap();
        assert_eq!(out.get("db.url"), Some("pg://db.local:5432/app"));
        assert_eq!(out.get("eu.zone"), Some("a"));
        assert_eq!(props.get("db.url"), Some("pg://${HOST}:${PORT}/app"));
    }

    #[test]
    fn test_unknown_token_is_error() {
        let props: PropertySet = [("a", "${NOPE}")].into_iter().collect();
        assert!(matches!(resolver().resolve(&props), Err(ConfigError::Unresolvable(_))));

        let props: PropertySet = [("a", "${}")].into_iter().collect();
        assert!(matches!(resolver().resolve(&props), Err(ConfigError::Unresolvable(_))));
    }

    #[test]
    fn test_does_not_read_own_properties() {
        let props: PropertySet = [("NAME", "x"), ("a", "${NAME}")].into_iter().collect();
        assert!(resolver().resolve(&props).is_err());
    }

    #[test]
    fn test_unterminated_is_literal() {
        let props: PropertySet = [("a", "cost: ${HOST")].into_iter().collect();
        let out = resolver().resolve(&props).unwrap();
        assert_eq!(out.get("a"), Some("cost: ${HOST"));
    }

    #[test]
    fn test_key_collision_is_ambiguous() {
        let props: PropertySet = [("eu.zone", "1"), ("${REGION}.zone", "2")].into_iter().collect();
        assert!(matches!(resolver().resolve(&props), Err(ConfigError::AmbiguousMatch { .. })));
    }
}
