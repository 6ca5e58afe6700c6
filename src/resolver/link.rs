//! `$link(path)` cross-key references.
//!
//! A key whose value is exactly `$link(p)` receives the value at `p`, and every
//! `p.rest` is copied to `key.rest`. The originals under `p` are kept. Keys
//! already present under `key.*` keep their own values.
//!
//! Links whose target subtree still contains unresolved links are deferred
//! until that subtree is resolved, so chains resolve in dependency order and
//! cycles are reported instead of looping.

use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{join_key, PropertySet};
use crate::resolver::Resolver;

const LINK_OPEN: &str = "$link(";

/// Target path of a `$link(p)` value, if the value has that exact form.
pub fn link_target(value: &str) -> Option<&str> {
    let target = value.strip_prefix(LINK_OPEN)?.strip_suffix(')')?.trim();
    (!target.is_empty()).then_some(target)
}

/// Resolves `$link(p)` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkResolver;

impl LinkResolver {
    fn subtree_has_links(props: &PropertySet, path: &str) -> bool {
        props.get(path).and_then(link_target).is_some()
            || props.subtree(path).any(|(_, v)| link_target(v).is_some())
    }

    fn apply(props: &mut PropertySet, key: &str, target: &str) -> ConfigResult<()> {
        if !props.has_path(target) {
            return Err(ConfigError::Unresolvable(format!(
                "{} links to {} which matches nothing",
                key, target
            )));
        }

        let explicit: HashSet<String> =
            props.subtree(key).map(|(rest, _)| rest.to_string()).collect();
        let copies: Vec<(String, String)> = props
            .subtree(target)
            .filter(|(rest, _)| !explicit.contains(*rest))
            .map(|(rest, v)| (join_key(key, rest), v.to_string()))
            .collect();

        match props.get(target).map(str::to_string) {
            Some(value) => {
                props.insert(key, value);
            }
            None => {
                props.remove(key);
            }
        }
        props.extend(copies);
        Ok(())
    }
}

impl Resolver for LinkResolver {
    fn name(&self) -> &'static str {
        "link"
    }

    fn resolve(&self, properties: &PropertySet) -> ConfigResult<PropertySet> {
        let mut out = properties.clone();
        loop {
            let pending: Vec<(String, String)> = out
                .iter()
                .filter_map(|(k, v)| link_target(v).map(|t| (k.to_string(), t.to_string())))
                .collect();
            if pending.is_empty() {
                return Ok(out);
            }

            let mut progressed = false;
            for (key, target) in &pending {
                if Self::subtree_has_links(&out, target) {
                    continue;
                }
                Self::apply(&mut out, key, target)?;
                progressed = true;
            }

            if !progressed {
                let keys: Vec<&str> = pending.iter().map(|(k, _)| k.as_str()).collect();
                return Err(ConfigError::Unresolvable(format!(
                    "cyclic $link references: {:?}",
                    keys
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_copies_value_and_subtree() {
        let props: PropertySet =
            [("a", "$link(l.a)"), ("l.a", "1"), ("l.a.b", "2"), ("l.a.c.d", "3")]
                .into_iter()
                .collect();
        let out = LinkResolver.resolve(&props).unwrap();
        let expected: PropertySet = [
            ("a", "1"),
            ("a.b", "2"),
            ("a.c.d", "3"),
            ("l.a", "1"),
            ("l.a.b", "2"),
            ("l.a.c.d", "3"),
        ]
        .into_iter()
        .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_link_to_subtree_only() {
        let props: PropertySet = [("a", "$link(db)"), ("db.host", "h")].into_iter().collect();
        let out = LinkResolver.resolve(&props).unwrap();
        assert!(!out.contains_key("a"));
        assert_eq!(out.get("a.host"), Some("h"));
    }

    #[test]
    fn test_explicit_key_wins() {
        let props: PropertySet = [("a", "$link(l)"), ("a.x", "mine"), ("l.x", "theirs")]
            .into_iter()
            .collect();
        let out = LinkResolver.resolve(&props).unwrap();
        assert_eq!(out.get("a.x"), Some("mine"));
    }

    #[test]
    fn test_chained_links() {
        let props: PropertySet =
            [("a", "$link(b)"), ("b", "$link(c)"), ("c", "v")].into_iter().collect();
        let out = LinkResolver.resolve(&props).unwrap();
        assert_eq!(out.get("a"), Some("v"));
        assert_eq!(out.get("b"), Some("v"));
    }

    #[test]
    fn test_missing_target_and_cycles() {
        let props: PropertySet = [("a", "$link(nowhere)")].into_iter().collect();
        assert!(matches!(LinkResolver.resolve(&props), Err(ConfigError::Unresolvable(_))));

        let props: PropertySet = [("a", "$link(b)"), ("b", "$link(a)")].into_iter().collect();
        assert!(matches!(LinkResolver.resolve(&props), Err(ConfigError::Unresolvable(_))));
    }

    #[test]
    fn test_idempotent_once_resolved() {
        let props: PropertySet =
            [("a", "$link(l)"), ("l", "1"), ("l.b", "2")].into_iter().collect();
        let once = LinkResolver.resolve(&props).unwrap();
        let twice = LinkResolver.resolve(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_link_target_parsing() {
        assert_eq!(link_target("$link(a.b)"), Some("a.b"));
        assert_eq!(link_target("$link()"), None);
        assert_eq!(link_target("x $link(a)"), None);
    }
}
