//! `x.^extends = p` namespace inheritance.
//!
//! Every key under `p` (and `p` itself) is copied into `x`, unless `x` already
//! defines it. The control key is removed. Namespaces are resolved once the
//! namespaces they depend on are, so `x` sees whatever `p` inherited itself.

use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{join_key, PropertySet};
use crate::resolver::Resolver;

const EXTENDS: &str = "^extends";

fn is_control(relative: &str) -> bool {
    relative == EXTENDS || relative.rsplit('.').next() == Some(EXTENDS)
}

/// Namespace a control key applies to; `None` if `key` is not a control key.
fn namespace_of(key: &str) -> Option<&str> {
    if key == EXTENDS {
        return Some("");
    }
    key.strip_suffix(EXTENDS)?.strip_suffix('.')
}

/// Resolves `^extends` control keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendsResolver;

impl ExtendsResolver {
    /// True if `path`'s subtree has control keys other than `own`.
    fn has_controls(props: &PropertySet, path: &str, own: Option<&str>) -> bool {
        props
            .subtree(path)
            .any(|(rest, _)| is_control(rest) && Some(rest) != own)
    }

    fn apply(props: &mut PropertySet, namespace: &str, parent: &str) -> ConfigResult<()> {
        if !props.has_path(parent) {
            return Err(ConfigError::Unresolvable(format!(
                "{} extends {} which does not exist",
                namespace, parent
            )));
        }

        let explicit: HashSet<String> = props
            .subtree(namespace)
            .map(|(rest, _)| rest.to_string())
            .collect();
        let mut copies: Vec<(String, String)> = props
            .subtree(parent)
            .filter(|(rest, _)| !explicit.contains(*rest))
            .map(|(rest, v)| (join_key(namespace, rest), v.to_string()))
            .collect();
        if let Some(value) = props.get(parent) {
            if !props.contains_key(namespace) {
                copies.push((namespace.to_string(), value.to_string()));
            }
        }

        props.remove(&join_key(namespace, EXTENDS));
        props.extend(copies);
        Ok(())
    }
}

impl Resolver for ExtendsResolver {
    fn name(&self) -> &'static str {
        "extends"
    }

    fn resolve(&self, properties: &PropertySet) -> ConfigResult<PropertySet> {
        let mut out = properties.clone();
        loop {
            let mut pending = Vec::new();
            for (key, parent) in out.iter() {
                let Some(namespace) = namespace_of(key) else {
                    continue;
                };
                if namespace.is_empty() {
                    return Err(ConfigError::Unresolvable(format!(
                        "{} needs a namespace to extend into",
                        key
                    )));
                }
                pending.push((namespace.to_string(), parent.trim().to_string()));
            }
            if pending.is_empty() {
                return Ok(out);
            }

            let mut progressed = false;
            for (namespace, parent) in &pending {
                if Self::has_controls(&out, parent, None)
                    || Self::has_controls(&out, namespace, Some(EXTENDS))
                {
                    continue;
                }
                Self::apply(&mut out, namespace, parent)?;
                progressed = true;
            }

            if !progressed {
                let namespaces: Vec<&str> = pending.iter().map(|(n, _)| n.as_str()).collect();
                return Err(ConfigError::Unresolvable(format!(
                    "cyclic ^extends between namespaces {:?}",
                    namespaces
                )));
            }
        }
    }
}
