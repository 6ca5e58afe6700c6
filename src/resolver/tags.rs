//! `$tag` path filtering.
//!
//! Tag tokens are whole path segments starting with `$`. With active tags `T`:
//! - untagged keys pass through unchanged
//! - keys whose tags are all in `T` are kept with the tag segments stripped
//! - keys carrying any tag outside `T` are dropped
//!
//! When stripped keys collide, the candidate with strictly more matched tags
//! wins. Candidates tied at the highest count are an `AmbiguousMatch` unless
//! they carry the same value.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ConfigError, ConfigResult};
use crate::model::PropertySet;
use crate::resolver::Resolver;

/// One original key competing for a stripped key.
struct Candidate<'a> {
    original: &'a str,
    matched: usize,
    value: &'a str,
}

/// Filters and strips tagged keys against an active tag set.
#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    active: BTreeSet<String>,
}

impl TagResolver {
    pub fn new<I, S>(active: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: active.into_iter().map(Into::into).collect(),
        }
    }

    pub fn active_tags(&self) -> &BTreeSet<String> {
        &self.active
    }

    /// Stripped key and matched tag count, or `None` if the key is filtered out.
    fn classify(&self, key: &str) -> Option<(String, usize)> {
        let mut plain = Vec::new();
        let mut matched = 0;
        for segment in key.split('.') {
            match segment.strip_prefix('$') {
                Some(tag) if !tag.is_empty() => {
                    if !self.active.contains(tag) {
                        return None;
                    }
                    matched += 1;
                }
                _ => plain.push(segment),
            }
        }
        Some((plain.join("."), matched))
    }
}

impl Resolver for TagResolver {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn resolve(&self, properties: &PropertySet) -> ConfigResult<PropertySet> {
        let mut groups: BTreeMap<String, Vec<Candidate<'_>>> = BTreeMap::new();
        for (key, value) in properties.iter() {
            let Some((stripped, matched)) = self.classify(key) else {
                continue;
            };
            if stripped.is_empty() {
                tracing::debug!(key = %key, "Dropping key made only of tags");
                continue;
            }
            groups.entry(stripped).or_default().push(Candidate {
                original: key,
                matched,
                value,
            });
        }

        let mut resolved = PropertySet::new();
        for (key, candidates) in groups {
            let best = candidates.iter().map(|c| c.matched).max().unwrap_or(0);
            let top: Vec<&Candidate<'_>> =
                candidates.iter().filter(|c| c.matched == best).collect();
            let winner = top[0];
            if top.iter().any(|c| c.value != winner.value) {
                return Err(ConfigError::AmbiguousMatch {
                    key,
                    candidates: top.iter().map(|c| c.original.to_string()).collect(),
                });
            }
            resolved.insert(key, winner.value);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_and_strip() {
        let props: PropertySet = [
            ("a.$dev1.b", "1"),
            ("$dev1.c", "2"),
            ("$dev2.c", "22"),
            ("$dev1.d.$us", "3"),
            ("$dev1.d.$eu", "33"),
        ]
        .into_iter()
        .collect();
        let out = TagResolver::new(["dev1", "us"]).resolve(&props).unwrap();
        let expected: PropertySet = [("a.b", "1"), ("c", "2"), ("d", "3")].into_iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_more_specific_wins() {
        let props: PropertySet =
            [("timeout", "10"), ("$prod.timeout", "20"), ("$prod.$eu.timeout", "30")]
                .into_iter()
                .collect();

        let out = TagResolver::new(["prod", "eu"]).resolve(&props).unwrap();
        assert_eq!(out.get("timeout"), Some("30"));

        let out = TagResolver::new(["prod"]).resolve(&props).unwrap();
        assert_eq!(out.get("timeout"), Some("20"));

        let out = TagResolver::new(Vec::<String>::new()).resolve(&props).unwrap();
        assert_eq!(out.get("timeout"), Some("10"));
    }

    #[test]
    fn test_equal_specificity_disjoint_tags_is_ambiguous() {
        let props: PropertySet = [("$us.limit", "1"), ("$beta.limit", "2")].into_iter().collect();
        let err = TagResolver::new(["us", "beta"]).resolve(&props).unwrap_err();
        match err {
            ConfigError::AmbiguousMatch { key, candidates } => {
                assert_eq!(key, "limit");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_equal_specificity_same_value_is_fine() {
        let props: PropertySet = [("$us.limit", "1"), ("$beta.limit", "1")].into_iter().collect();
        let out = TagResolver::new(["us", "beta"]).resolve(&props).unwrap();
        assert_eq!(out.get("limit"), Some("1"));
    }

    #[test]
    fn test_lone_dollar_segment_is_not_a_tag() {
        let props: PropertySet = [("price.$", "5")].into_iter().collect();
        let out = TagResolver::new(["x"]).resolve(&props).unwrap();
        assert_eq!(out.get("price.$"), Some("5"));
    }
}
