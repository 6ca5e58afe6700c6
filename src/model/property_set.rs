//! Flat dotted-key property map.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use serde::Serialize;

/// Join a prefix and a child name with a dot. An empty prefix means the root.
pub fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// A flat mapping from dotted key (`a.b.c`) to string value.
///
/// Backed by a `BTreeMap` so iteration order, and therefore every resolver
/// that emits keys from other keys, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertySet {
    entries: BTreeMap<String, String>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries strictly below `prefix`, yielded as `(rest, value)` where the
    /// full key is `prefix.rest`. An empty prefix yields every entry.
    /// The borrow of `prefix` ends when this returns.
    pub fn subtree<'a>(&'a self, prefix: &str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let lower = if prefix.is_empty() { String::new() } else { format!("{}.", prefix) };
        let skip = lower.len();
        self.entries
            .range(lower.clone()..)
            .take_while(move |(k, _)| k.starts_with(&lower))
            .map(move |(k, v)| (&k[skip..], v.as_str()))
            .filter(|(rest, _)| !rest.is_empty())
    }

    /// True if the key itself or anything below it is present.
    pub fn has_path(&self, prefix: &str) -> bool {
        self.contains_key(prefix) || self.subtree(prefix).next().is_some()
    }

    /// Distinct, non-empty first path segments of every key below `prefix`.
    pub fn child_segments(&self, prefix: &str) -> BTreeSet<&str> {
        self.subtree(prefix)
            .filter_map(|(rest, _)| rest.split('.').next())
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Overlay `newer` on top of `self`: matching keys take the newer value,
    /// keys only present in `self` are retained.
    pub fn merged_with(&self, newer: &PropertySet) -> PropertySet {
        let mut merged = self.clone();
        merged.extend(newer.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertySet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.entries.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for PropertySet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PropertySet {
        [
            ("ns.a", "1"),
            ("ns.b", "2"),
            ("ns.b.c", "3"),
            ("ns..x", "4"),
            ("nsx", "5"),
            ("other.x", "9"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("", "a"), "a");
        assert_eq!(join_key("a", "b"), "a.b");
        assert_eq!(join_key("a", ""), "a");
    }

    #[test]
    fn test_subtree_excludes_sibling_prefixes() {
        let props = sample();
        let rest: Vec<_> = props.subtree("ns").map(|(r, _)| r).collect();
        assert_eq!(rest, vec![".x", "a", "b", "b.c"]);
        assert!(props.has_path("ns.b"));
        assert!(!props.has_path("missing"));
    }

    #[test]
    fn test_child_segments_skip_empty() {
        let props = sample();
        let children: Vec<_> = props.child_segments("ns").into_iter().collect();
        assert_eq!(children, vec!["a", "b"]);
    }

    #[test]
    fn test_child_segments_outlive_prefix() {
        let props = sample();
        let children = {
            let prefix = String::from("ns");
            props.child_segments(&prefix)
        };
        assert_eq!(children.len(), 2);
        assert!(children.contains("b"));
    }

    #[test]
    fn test_merge_retains_old_keys() {
        let old: PropertySet = [("a", "1"), ("b", "2")].into_iter().collect();
        let new: PropertySet = [("b", "20"), ("c", "30")].into_iter().collect();
        let merged = old.merged_with(&new);
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("20"));
        assert_eq!(merged.get("c"), Some("30"));
    }
}
