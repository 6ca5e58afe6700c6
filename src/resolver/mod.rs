//! Property-resolution pipeline.
//!
//! # Data Flow
//! ```text
//! fetched PropertySet
//!     → stage 1 (e.g. placeholder.rs: ${name} substitution)
//!     → stage 2 (e.g. extends.rs: x.^extends = p inheritance)
//!     → stage 3 (e.g. link.rs: $link(p) cross-key copies)
//!     → stage 4 (e.g. tags.rs: $tag path filtering)
//!     → PropertySet handed to the cache
//! ```
//!
//! # Design Decisions
//! - Every stage sees the whole set, since stages cross-reference keys
//! - Stages borrow their input and build a new set; they never mutate it
//! - Order is whatever the caller configured; there is no implicit default
//! - The first failing stage aborts the pipeline with its error unchanged

pub mod extends;
pub mod link;
pub mod placeholder;
pub mod tags;

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigResult;
use crate::model::PropertySet;

pub use extends::ExtendsResolver;
pub use link::LinkResolver;
pub use placeholder::{EnvironmentVariables, PlaceholderLookup, PlaceholderResolver};
pub use tags::TagResolver;

/// A pure transformation over a whole property set.
pub trait Resolver: Send + Sync {
    /// Short stage name used in logs.
    fn name(&self) -> &'static str;

    fn resolve(&self, properties: &PropertySet) -> ConfigResult<PropertySet>;
}

/// An explicitly ordered chain of resolver stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Resolver>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Resolver>>) -> Self {
        Self { stages }
    }

    /// Append a stage; it will see the output of every stage before it.
    pub fn then(mut self, stage: impl Resolver + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order.
    pub fn resolve(&self, properties: PropertySet) -> ConfigResult<PropertySet> {
        let mut current = properties;
        for stage in &self.stages {
            current = stage.resolve(&current).map_err(|e| {
                tracing::debug!(stage = stage.name(), error = %e, "Resolver stage failed");
                e
            })?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stage_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_order_matters() {
        let raw: PropertySet = [("base.$dev.a", "1"), ("x.^extends", "base")].into_iter().collect();

        // Tags first: base.a exists by the time extends runs.
        let tags_first = Pipeline::default()
            .then(TagResolver::new(["dev"]))
            .then(ExtendsResolver);
        let out = tags_first.resolve(raw.clone()).unwrap();
        assert_eq!(out.get("x.a"), Some("1"));

        // Extends first: the tagged key is copied with its tag, then stripped.
        let extends_first = Pipeline::default()
            .then(ExtendsResolver)
            .then(TagResolver::new(["dev"]));
        let out = extends_first.resolve(raw).unwrap();
        assert_eq!(out.get("x.a"), Some("1"));
        assert_eq!(out.get("base.a"), Some("1"));
    }

    #[test]
    fn test_failure_aborts() {
        let lookup: HashMap<String, String> = HashMap::new();
        let pipeline = Pipeline::default()
            .then(PlaceholderResolver::new(lookup))
            .then(TagResolver::new(Vec::<String>::new()));
        let raw: PropertySet = [("a", "${missing}")].into_iter().collect();
        assert!(pipeline.resolve(raw).is_err());
        assert_eq!(pipeline.stage_names(), vec!["placeholder", "tags"]);
    }
}
