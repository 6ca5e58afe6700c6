//! Immutable published configuration.

use crate::model::PropertySet;

/// A resolved property set plus the generation it was published as.
///
/// Once wrapped in an `Arc` and published, a snapshot is never mutated; a
/// reload publishes a new one in its place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    properties: PropertySet,
    generation: u64,
}

impl Snapshot {
    pub fn new(properties: PropertySet, generation: u64) -> Self {
        Self { properties, generation }
    }

    /// The generation-0 snapshot a resilient cache is seeded with.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }
}
