//! Core data model.
//!
//! # Data Flow
//! ```text
//! ConfigSource::fetch(Environment) → PropertySet (fresh per fetch)
//!     → resolver::Pipeline → PropertySet
//!     → Snapshot { properties, generation } (published once per reload)
//! ```
//!
//! # Design Decisions
//! - Keys are unique dotted paths; hierarchy is purely lexical
//! - Snapshots are shared as `Arc<Snapshot>` and never mutated after publish
//! - `Environment` is a cheap-to-clone immutable name

pub mod environment;
pub mod property_set;
pub mod snapshot;

pub use environment::Environment;
pub use property_set::{join_key, PropertySet};
pub use snapshot::Snapshot;
