//! Snapshot cache and reload.
//!
//! # Data Flow
//! ```text
//! reload(environment):
//!     ConfigSource::fetch(environment)        (no lock held)
//!     → Pipeline::resolve
//!     → publish lock: [merge with previous (resilient)] → new Arc<Snapshot>
//!     → atomic swap of the environment map
//!
//! read(environment):
//!     ArcSwap::load → Arc<Snapshot>          (lock-free, one load per call)
//! ```
//!
//! # Design Decisions
//! - Strict mode: reads before the first load fail with `NoEnvironment`; reload
//!   errors propagate and leave the previous snapshot in place
//! - Resilient mode: reads fall back to an empty generation-0 snapshot; reload
//!   errors are logged and swallowed; new fetches are merged over the old snapshot
//! - Fetches may run concurrently; the publish step is serialized so a merge
//!   always sees one consistent previous snapshot

pub mod snapshot_cache;

pub use snapshot_cache::{CacheMode, EnvironmentReloader, SnapshotCache};
