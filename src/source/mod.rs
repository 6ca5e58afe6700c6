//! Backend sources.
//!
//! # Data Flow
//! ```text
//! ConfigSource::init()            (once, at provider build)
//! ConfigSource::fetch(environment)
//!     → PropertySet (flat, unresolved)
//!     → resolver pipeline
//! ```
//!
//! # Design Decisions
//! - Sources own their failure semantics and report only
//!   `EnvironmentNotFound`, `CommunicationFailure`, `Malformed` or `Misconfigured`
//! - `fetch` is the only place configuration I/O happens
//! - Credentials, when a connector needs them, are immutable constructor arguments

pub mod file;
pub mod format;
pub mod memory;

use crate::error::ConfigResult;
use crate::model::{Environment, PropertySet};

pub use file::FileSource;
pub use memory::InMemorySource;

/// A backend that can fetch a flat property set for an environment.
pub trait ConfigSource: Send + Sync {
    /// Idempotent setup; called before the first fetch.
    fn init(&self) -> ConfigResult<()> {
        Ok(())
    }

    /// Fetch the current properties for `environment`.
    fn fetch(&self, environment: &Environment) -> ConfigResult<PropertySet>;
}
