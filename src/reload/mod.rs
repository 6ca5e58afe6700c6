//! Reload scheduling.
//!
//! # Data Flow
//! ```text
//! ReloadStrategy::register(reloadable)
//!     → reloadable.reload() once, on the caller's thread (errors propagate)
//!     → immediate.rs: nothing further
//!     → periodic.rs:  Tokio interval task → spawn_blocking(reload) every tick
//!     → watch.rs:     notify watcher → reload on file change
//!
//! ReloadStrategy::deregister(reloadable)
//!     → stop future runs (a run already in progress completes)
//! ```
//!
//! # Design Decisions
//! - Scheduling policy is separate from what gets reloaded
//! - Scheduled runs never propagate: errors and panics are logged and the
//!   schedule keeps going
//! - Registrations are keyed by the `Arc` identity of the reloadable

pub mod immediate;
pub mod periodic;
pub mod watch;

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigResult;

pub use immediate::ImmediateReloadStrategy;
pub use periodic::PeriodicalReloadStrategy;
pub use watch::FileWatchReloadStrategy;

/// Something that can refresh itself from its backend.
pub trait Reloadable: Send + Sync {
    fn reload(&self) -> ConfigResult<()>;

    /// Label used in log lines.
    fn describe(&self) -> String {
        "reloadable".to_string()
    }
}

/// Policy deciding when a [`Reloadable`] is reloaded.
pub trait ReloadStrategy: Send + Sync + fmt::Debug {
    /// Reload once now, then schedule future reloads according to the policy.
    fn register(&self, reloadable: Arc<dyn Reloadable>) -> ConfigResult<()>;

    /// Cancel future reloads of `reloadable`. Unknown registrations are ignored.
    fn deregister(&self, reloadable: &Arc<dyn Reloadable>);
}

/// Identity of a registration: the address of the shared reloadable.
pub(crate) fn registration_key(reloadable: &Arc<dyn Reloadable>) -> usize {
    Arc::as_ptr(reloadable) as *const () as usize
}
