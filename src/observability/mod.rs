//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! cache/reload/binding produce:
//!     → tracing events (structured fields: environment, generation, key)
//!     → metrics.rs (fetch latency, reload outcomes, snapshot size)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the binary
//!     → whatever `metrics` recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the host's job
//! - Metrics are opt-in per cache and cost nothing when off

pub mod logging;
pub mod metrics;
