//! Live, environment-scoped configuration with typed bindings.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   fetch(env)   ┌──────────────────────────────┐
//!   │ ConfigSource │───────────────▶│ resolver::Pipeline            │
//!   │ memory/file  │                │ placeholder → extends → link  │
//!   └──────────────┘                │ → tags                        │
//!          ▲                        └──────────────┬───────────────┘
//!          │ reload()                              │ PropertySet
//!   ┌──────┴───────┐                ┌──────────────▼───────────────┐
//!   │ReloadStrategy│                │ cache::SnapshotCache          │
//!   │immediate/    │                │ strict | resilient            │
//!   │periodic/watch│                │ ArcSwap<env → Arc<Snapshot>>  │
//!   └──────────────┘                └──────────────┬───────────────┘
//!                                                  │ one load per read
//!                                   ┌──────────────▼───────────────┐
//!                                   │ binding::ConfigProvider       │
//!                                   │ get_property / bind::<S>()    │
//!                                   └──────────────────────────────┘
//! ```

// Data
pub mod error;
pub mod model;

// Pipeline
pub mod resolver;
pub mod source;

// Publication
pub mod cache;
pub mod reload;

// Application surface
pub mod binding;
pub mod settings;

// Cross-cutting concerns
pub mod observability;

pub use binding::{Bind, ConfigProvider, FromProperty, Schema};
pub use cache::{CacheMode, SnapshotCache};
pub use error::{ConfigError, ConfigResult};
pub use model::{Environment, PropertySet, Snapshot};
pub use settings::ProviderBuilder;
