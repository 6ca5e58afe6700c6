//! Provider settings subsystem.
//!
//! # Data Flow
//! ```text
//! livecfg.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → ProviderSettings
//!     → builder.rs (FileSource + Pipeline + ReloadStrategy)
//!     → ConfigProvider
//! ```
//!
//! # Design Decisions
//! - Every field has a default so minimal settings files work
//! - Resolver stages run in the order listed; nothing is implied
//! - The builder is the programmatic form; the file only maps onto it

pub mod builder;
pub mod loader;
pub mod schema;
pub mod validation;

pub use builder::ProviderBuilder;
pub use loader::load_settings;
pub use schema::{ProviderSettings, ReloadKind, ReloadSettings, ResolverKind, SourceSettings};
pub use validation::{validate_settings, ValidationError};
