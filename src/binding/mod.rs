//! Typed live-binding engine.
//!
//! # Data Flow
//! ```text
//! provider.get_property::<T>(key)
//!     → one snapshot load (Reader)
//!     → T::bind: scalar parse | Option | map children | nested schema
//!
//! provider.bind::<S>(prefix)
//!     → S { SchemaBinding(provider, prefix, id) }
//!     → validation.rs: call every accessor once, fail fast
//!     → accessor call = fresh Reader over the current snapshot
//! ```
//!
//! # Design Decisions
//! - Schema types are generated by `config_schema!`; each carries a dispatch
//!   table built at bind time instead of runtime reflection
//! - Binding strategy follows from the accessor's return type
//! - Bound objects hold no values, so a reload is visible on the next call
//! - `NotFound` and `TypeMismatch` are distinct and propagate unwrapped

pub mod bind;
pub mod parse;
pub mod provider;
pub mod schema;
pub mod validation;

pub use bind::{Bind, BindStrategy, Reader};
pub use parse::{FromProperty, MapKey, ParserRegistry};
pub use provider::ConfigProvider;
pub use schema::{Accessor, AccessorInfo, Schema, SchemaBinding};
