//! Schema types: live, re-reading views over the provider.
//!
//! A schema is declared with [`config_schema!`](crate::config_schema). Each
//! declared field becomes an accessor method that reads `prefix.key` from the
//! current snapshot every time it is called; the struct itself only holds a
//! [`SchemaBinding`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::binding::bind::{Bind, BindStrategy, Reader};
use crate::binding::provider::ConfigProvider;
use crate::error::ConfigResult;
use crate::model::join_key;

/// The (provider, prefix) pair behind a bound schema object.
///
/// Identity (equality, hashing, debug output) of a bound object is the
/// identity of its binding, never a property lookup.
#[derive(Clone)]
pub struct SchemaBinding {
    provider: ConfigProvider,
    prefix: Arc<str>,
    id: u64,
}

impl SchemaBinding {
    pub(crate) fn new(provider: ConfigProvider, prefix: &str, id: u64) -> Self {
        Self {
            provider,
            prefix: Arc::from(prefix),
            id,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Unique per `bind()` call on a provider.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn provider(&self) -> &ConfigProvider {
        &self.provider
    }

    /// Full key of accessor `name`.
    pub fn key(&self, name: &str) -> String {
        join_key(&self.prefix, name)
    }

    /// Read accessor `name` from the current snapshot.
    pub fn get<T: Bind>(&self, name: &str) -> ConfigResult<T> {
        self.get_in(&self.provider.reader()?, name)
    }

    /// Read accessor `name`, parsing `default` if the key is absent.
    pub fn get_or_default<T: Bind>(&self, name: &str, default: &str) -> ConfigResult<T> {
        self.get_or_default_in(&self.provider.reader()?, name, default)
    }

    /// Read accessor `name` from the snapshot `reader` is pinned to.
    pub fn get_in<T: Bind>(&self, reader: &Reader<'_>, name: &str) -> ConfigResult<T> {
        T::bind(reader, &self.key(name))
    }

    pub fn get_or_default_in<T: Bind>(
        &self,
        reader: &Reader<'_>,
        name: &str,
        default: &str,
    ) -> ConfigResult<T> {
        T::bind_or_default(reader, &self.key(name), default)
    }
}

impl fmt::Debug for SchemaBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBinding")
            .field("prefix", &self.prefix)
            .field("id", &self.id)
            .finish()
    }
}

/// One row of a schema's dispatch table.
pub struct Accessor<S> {
    /// Method name.
    pub name: &'static str,
    /// Key segment appended to the binding prefix.
    pub key: &'static str,
    pub strategy: BindStrategy,
    /// Declared default, parsed when the key is absent.
    pub default: Option<&'static str>,
    /// Reads the accessor through `reader` and discards the value.
    pub invoke: fn(&S, &Reader<'_>) -> ConfigResult<()>,
}

impl<S> Accessor<S> {
    pub fn info(&self) -> AccessorInfo {
        AccessorInfo {
            name: self.name,
            key: self.key,
            strategy: self.strategy,
            default: self.default,
        }
    }
}

impl<S> fmt::Debug for Accessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.info(), f)
    }
}

/// Introspection view of an [`Accessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessorInfo {
    pub name: &'static str,
    pub key: &'static str,
    pub strategy: BindStrategy,
    pub default: Option<&'static str>,
}

/// A type generated by [`config_schema!`](crate::config_schema).
pub trait Schema: Bind + Clone + Send + Sync {
    const NAME: &'static str;

    fn from_binding(binding: SchemaBinding) -> Self;

    fn binding(&self) -> &SchemaBinding;

    /// Dispatch table, built when a binding is created.
    fn accessors() -> Vec<Accessor<Self>>;

    fn describe() -> Vec<AccessorInfo> {
        Self::accessors().iter().map(Accessor::info).collect()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_key {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $key:literal) => {
        $key
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_default {
    () => {
        None
    };
    ($default:literal) => {
        Some(concat!($default))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_get {
    ($binding:expr, $key:expr, $ty:ty) => {
        $binding.get::<$ty>($key)
    };
    ($binding:expr, $key:expr, $ty:ty, $default:literal) => {
        $binding.get_or_default::<$ty>($key, concat!($default))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_get_in {
    ($binding:expr, $reader:expr, $key:expr, $ty:ty) => {
        $binding.get_in::<$ty>($reader, $key)
    };
    ($binding:expr, $reader:expr, $key:expr, $ty:ty, $default:literal) => {
        $binding.get_or_default_in::<$ty>($reader, $key, concat!($default))
    };
}

/// Declare a live-bound configuration schema.
///
/// ```
/// use std::collections::BTreeMap;
/// use livecfg::config_schema;
///
/// config_schema! {
///     /// Connection pool settings.
///     pub struct PoolConfig {
///         max_size: u32 = 16,
///     }
/// }
///
/// config_schema! {
///     pub struct DatabaseConfig {
///         /// Host name.
///         host: String,
///         port: u16 = "5432",
///         replica: Option<String>,
///         pool: PoolConfig,
///         connect_timeout_ms as "connectTimeoutMs": u64 = 1000,
///         shards: BTreeMap<String, PoolConfig>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_schema {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident $(as $key:literal)? : $ty:ty $(= $default:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            binding: $crate::binding::SchemaBinding,
        }

        impl $name {
            $(
                $(#[$fmeta])*
                pub fn $field(&self) -> $crate::ConfigResult<$ty> {
                    $crate::__schema_get!(
                        self.binding,
                        $crate::__schema_key!($field $(, $key)?),
                        $ty
                        $(, $default)?
                    )
                }
            )*
        }

        impl $crate::binding::Schema for $name {
            const NAME: &'static str = stringify!($name);

            fn from_binding(binding: $crate::binding::SchemaBinding) -> Self {
                Self { binding }
            }

            fn binding(&self) -> &$crate::binding::SchemaBinding {
                &self.binding
            }

            fn accessors() -> ::std::vec::Vec<$crate::binding::Accessor<Self>> {
                ::std::vec![
                    $(
                        $crate::binding::Accessor {
                            name: stringify!($field),
                            key: $crate::__schema_key!($field $(, $key)?),
                            strategy: <$ty as $crate::binding::Bind>::STRATEGY,
                            default: $crate::__schema_default!($($default)?),
                            invoke: |bound: &$name, reader: &$crate::binding::Reader<'_>| {
                                $crate::__schema_get_in!(
                                    bound.binding,
                                    reader,
                                    $crate::__schema_key!($field $(, $key)?),
                                    $ty
                                    $(, $default)?
                                )
                                .map(|_| ())
                            },
                        }
                    ),*
                ]
            }
        }

        impl $crate::binding::Bind for $name {
            const STRATEGY: $crate::binding::BindStrategy =
                $crate::binding::BindStrategy::NestedObject;

            fn bind(reader: &$crate::binding::Reader<'_>, key: &str) -> $crate::ConfigResult<Self> {
                reader.provider().bind_in::<Self>(reader, key)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("prefix", &self.binding.prefix())
                    .field("binding", &self.binding.id())
                    .finish()
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.binding.id() == other.binding.id()
            }
        }

        impl ::std::cmp::Eq for $name {}

        impl ::std::hash::Hash for $name {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&self.binding.id(), state);
            }
        }
    };
}

/// Declare an enum parsed by exact variant name, usable as a scalar property
/// and as a map key.
///
/// ```
/// livecfg::property_enum! {
///     pub enum Region { UsWest, UsEast, EuCentral }
/// }
/// ```
#[macro_export]
macro_rules! property_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl $crate::binding::FromProperty for $name {
            fn expected() -> &'static str {
                stringify!($name)
            }

            fn from_property(raw: &str) -> ::std::result::Result<Self, ::std::string::String> {
                match raw.trim() {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err(format!("expected one of {:?}, got {:?}", Self::VARIANTS, other)),
                }
            }
        }

        impl $crate::binding::MapKey for $name {
            fn from_segment(segment: &str) -> ::std::result::Result<Self, ::std::string::String> {
                <Self as $crate::binding::FromProperty>::from_property(segment)
            }
        }

        $crate::scalar_property!($name);
    };
}
