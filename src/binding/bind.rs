//! Strategy-driven binding of one accessor's return type.
//!
//! The strategy is a property of the declared return type:
//! 1. a schema type binds as a nested object at `key`
//! 2. a `BTreeMap`/`HashMap` enumerates the children of `key`
//! 3. an `Option<T>` binds `T` and turns `NotFound` into `None`
//! 4. anything else parses the scalar value at `key`

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::binding::parse::{FromProperty, MapKey};
use crate::binding::provider::ConfigProvider;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{join_key, Snapshot};

/// How one schema accessor is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindStrategy {
    NestedObject,
    MapOfKeyToSchema,
    OptionalWrapped,
    Scalar,
}

/// One consistent view used for the duration of a single read.
///
/// Holds the snapshot loaded when the read started; nested objects produced
/// during the read still go back to the provider for later calls.
pub struct Reader<'a> {
    provider: &'a ConfigProvider,
    snapshot: Arc<Snapshot>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(provider: &'a ConfigProvider, snapshot: Arc<Snapshot>) -> Self {
        Self { provider, snapshot }
    }

    pub fn provider(&self) -> &'a ConfigProvider {
        self.provider
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Raw value at `key`, or `NotFound`.
    pub fn raw(&self, key: &str) -> ConfigResult<&str> {
        self.snapshot.get(key).ok_or_else(|| ConfigError::not_found(key))
    }

    /// Parse the value at `key`.
    pub fn parse<T: FromProperty + 'static>(&self, key: &str) -> ConfigResult<T> {
        let raw = self.raw(key)?;
        self.parse_value(key, raw)
    }

    /// Parse `raw` as if it were the value at `key`; registered parsers win.
    pub fn parse_value<T: FromProperty + 'static>(&self, key: &str, raw: &str) -> ConfigResult<T> {
        let parsed = match self.provider.parsers().parse::<T>(raw) {
            Some(result) => result,
            None => T::from_property(raw),
        };
        parsed.map_err(|reason| ConfigError::TypeMismatch {
            key: key.to_string(),
            value: raw.to_string(),
            expected: T::expected(),
            reason,
        })
    }
}

/// A type an accessor can return.
pub trait Bind: Sized + 'static {
    const STRATEGY: BindStrategy;

    fn bind(reader: &Reader<'_>, key: &str) -> ConfigResult<Self>;

    /// Build from a declared default, used when `key` is absent.
    fn bind_default(reader: &Reader<'_>, key: &str, default: &str) -> ConfigResult<Self> {
        let _ = (reader, default);
        Err(ConfigError::Misconfigured(format!(
            "{}: default values are only supported for scalar and optional properties",
            key
        )))
    }

    /// Bind, falling back to `default` only when the key is absent.
    fn bind_or_default(reader: &Reader<'_>, key: &str, default: &str) -> ConfigResult<Self> {
        match Self::bind(reader, key) {
            Err(e) if e.is_not_found() => Self::bind_default(reader, key, default),
            other => other,
        }
    }
}

/// Implement [`Bind`] with the scalar strategy for types that implement
/// [`FromProperty`](crate::binding::FromProperty).
#[macro_export]
macro_rules! scalar_property {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::binding::Bind for $ty {
                const STRATEGY: $crate::binding::BindStrategy =
                    $crate::binding::BindStrategy::Scalar;

                fn bind(
                    reader: &$crate::binding::Reader<'_>,
                    key: &str,
                ) -> $crate::ConfigResult<Self> {
                    reader.parse::<$ty>(key)
                }

                fn bind_default(
                    reader: &$crate::binding::Reader<'_>,
                    key: &str,
                    default: &str,
                ) -> $crate::ConfigResult<Self> {
                    reader.parse_value::<$ty>(key, default)
                }
            }
        )+
    };
}

crate::scalar_property!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
    PathBuf, IpAddr, SocketAddr,
);

macro_rules! collection_property {
    ($coll:ty, $($generics:tt)*) => {
        impl<$($generics)*> Bind for $coll {
            const STRATEGY: BindStrategy = BindStrategy::Scalar;

            fn bind(reader: &Reader<'_>, key: &str) -> ConfigResult<Self> {
                reader.parse::<$coll>(key)
            }

            fn bind_default(reader: &Reader<'_>, key: &str, default: &str) -> ConfigResult<Self> {
                reader.parse_value::<$coll>(key, default)
            }
        }
    };
}

collection_property!(Vec<T>, T: FromProperty + 'static);
collection_property!(BTreeSet<T>, T: FromProperty + Ord + 'static);
collection_property!(HashSet<T>, T: FromProperty + Eq + Hash + 'static);

impl<T: Bind> Bind for Option<T> {
    const STRATEGY: BindStrategy = BindStrategy::OptionalWrapped;

    fn bind(reader: &Reader<'_>, key: &str) -> ConfigResult<Self> {
        match T::bind(reader, key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn bind_default(reader: &Reader<'_>, key: &str, default: &str) -> ConfigResult<Self> {
        T::bind_default(reader, key, default).map(Some)
    }

    fn bind_or_default(reader: &Reader<'_>, key: &str, default: &str) -> ConfigResult<Self> {
        match T::bind_or_default(reader, key, default) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Children of `key` as `(parsed key, bound value)` pairs.
fn bind_children<K, V>(reader: &Reader<'_>, key: &str) -> ConfigResult<Vec<(K, V)>>
where
    K: MapKey,
    V: Bind,
{
    let children: Vec<String> = reader
        .snapshot()
        .properties()
        .child_segments(key)
        .into_iter()
        .map(str::to_string)
        .collect();

    children
        .into_iter()
        .map(|segment| {
            let child_key = join_key(key, &segment);
            let parsed = K::from_segment(&segment).map_err(|reason| ConfigError::TypeMismatch {
                key: child_key.clone(),
                value: segment.clone(),
                expected: type_name::<K>(),
                reason,
            })?;
            let value = V::bind(reader, &child_key)?;
            Ok((parsed, value))
        })
        .collect()
}

impl<K, V> Bind for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Bind,
{
    const STRATEGY: BindStrategy = BindStrategy::MapOfKeyToSchema;

    fn bind(reader: &Reader<'_>, key: &str) -> ConfigResult<Self> {
        Ok(bind_children(reader, key)?.into_iter().collect())
    }
}

impl<K, V> Bind for HashMap<K, V>
where
    K: MapKey + Eq + Hash + 'static,
    V: Bind,
{
    const STRATEGY: BindStrategy = BindStrategy::MapOfKeyToSchema;

    fn bind(reader: &Reader<'_>, key: &str) -> ConfigResult<Self> {
        Ok(bind_children(reader, key)?.into_iter().collect())
    }
}
