//! String-to-value parsing for scalar properties and map keys.

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

/// Parse a raw property value into `Self`.
///
/// The error string becomes the `reason` of a `TypeMismatch`.
pub trait FromProperty: Sized {
    /// Shape name reported in `TypeMismatch` errors.
    fn expected() -> &'static str {
        type_name::<Self>()
    }

    fn from_property(raw: &str) -> Result<Self, String>;
}

/// Parse one first-level path segment into a map key.
pub trait MapKey: Sized {
    fn from_segment(segment: &str) -> Result<Self, String>;
}

macro_rules! from_str_property {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromProperty for $ty {
                fn from_property(raw: &str) -> Result<Self, String> {
                    raw.trim().parse::<$ty>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

from_str_property!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, IpAddr,
    SocketAddr,
);

macro_rules! from_str_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MapKey for $ty {
                fn from_segment(segment: &str) -> Result<Self, String> {
                    <$ty as FromProperty>::from_property(segment)
                }
            }
        )*
    };
}

from_str_key!(i32, i64, u16, u32, u64, usize);

impl FromProperty for String {
    fn from_property(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromProperty for PathBuf {
    fn from_property(raw: &str) -> Result<Self, String> {
        Ok(PathBuf::from(raw.trim()))
    }
}

impl FromProperty for bool {
    fn from_property(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(format!("expected true or false, got {:?}", trimmed))
        }
    }
}

impl MapKey for String {
    fn from_segment(segment: &str) -> Result<Self, String> {
        Ok(segment.to_string())
    }
}

/// Split a comma-separated list, trimming items and skipping empty ones.
fn split_list<T: FromProperty>(raw: &str) -> Result<impl Iterator<Item = T>, String> {
    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| T::from_property(item).map_err(|e| format!("list item {:?}: {}", item, e)))
        .collect::<Result<Vec<T>, String>>()?;
    Ok(items.into_iter())
}

impl<T: FromProperty> FromProperty for Vec<T> {
    fn from_property(raw: &str) -> Result<Self, String> {
        Ok(split_list(raw)?.collect())
    }
}

impl<T: FromProperty + Ord> FromProperty for BTreeSet<T> {
    fn from_property(raw: &str) -> Result<Self, String> {
        Ok(split_list(raw)?.collect())
    }
}

impl<T: FromProperty + Eq + Hash> FromProperty for HashSet<T> {
    fn from_property(raw: &str) -> Result<Self, String> {
        Ok(split_list(raw)?.collect())
    }
}

type ParserFn = dyn Fn(&str) -> Result<Box<dyn Any + Send>, String> + Send + Sync;

/// Caller-registered parsers, keyed by target type. A registered parser takes
/// precedence over the type's built-in [`FromProperty`] impl.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: DashMap<TypeId, Arc<ParserFn>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T, F>(&self, parser: F)
    where
        T: Any + Send,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        let erased: Arc<ParserFn> = Arc::new(move |raw: &str| {
            parser(raw).map(|value| Box::new(value) as Box<dyn Any + Send>)
        });
        self.parsers.insert(TypeId::of::<T>(), erased);
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.parsers.contains_key(&TypeId::of::<T>())
    }

    /// Run the registered parser for `T`, if there is one.
    pub fn parse<T: Any>(&self, raw: &str) -> Option<Result<T, String>> {
        let parser = Arc::clone(self.parsers.get(&TypeId::of::<T>())?.value());
        Some(parser(raw).and_then(|boxed| {
            boxed
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| {
                    format!(
                        "registered parser produced a value that is not {}",
                        type_name::<T>()
                    )
                })
        }))
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("registered", &self.parsers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_bools() {
        assert_eq!(u16::from_property(" 8080 "), Ok(8080));
        assert!(u8::from_property("300").is_err());
        assert_eq!(bool::from_property("TRUE"), Ok(true));
        assert!(bool::from_property("yes").is_err());
        assert_eq!(String::from_property("  padded "), Ok("  padded ".to_string()));
    }

    #[test]
    fn test_lists() {
        assert_eq!(Vec::<u32>::from_property("1, 2,3,"), Ok(vec![1, 2, 3]));
        assert_eq!(Vec::<String>::from_property(""), Ok(Vec::new()));
        let set = BTreeSet::<String>::from_property("b,a,b").unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(Vec::<i32>::from_property("1,x").is_err());
    }

    #[test]
    fn test_registry_overrides() {
        #[derive(Debug, PartialEq)]
        struct Millis(u64);

        let registry = ParserRegistry::new();
        assert!(registry.parse::<Millis>("5").is_none());

        registry.register(|raw: &str| {
            raw.strip_suffix("ms")
                .ok_or_else(|| "missing ms suffix".to_string())
                .and_then(|n| {
                    n.parse()
                        .map(Millis)
                        .map_err(|e: std::num::ParseIntError| e.to_string())
                })
        });
        assert!(registry.contains::<Millis>());
        assert_eq!(registry.parse::<Millis>("250ms"), Some(Ok(Millis(250))));
        assert!(matches!(registry.parse::<Millis>("250"), Some(Err(_))));
    }
}
