//! Environment scope selecting which subtree of configuration a backend returns.

use std::fmt;
use std::sync::Arc;

/// An opaque, immutable scope name such as `"us-west-1"`.
///
/// The empty name denotes the root scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Environment {
    name: Arc<str>,
}

impl Environment {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self { name: Arc::from(name.as_ref()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            f.write_str(&self.name)
        }
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Environment {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
