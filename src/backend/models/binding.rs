//! Constant bindings: a concrete value or a pending lazy load.

use std::fmt;
use std::sync::Arc;

use super::Value;

/// Path of a load unit, as registered with `autoload`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LoadPath(Arc<str>);

impl LoadPath {
    pub fn new(path: &str) -> Self {
        LoadPath(Arc::from(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoadPath {
    fn from(path: &str) -> Self {
        LoadPath::new(path)
    }
}

/// Current state of a name inside its declaring namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Bound to a concrete value.
    Value(Value),
    /// Not loaded yet; reading the name loads this unit first.
    Autoload(LoadPath),
}

impl Binding {
    pub fn is_autoload(&self) -> bool {
        matches!(self, Binding::Autoload(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Binding::Value(v) => Some(v),
            Binding::Autoload(_) => None,
        }
    }

    pub fn autoload_path(&self) -> Option<&LoadPath> {
        match self {
            Binding::Autoload(path) => Some(path),
            Binding::Value(_) => None,
        }
    }
}
