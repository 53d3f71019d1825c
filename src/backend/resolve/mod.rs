//! Constant resolution
//!
//! Reading a constant is a two-step affair:
//! 1. a `LookupConstant` strategy finds the current binding (or nothing), and
//! 2. a `ConstantResolver` turns that binding into a value, running a lazy load
//!    through the `Loader` when the binding is an autoload marker, or asking the
//!    namespace's missing-name hook when nothing was found.
//!
//! The resolver is a call-site object: it owns the small cache of interned
//! names used on the missing-name path.

mod engine;
mod loader;
mod lookup;
#[cfg(test)]
mod tests;

use std::fmt;

pub use engine::ConstantResolver;
pub use loader::{FeatureLoader, LoadUnit, Loader};
pub use lookup::{AncestorLookup, LookupConstant, OwnLookup};

use super::models::LoadPath;
use super::symbol::Symbol;

/// Result type for constant resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors surfaced by constant resolution.
///
/// Failures from lookup strategies, loaders and hooks reach the caller
/// unchanged; the resolver never wraps or retries them.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No binding and no hook produced a value.
    NameNotFound { namespace: String, name: Symbol },
    /// A load unit could not be found or failed while running.
    LoadFailed { path: LoadPath, message: String },
    /// A lookup strategy failed.
    Lookup(String),
    /// Arbitrary failure raised by user code (load units, hooks).
    Runtime(String),
}

impl ResolveError {
    pub fn load_failed(path: &LoadPath, message: impl Into<String>) -> Self {
        ResolveError::LoadFailed {
            path: path.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NameNotFound { namespace, name } => {
                write!(f, "uninitialized constant {}::{}", namespace, name)
            }
            ResolveError::LoadFailed { path, message } => {
                write!(f, "{} -- {}", message, path)
            }
            ResolveError::Lookup(msg) => write!(f, "Lookup error: {}", msg),
            ResolveError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}
