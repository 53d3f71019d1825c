//! Symbols and constant names
//!
//! Two string-like types live here:
//!
//! - `Symbol` - an interned symbol backed by lasso's `ThreadedRodeo`. Interning the
//!   same text twice yields the same key, so comparison is O(1). This is the
//!   symbolic form handed to missing-name hooks.
//! - `Name` - a constant name as it arrives at a call site: a shared `Arc<str>`.
//!   Distinct copies of identical text are common (each parse or `to_s` produces a
//!   new one), so name-keyed caches check pointer identity first and fall back to
//!   a full content comparison.
//!
//! # Example
//! ```
//! use latebind::backend::symbol::{intern, Name};
//!
//! let s1 = intern("Foo");
//! let s2 = intern("Foo");
//! assert_eq!(s1, s2);
//!
//! let a = Name::new("Foo");
//! let b = Name::new("Foo");
//! assert!(!a.same_identity(&b));
//! assert_eq!(a, b);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use lasso::{Spur, ThreadedRodeo};

use super::cache::CacheKey;

/// Global interner for symbols - lazily initialized, thread-safe
static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();

#[inline]
fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::new)
}

/// Interned symbol - 4 bytes, O(1) comparison
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Create a new symbol from a string (interns if new)
    #[inline]
    pub fn new(s: &str) -> Self {
        Symbol(interner().get_or_intern(s))
    }

    /// Get the string representation of this symbol
    #[inline]
    pub fn as_str(&self) -> &'static str {
        interner().resolve(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    #[inline]
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Intern a string and return a Symbol
#[inline]
pub fn intern(s: &str) -> Symbol {
    Symbol::new(s)
}

/// Constant name as seen by a call site.
///
/// Equality and hashing are by content; `same_identity` exposes the pointer
/// check used as the fast path of name-keyed caches.
#[derive(Clone)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(s: &str) -> Self {
        Name(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both names point at the same allocation.
    #[inline]
    pub fn same_identity(&self, other: &Name) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Intern this name as a `Symbol`.
    #[inline]
    pub fn to_symbol(&self) -> Symbol {
        Symbol::new(&self.0)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other) || self.0 == other.0
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(Arc::from(s))
    }
}

impl From<Arc<str>> for Name {
    fn from(s: Arc<str>) -> Self {
        Name(s)
    }
}

impl CacheKey for Name {
    #[inline]
    fn same_identity(&self, other: &Self) -> bool {
        Name::same_identity(self, other)
    }

    #[inline]
    fn content_eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
