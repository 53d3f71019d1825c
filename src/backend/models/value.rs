//! Runtime values stored in constant bindings.

use std::fmt;
use std::sync::Arc;

use crate::backend::namespace::Namespace;
use crate::backend::symbol::Symbol;

/// A value a constant can be bound to.
///
/// Namespaces are values too, so `Outer::Inner` is an ordinary constant whose
/// value is another namespace.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Long(i64),
    String(Arc<str>),
    Symbol(Symbol),
    Namespace(Arc<Namespace>),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    pub fn as_namespace(&self) -> Option<&Arc<Namespace>> {
        match self {
            Value::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "Bool",
            Value::Long(_) => "Integer",
            Value::String(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Namespace(_) => "Namespace",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            // Namespaces have identity, not structure
            (Value::Namespace(a), Value::Namespace(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Long(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Symbol(s) => write!(f, "{:?}", s),
            Value::Namespace(ns) => write!(f, "#<Namespace {}>", ns.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Symbol(s) => f.write_str(s.as_str()),
            Value::Namespace(ns) => f.write_str(ns.name()),
            other => write!(f, "{:?}", other),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Arc<Namespace>> for Value {
    fn from(ns: Arc<Namespace>) -> Self {
        Value::Namespace(ns)
    }
}
