//! Namespaces and their constant tables
//!
//! A `Namespace` owns a table mapping names to `Binding`s. Tables are shared:
//! any activity holding the `Arc<Namespace>` may define, autoload or remove
//! constants at any time. Every operation here touches a single entry under the
//! table lock and releases it before returning, so no lock is ever held while
//! user code (loaders, hooks) runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::models::{Binding, LoadPath, Value};
use super::resolve::{ResolveError, ResolveResult};
use super::symbol::{Name, Symbol};

static NEXT_NAMESPACE_ID: AtomicU64 = AtomicU64::new(0);

/// Unique namespace identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u64);

impl NamespaceId {
    fn next() -> Self {
        NamespaceId(NEXT_NAMESPACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// User-overridable handler for names that resolve to nothing.
///
/// Receives the namespace the lookup started from and the interned name. The
/// returned value (or error) is the result of the resolution.
pub trait MissingNameHook: Send + Sync {
    fn handle_missing(&self, namespace: &Arc<Namespace>, name: Symbol) -> ResolveResult<Value>;
}

impl<F> MissingNameHook for F
where
    F: Fn(&Arc<Namespace>, Symbol) -> ResolveResult<Value> + Send + Sync,
{
    fn handle_missing(&self, namespace: &Arc<Namespace>, name: Symbol) -> ResolveResult<Value> {
        self(namespace, name)
    }
}

/// A named scope holding constants.
pub struct Namespace {
    id: NamespaceId,
    name: String,
    /// Next namespace searched by ancestor lookups.
    parent: Option<Arc<Namespace>>,
    constants: RwLock<HashMap<Name, Binding>>,
    missing_hook: RwLock<Option<Arc<dyn MissingNameHook>>>,
}

impl Namespace {
    fn build(name: String, parent: Option<Arc<Namespace>>) -> Arc<Self> {
        Arc::new(Self {
            id: NamespaceId::next(),
            name,
            parent,
            constants: RwLock::new(HashMap::new()),
            missing_hook: RwLock::new(None),
        })
    }

    /// A namespace with no ancestors.
    pub fn root(name: &str) -> Arc<Self> {
        Self::build(name.to_string(), None)
    }

    /// A namespace whose lookups continue into `parent`.
    pub fn with_parent(name: &str, parent: &Arc<Namespace>) -> Arc<Self> {
        Self::build(name.to_string(), Some(parent.clone()))
    }

    /// Create `self::name`, bind it as a constant of `self` and return it.
    pub fn define_nested(self: &Arc<Self>, name: &str) -> Arc<Namespace> {
        let nested = Self::build(format!("{}::{}", self.name, name), None);
        self.set_constant(name, Value::Namespace(nested.clone()));
        nested
    }

    pub fn id(&self) -> NamespaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Namespace>> {
        self.parent.as_ref()
    }

    /// `self` followed by its parents, nearest first.
    pub fn ancestors(self: &Arc<Self>) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Binding declared directly in this namespace.
    pub fn const_get_own(&self, name: &str) -> Option<Binding> {
        self.constants.read().get(name).cloned()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.constants.read().contains_key(name)
    }

    /// Bind `name` to `value`, replacing any previous binding (including a
    /// pending autoload). Returns the previous binding.
    pub fn set_constant(&self, name: impl Into<Name>, value: Value) -> Option<Binding> {
        self.constants
            .write()
            .insert(name.into(), Binding::Value(value))
    }

    /// Register a lazy load of `path` for `name`. Does nothing and returns
    /// `false` when the name is already bound.
    pub fn autoload(&self, name: impl Into<Name>, path: impl Into<LoadPath>) -> bool {
        let mut table = self.constants.write();
        let name = name.into();
        if table.contains_key(&name) {
            return false;
        }
        table.insert(name, Binding::Autoload(path.into()));
        true
    }

    /// Unconditionally (re)install an autoload marker.
    pub(crate) fn set_autoload_constant(&self, name: Name, path: LoadPath) {
        self.constants.write().insert(name, Binding::Autoload(path));
    }

    /// Path of the pending autoload for `name`, if any.
    pub fn autoload_path(&self, name: &str) -> Option<LoadPath> {
        self.constants
            .read()
            .get(name)
            .and_then(|b| b.autoload_path().cloned())
    }

    pub fn remove_constant(&self, name: &str) -> Option<Binding> {
        self.constants.write().remove(name)
    }

    pub fn constant_count(&self) -> usize {
        self.constants.read().len()
    }

    /// Install a missing-name hook, replacing any previous one.
    pub fn set_missing_hook(&self, hook: Arc<dyn MissingNameHook>) {
        *self.missing_hook.write() = Some(hook);
    }

    pub fn clear_missing_hook(&self) {
        *self.missing_hook.write() = None;
    }

    /// Dispatch the missing-name hook. Without a hook this raises
    /// `ResolveError::NameNotFound`.
    pub fn const_missing(self: &Arc<Self>, name: Symbol) -> ResolveResult<Value> {
        // Clone out of the lock: the hook may install another hook
        let hook = self.missing_hook.read().clone();
        match hook {
            Some(hook) => hook.handle_missing(self, name),
            None => Err(ResolveError::NameNotFound {
                namespace: self.name.clone(),
                name,
            }),
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("constants", &self.constants.read().len())
            .finish()
    }
}

/// Iterator over a namespace and its parents.
pub struct Ancestors {
    next: Option<Arc<Namespace>>,
}

impl Iterator for Ancestors {
    type Item = Arc<Namespace>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent.clone();
        Some(current)
    }
}

/// A lookup hit: the binding together with the namespace that declares it.
///
/// The declaring namespace may differ from the namespace the lookup started
/// in; autoload markers are removed from and restored to the declaring one.
#[derive(Debug, Clone)]
pub struct Constant {
    declaring: Arc<Namespace>,
    name: Name,
    binding: Binding,
}

impl Constant {
    pub fn new(declaring: Arc<Namespace>, name: Name, binding: Binding) -> Self {
        Self {
            declaring,
            name,
            binding,
        }
    }

    pub fn declaring(&self) -> &Arc<Namespace> {
        &self.declaring
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn is_autoload(&self) -> bool {
        self.binding.is_autoload()
    }
}
