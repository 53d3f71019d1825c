//! Constant resolution engine
//!
//! `ConstantResolver::resolve` handles the three shapes a looked-up constant can
//! take:
//!
//! 1. **Value** - returned as is.
//! 2. **Autoload marker** - the marker is removed from its declaring namespace,
//!    the load unit runs, the name is looked up again and the fresh result is
//!    resolved recursively. If anything in that sequence fails the marker is put
//!    back before the failure propagates, so a later read retries the load.
//! 3. **Nothing** - the namespace's missing-name hook decides.
//!
//! Removing the marker before loading is what stops a read of the same name
//! from inside the load unit from starting the same load again: that inner read
//! sees no marker and falls through to whatever the unit has defined so far.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::backend::cache::{Admission, Probe, SiteCache, SiteStats};
use crate::backend::config::CacheConfig;
use crate::backend::models::{Binding, LoadPath, Value};
use crate::backend::namespace::{Constant, Namespace};
use crate::backend::symbol::{Name, Symbol};

use super::{Loader, LookupConstant, ResolveResult};

/// Constant read call site.
pub struct ConstantResolver {
    loader: Arc<dyn Loader>,
    /// Interned symbols for names that went down the missing-name path.
    symbols: Mutex<SiteCache<Name, Symbol>>,
}

impl ConstantResolver {
    pub fn new(loader: Arc<dyn Loader>, config: &CacheConfig) -> Self {
        Self {
            loader,
            symbols: Mutex::new(SiteCache::new(config.constant_cache)),
        }
    }

    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    /// Look `name` up from `namespace` and resolve the result.
    pub fn read(
        &self,
        namespace: &Arc<Namespace>,
        name: &Name,
        lookup: &dyn LookupConstant,
    ) -> ResolveResult<Value> {
        let constant = lookup.lookup(namespace, name)?;
        self.resolve(namespace, name, constant, lookup)
    }

    /// Resolve an already looked-up constant to a value.
    ///
    /// `namespace` is where the lookup started; `constant` (if any) carries the
    /// namespace that actually declares the binding.
    pub fn resolve(
        &self,
        namespace: &Arc<Namespace>,
        name: &Name,
        constant: Option<Constant>,
        lookup: &dyn LookupConstant,
    ) -> ResolveResult<Value> {
        match constant {
            Some(constant) => match constant.binding() {
                Binding::Value(value) => Ok(value.clone()),
                Binding::Autoload(path) => {
                    let path = path.clone();
                    self.autoload(namespace, name, &constant, path, lookup)
                }
            },
            None => self.missing(namespace, name),
        }
    }

    fn autoload(
        &self,
        namespace: &Arc<Namespace>,
        name: &Name,
        constant: &Constant,
        path: LoadPath,
        lookup: &dyn LookupConstant,
    ) -> ResolveResult<Value> {
        let declaring = constant.declaring();
        debug!(
            target: "latebind::resolve::autoload",
            namespace = declaring.name(),
            name = %name,
            %path,
            "Autoloading constant"
        );

        declaring.remove_constant(constant.name().as_str());
        let restore = RestoreMarker {
            declaring,
            name: constant.name(),
            path: &path,
            armed: true,
        };

        self.loader.load(&path)?;
        let reloaded = lookup.lookup(namespace, name)?;
        let value = self.resolve(namespace, name, reloaded, lookup)?;

        restore.disarm();
        Ok(value)
    }

    fn missing(&self, namespace: &Arc<Namespace>, name: &Name) -> ResolveResult<Value> {
        let symbol = self.symbol_for(name);
        trace!(
            target: "latebind::resolve::missing",
            namespace = namespace.name(),
            name = %name,
            "Dispatching missing-name hook"
        );
        namespace.const_missing(symbol)
    }

    fn symbol_for(&self, name: &Name) -> Symbol {
        let mut symbols = self.symbols.lock();
        match symbols.probe(name) {
            Probe::Hit(symbol) => symbol,
            Probe::Unstable => name.to_symbol(),
            Probe::Miss => {
                let symbol = name.to_symbol();
                match symbols.admit(name.clone(), symbol) {
                    Admission::Existing(existing) => existing,
                    Admission::BecameUnstable => {
                        debug!(
                            target: "latebind::resolve::missing",
                            limit = symbols.limit().get(),
                            "Missing-name cache disabled"
                        );
                        symbol
                    }
                    Admission::Stored | Admission::Rejected => symbol,
                }
            }
        }
    }

    /// Statistics of the missing-name symbol cache.
    pub fn missing_name_stats(&self) -> SiteStats {
        self.symbols.lock().stats()
    }

    /// Whether the missing-name path has stopped memoizing symbols.
    pub fn is_missing_name_cache_disabled(&self) -> bool {
        self.symbols.lock().is_unstable()
    }
}

/// Reinstalls an autoload marker unless disarmed. Runs on early returns and
/// while unwinding.
struct RestoreMarker<'a> {
    declaring: &'a Arc<Namespace>,
    name: &'a Name,
    path: &'a LoadPath,
    armed: bool,
}

impl RestoreMarker<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RestoreMarker<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(
                target: "latebind::resolve::autoload",
                namespace = self.declaring.name(),
                name = %self.name,
                path = %self.path,
                "Autoload failed, restoring marker"
            );
            self.declaring
                .set_autoload_constant(self.name.clone(), self.path.clone());
        }
    }
}
