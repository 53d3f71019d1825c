//! Lookup strategies
//!
//! A strategy answers "what is `name` bound to, as seen from `namespace`?". It
//! is a pure query: no caching, no loading, callable any number of times.

use std::sync::Arc;

use crate::backend::namespace::{Constant, Namespace};
use crate::backend::symbol::Name;

use super::ResolveResult;

/// Pluggable constant lookup.
pub trait LookupConstant: Send + Sync {
    fn lookup(&self, namespace: &Arc<Namespace>, name: &Name) -> ResolveResult<Option<Constant>>;
}

impl<F> LookupConstant for F
where
    F: Fn(&Arc<Namespace>, &Name) -> ResolveResult<Option<Constant>> + Send + Sync,
{
    fn lookup(&self, namespace: &Arc<Namespace>, name: &Name) -> ResolveResult<Option<Constant>> {
        self(namespace, name)
    }
}

/// Only the namespace itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct OwnLookup;

impl LookupConstant for OwnLookup {
    fn lookup(&self, namespace: &Arc<Namespace>, name: &Name) -> ResolveResult<Option<Constant>> {
        Ok(namespace
            .const_get_own(name.as_str())
            .map(|binding| Constant::new(namespace.clone(), name.clone(), binding)))
    }
}

/// The namespace, then each parent in turn. The first declaring namespace wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct AncestorLookup;

impl LookupConstant for AncestorLookup {
    fn lookup(&self, namespace: &Arc<Namespace>, name: &Name) -> ResolveResult<Option<Constant>> {
        Ok(namespace.ancestors().find_map(|ns| {
            ns.const_get_own(name.as_str())
                .map(|binding| Constant::new(ns.clone(), name.clone(), binding))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::{Binding, Value};

    #[test]
    fn test_own_lookup_ignores_parents() {
        let base = Namespace::root("Base");
        base.set_constant("X", Value::Long(1));
        let child = Namespace::with_parent("Child", &base);

        assert!(OwnLookup.lookup(&child, &Name::new("X")).unwrap().is_none());
        assert!(OwnLookup.lookup(&base, &Name::new("X")).unwrap().is_some());
    }

    #[test]
    fn test_ancestor_lookup_reports_declaring_namespace() {
        let base = Namespace::root("Base");
        base.autoload("X", "x.rb");
        let child = Namespace::with_parent("Child", &base);

        let found = AncestorLookup
            .lookup(&child, &Name::new("X"))
            .unwrap()
            .expect("X is declared in Base");
        assert!(Arc::ptr_eq(found.declaring(), &base));
        assert!(found.is_autoload());
    }

    #[test]
    fn test_ancestor_lookup_nearest_wins() {
        let base = Namespace::root("Base");
        base.set_constant("X", Value::Long(1));
        let child = Namespace::with_parent("Child", &base);
        child.set_constant("X", Value::Long(2));

        let found = AncestorLookup.lookup(&child, &Name::new("X")).unwrap().unwrap();
        assert_eq!(found.binding(), &Binding::Value(Value::Long(2)));
    }
}
