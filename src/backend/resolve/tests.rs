//! Tests for the constant resolution engine.

use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use super::*;
use crate::backend::config::CacheConfig;
use crate::backend::models::{Binding, LoadPath, Value};
use crate::backend::namespace::{Constant, Namespace};
use crate::backend::symbol::{Name, Symbol};

fn resolver(loader: Arc<dyn Loader>) -> ConstantResolver {
    ConstantResolver::new(loader, &CacheConfig::default())
}

/// Loader that fails the test if it is ever invoked
fn forbidden_loader() -> Arc<dyn Loader> {
    Arc::new(|path: &LoadPath| -> ResolveResult<()> {
        panic!("loader must not run, asked for {}", path)
    })
}

#[test]
fn test_direct_value_skips_loader() {
    let ns = Namespace::root("M");
    ns.set_constant("X", Value::Long(42));
    let engine = resolver(forbidden_loader());

    let value = engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap();
    assert_eq!(value, Value::Long(42));
}

#[test]
fn test_resolve_with_given_binding() {
    let ns = Namespace::root("M");
    let engine = resolver(forbidden_loader());
    let constant = Constant::new(ns.clone(), Name::new("X"), Binding::Value(Value::from("v")));

    // The supplied binding is trusted even though the table is empty
    let value = engine
        .resolve(&ns, &Name::new("X"), Some(constant), &OwnLookup)
        .unwrap();
    assert_eq!(value, Value::from("v"));
}

#[test]
fn test_autoload_defines_value() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");

    let loader = Arc::new(FeatureLoader::new());
    let target = ns.clone();
    loader.register("x.rb", move |_: &LoadPath| {
        target.set_constant("X", Value::from("loaded"));
        Ok(())
    });
    let engine = resolver(loader.clone());

    let value = engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap();
    assert_eq!(value, Value::from("loaded"));
    assert!(ns.autoload_path("X").is_none());
    assert_eq!(loader.load_count(&LoadPath::new("x.rb")), 1);

    // Second read is a direct hit
    assert_eq!(engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap(), Value::from("loaded"));
    assert_eq!(loader.load_count(&LoadPath::new("x.rb")), 1);
}

#[test]
fn test_failed_autoload_restores_marker_and_retries() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let loader: Arc<dyn Loader> = Arc::new(move |path: &LoadPath| -> ResolveResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::load_failed(path, "syntax error"))
    });
    let engine = resolver(loader);
    let name = Name::new("X");

    let first = engine.read(&ns, &name, &OwnLookup).unwrap_err();
    assert_eq!(first, ResolveError::load_failed(&LoadPath::new("x.rb"), "syntax error"));
    assert_eq!(ns.autoload_path("X"), Some(LoadPath::new("x.rb")));

    let second = engine.read(&ns, &name, &OwnLookup).unwrap_err();
    assert_eq!(second, first);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unit_that_defines_nothing_reaches_missing_hook() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");
    ns.set_missing_hook(Arc::new(|_: &Arc<Namespace>, name: Symbol| -> ResolveResult<Value> {
        Ok(Value::Symbol(name))
    }));

    let loader = Arc::new(FeatureLoader::new());
    loader.register("x.rb", |_: &LoadPath| Ok(()));
    let engine = resolver(loader);

    let value = engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap();
    assert_eq!(value, Value::Symbol(Symbol::new("X")));
    // The hook succeeded, so the marker stays consumed
    assert!(!ns.is_defined("X"));
}

#[test]
fn test_hook_failure_after_load_restores_marker() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");

    let loader = Arc::new(FeatureLoader::new());
    loader.register("x.rb", |_: &LoadPath| Ok(()));
    let engine = resolver(loader);

    let err = engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap_err();
    assert!(matches!(err, ResolveError::NameNotFound { .. }));
    assert_eq!(ns.autoload_path("X"), Some(LoadPath::new("x.rb")));
}

#[test]
fn test_read_of_same_name_during_load_does_not_reenter() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");

    let loader = Arc::new(FeatureLoader::new());
    let engine: Arc<ConstantResolver> = Arc::new(resolver(loader.clone()));
    let inner_engine: Weak<ConstantResolver> = Arc::downgrade(&engine);
    let target = ns.clone();
    loader.register("x.rb", move |_: &LoadPath| {
        let engine = inner_engine.upgrade().expect("engine alive");
        // The marker is gone while loading: the nested read is a plain miss
        let nested = engine.read(&target, &Name::new("X"), &OwnLookup);
        assert!(matches!(nested, Err(ResolveError::NameNotFound { .. })));

        target.set_constant("X", Value::Long(7));
        Ok(())
    });

    assert_eq!(engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap(), Value::Long(7));
    assert_eq!(loader.load_count(&LoadPath::new("x.rb")), 1);
}

#[test]
fn test_autoload_in_ancestor_restored_on_declaring_namespace() {
    let base = Namespace::root("Base");
    base.autoload("X", "x.rb");
    let child = Namespace::with_parent("Child", &base);

    let loader: Arc<dyn Loader> = Arc::new(|path: &LoadPath| -> ResolveResult<()> {
        Err(ResolveError::load_failed(path, "boom"))
    });
    let engine = resolver(loader);

    assert!(engine.read(&child, &Name::new("X"), &AncestorLookup).is_err());
    assert_eq!(base.autoload_path("X"), Some(LoadPath::new("x.rb")));
    assert!(!child.is_defined("X"));
}

#[test]
fn test_autoload_in_ancestor_resolves_from_start_namespace() {
    let base = Namespace::root("Base");
    base.autoload("X", "x.rb");
    let child = Namespace::with_parent("Child", &base);

    let loader = Arc::new(FeatureLoader::new());
    let target = base.clone();
    loader.register("x.rb", move |_: &LoadPath| {
        target.set_constant("X", Value::Long(1));
        Ok(())
    });
    let engine = resolver(loader);

    assert_eq!(
        engine.read(&child, &Name::new("X"), &AncestorLookup).unwrap(),
        Value::Long(1)
    );
}

#[test]
fn test_chained_autoload() {
    let ns = Namespace::root("M");
    ns.autoload("X", "first.rb");

    let loader = Arc::new(FeatureLoader::new());
    let first = ns.clone();
    loader.register("first.rb", move |_: &LoadPath| {
        // The first unit only defers to a second one
        first.autoload("X", "second.rb");
        Ok(())
    });
    let second = ns.clone();
    loader.register("second.rb", move |_: &LoadPath| {
        second.set_constant("X", Value::from("done"));
        Ok(())
    });
    let engine = resolver(loader.clone());

    assert_eq!(engine.read(&ns, &Name::new("X"), &OwnLookup).unwrap(), Value::from("done"));
    assert_eq!(loader.load_count(&LoadPath::new("first.rb")), 1);
    assert_eq!(loader.load_count(&LoadPath::new("second.rb")), 1);
    assert!(ns.autoload_path("X").is_none());
}

#[test]
fn test_lookup_failure_after_load_propagates_and_restores() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");

    let lookups = AtomicUsize::new(0);
    let flaky = move |namespace: &Arc<Namespace>, name: &Name| -> ResolveResult<Option<Constant>> {
        if lookups.fetch_add(1, Ordering::SeqCst) == 0 {
            OwnLookup.lookup(namespace, name)
        } else {
            Err(ResolveError::Lookup("table unavailable".into()))
        }
    };
    let loader = Arc::new(FeatureLoader::new());
    loader.register("x.rb", |_: &LoadPath| Ok(()));
    let engine = resolver(loader);

    let err = engine.read(&ns, &Name::new("X"), &flaky).unwrap_err();
    assert_eq!(err, ResolveError::Lookup("table unavailable".into()));
    assert_eq!(ns.autoload_path("X"), Some(LoadPath::new("x.rb")));
}

#[test]
fn test_panicking_loader_restores_marker() {
    let ns = Namespace::root("M");
    ns.autoload("X", "x.rb");
    let loader: Arc<dyn Loader> = Arc::new(|_: &LoadPath| -> ResolveResult<()> {
        panic!("interrupted")
    });
    let engine = resolver(loader);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        engine.read(&ns, &Name::new("X"), &OwnLookup)
    }));
    assert!(outcome.is_err());
    assert_eq!(ns.autoload_path("X"), Some(LoadPath::new("x.rb")));
}

#[test]
fn test_missing_name_raises_with_name() {
    let m = Namespace::root("M");
    let engine = resolver(forbidden_loader());

    let err = engine
        .resolve(&m, &Name::new("Foo"), None, &OwnLookup)
        .unwrap_err();
    match &err {
        ResolveError::NameNotFound { name, .. } => assert_eq!(*name, "Foo"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("Foo"));
}

#[test]
fn test_missing_name_hook_receives_symbol() {
    let m = Namespace::root("M");
    m.set_missing_hook(Arc::new(|ns: &Arc<Namespace>, name: Symbol| -> ResolveResult<Value> {
        Ok(Value::string(&format!("{}::{}?", ns.name(), name)))
    }));
    let engine = resolver(forbidden_loader());

    assert_eq!(
        engine.read(&m, &Name::new("Foo"), &OwnLookup).unwrap(),
        Value::from("M::Foo?")
    );
}

#[test]
fn test_distinct_name_copies_share_cache_entry() {
    let m = Namespace::root("M");
    m.set_missing_hook(Arc::new(|_: &Arc<Namespace>, name: Symbol| -> ResolveResult<Value> {
        Ok(Value::Symbol(name))
    }));
    let engine = resolver(forbidden_loader());

    let first = Name::from(String::from("Foo"));
    let second = Name::from(String::from("Foo"));
    assert!(!first.same_identity(&second));

    let a = engine.read(&m, &first, &OwnLookup).unwrap();
    let b = engine.read(&m, &second, &OwnLookup).unwrap();
    assert_eq!(a, b);

    let stats = engine.missing_name_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_missing_name_cache_overflow_keeps_results() {
    let m = Namespace::root("M");
    m.set_missing_hook(Arc::new(|_: &Arc<Namespace>, name: Symbol| -> ResolveResult<Value> {
        Ok(Value::Symbol(name))
    }));
    let config = CacheConfig::default().with_constant_cache(NonZeroUsize::new(2).unwrap());
    let engine = ConstantResolver::new(forbidden_loader(), &config);

    for text in ["A", "B", "C", "A", "B"] {
        let value = engine.read(&m, &Name::new(text), &OwnLookup).unwrap();
        assert_eq!(value, Value::Symbol(Symbol::new(text)));
    }
    assert!(engine.is_missing_name_cache_disabled());
    assert_eq!(engine.missing_name_stats().uncached, 2);
}
