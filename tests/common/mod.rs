//! Test utilities for latebind integration tests
//!
//! This module provides shared utilities for integration tests, including:
//! - A scripted loader that records every load request
//! - A missing-name hook that echoes the requested name
//! - Pattern site construction with a collecting warning sink

#![allow(dead_code)]

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;

use latebind::backend::*;

type Script = Arc<dyn Fn(&LoadPath) -> ResolveResult<()> + Send + Sync>;

/// Loader driven by per-path scripts. Unlike `FeatureLoader` it runs a script
/// on every request, which makes retry behaviour directly observable.
#[derive(Default)]
pub struct ScriptedLoader {
    scripts: Mutex<HashMap<LoadPath, Script>>,
    requests: Mutex<Vec<LoadPath>>,
}

impl ScriptedLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on<F>(&self, path: &str, script: F)
    where
        F: Fn(&LoadPath) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.scripts
            .lock()
            .insert(LoadPath::new(path), Arc::new(script));
    }

    pub fn requests(&self) -> Vec<LoadPath> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        let path = LoadPath::new(path);
        self.requests.lock().iter().filter(|p| **p == path).count()
    }
}

impl Loader for ScriptedLoader {
    fn load(&self, path: &LoadPath) -> ResolveResult<()> {
        self.requests.lock().push(path.clone());
        let script = self.scripts.lock().get(path).cloned();
        match script {
            Some(script) => script(path),
            None => Err(ResolveError::load_failed(path, "cannot load such file")),
        }
    }
}

/// Hook returning the missing name as a symbol value.
pub fn echo_hook() -> Arc<dyn MissingNameHook> {
    Arc::new(|_: &Arc<Namespace>, name: Symbol| -> ResolveResult<Value> {
        Ok(Value::Symbol(name))
    })
}

pub fn limit(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("limit must be positive")
}

/// Pattern site with the given cache limit and flags, reporting to a
/// collecting sink.
pub fn pattern_site(cache: usize, flags: &str) -> (PatternSite, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let config = CacheConfig::default().with_default_cache(limit(cache));
    let site = PatternSite::new(
        PatternOptions::parse(flags).expect("valid flags"),
        Arc::new(RegexBackend::new()),
        &config,
    )
    .with_sink(sink.clone());
    (site, sink)
}

pub fn utf8_fragments(parts: &[&str]) -> Vec<Fragment> {
    parts.iter().map(|p| Fragment::utf8(p)).collect()
}
