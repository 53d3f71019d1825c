//! Load units
//!
//! A `Loader` runs the unit of code registered for a path. Running it may do
//! anything: define constants in any namespace, resolve further constants,
//! trigger nested loads, or fail.
//!
//! `FeatureLoader` gives loads `require` semantics:
//! - a unit that completed successfully is never run again,
//! - a unit that is already running (a cyclic require) returns immediately,
//! - a unit that failed is not recorded, so the next require runs it again.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tracing::{debug, trace};

use crate::backend::models::LoadPath;

use super::{ResolveError, ResolveResult};

/// Runs load units by path.
pub trait Loader: Send + Sync {
    fn load(&self, path: &LoadPath) -> ResolveResult<()>;
}

impl<F> Loader for F
where
    F: Fn(&LoadPath) -> ResolveResult<()> + Send + Sync,
{
    fn load(&self, path: &LoadPath) -> ResolveResult<()> {
        self(path)
    }
}

/// Body of a registered load unit.
pub type LoadUnit = Arc<dyn Fn(&LoadPath) -> ResolveResult<()> + Send + Sync>;

/// Registry of load units with require-once bookkeeping.
#[derive(Default)]
pub struct FeatureLoader {
    units: DashMap<LoadPath, LoadUnit>,
    loaded: DashSet<LoadPath>,
    loading: DashSet<LoadPath>,
    runs: DashMap<LoadPath, usize>,
}

impl FeatureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the unit for `path`.
    pub fn register<F>(&self, path: impl Into<LoadPath>, unit: F)
    where
        F: Fn(&LoadPath) -> ResolveResult<()> + Send + Sync + 'static,
    {
        self.units.insert(path.into(), Arc::new(unit));
    }

    /// Run the unit for `path` unless it is already loaded or loading.
    ///
    /// Returns `Ok(true)` when the unit ran, `Ok(false)` when it was skipped.
    pub fn require(&self, path: &LoadPath) -> ResolveResult<bool> {
        if self.loaded.contains(path) {
            trace!(target: "latebind::resolve::loader", %path, "Already loaded");
            return Ok(false);
        }
        if !self.loading.insert(path.clone()) {
            debug!(target: "latebind::resolve::loader", %path, "Cyclic require skipped");
            return Ok(false);
        }
        let _loading = LoadingGuard {
            loading: &self.loading,
            path,
        };

        // Clone the unit out so no map guard is held while it runs
        let unit = self
            .units
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ResolveError::load_failed(path, "cannot load such file"))?;

        *self.runs.entry(path.clone()).or_insert(0) += 1;
        debug!(target: "latebind::resolve::loader", %path, "Loading");

        unit(path)?;
        self.loaded.insert(path.clone());
        Ok(true)
    }

    pub fn is_loaded(&self, path: &LoadPath) -> bool {
        self.loaded.contains(path)
    }

    /// How many times the unit for `path` has actually run.
    pub fn load_count(&self, path: &LoadPath) -> usize {
        self.runs.get(path).map(|n| *n).unwrap_or(0)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

impl Loader for FeatureLoader {
    fn load(&self, path: &LoadPath) -> ResolveResult<()> {
        self.require(path).map(|_| ())
    }
}

struct LoadingGuard<'a> {
    loading: &'a DashSet<LoadPath>,
    path: &'a LoadPath,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.remove(self.path);
    }
}
