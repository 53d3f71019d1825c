//! Per-call-site caches
//!
//! A call site remembers up to `limit` distinct keys together with the artifact
//! derived from each. When a key beyond the limit shows up, the site turns
//! *unstable*: its entries are dropped and every later request is computed from
//! scratch. That transition never reverts.
//!
//! ```text
//! empty ──miss──▶ 1 entry ──miss──▶ … ──miss──▶ limit entries ──miss──▶ unstable (forever)
//!                    │hit                           │hit
//!                    ▼                              ▼
//!                 artifact                       artifact
//! ```
//!
//! Keys are compared with `CacheKey::matches`: an identity check first, then a
//! full structural comparison. Both count as a hit.

use std::num::NonZeroUsize;

use smallvec::SmallVec;

/// Key comparison used by call-site caches.
pub trait CacheKey {
    /// Cheap check, e.g. pointer equality of shared buffers.
    fn same_identity(&self, other: &Self) -> bool;

    /// Full structural comparison.
    fn content_eq(&self, other: &Self) -> bool;

    #[inline]
    fn matches(&self, other: &Self) -> bool {
        self.same_identity(other) || self.content_eq(other)
    }
}

/// Statistics for call-site cache monitoring
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SiteStats {
    /// Requests answered from a stored entry
    pub hits: u64,
    /// Requests that found no entry while the site was still caching
    pub misses: u64,
    /// Requests served after the site turned unstable
    pub uncached: u64,
}

/// Outcome of probing a site cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<V> {
    Hit(V),
    Miss,
    Unstable,
}

/// Outcome of offering a freshly computed artifact to a site cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<V> {
    /// Stored as a new entry.
    Stored,
    /// An equal key was stored while the artifact was being computed; the
    /// earlier artifact is returned so callers keep sharing it.
    Existing(V),
    /// This key overflowed the limit; the site is now unstable.
    BecameUnstable,
    /// The site was already unstable; nothing stored.
    Rejected,
}

/// Bounded (key, artifact) table for one call site.
#[derive(Debug)]
pub struct SiteCache<K, V> {
    entries: SmallVec<[(K, V); 4]>,
    limit: NonZeroUsize,
    unstable: bool,
    stats: SiteStats,
}

impl<K: CacheKey, V: Clone> SiteCache<K, V> {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            entries: SmallVec::new(),
            limit,
            unstable: false,
            stats: SiteStats::default(),
        }
    }

    /// Look `key` up, recording the outcome in the statistics.
    pub fn probe(&mut self, key: &K) -> Probe<V> {
        if self.unstable {
            self.stats.uncached += 1;
            return Probe::Unstable;
        }
        match self.find(key) {
            Some(value) => {
                self.stats.hits += 1;
                Probe::Hit(value)
            }
            None => {
                self.stats.misses += 1;
                Probe::Miss
            }
        }
    }

    /// Offer an artifact computed after a `Probe::Miss`.
    pub fn admit(&mut self, key: K, value: V) -> Admission<V> {
        if self.unstable {
            return Admission::Rejected;
        }
        if let Some(existing) = self.find(&key) {
            return Admission::Existing(existing);
        }
        if self.entries.len() < self.limit.get() {
            self.entries.push((key, value));
            Admission::Stored
        } else {
            self.unstable = true;
            self.entries.clear();
            Admission::BecameUnstable
        }
    }

    fn find(&self, key: &K) -> Option<V> {
        self.entries
            .iter()
            .find(|(k, _)| k.matches(key))
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> NonZeroUsize {
        self.limit
    }

    pub fn is_unstable(&self) -> bool {
        self.unstable
    }

    pub fn stats(&self) -> SiteStats {
        self.stats
    }
}
