//! Interpolated pattern call sites
//!
//! A `PatternSite` stands for one place in a program that builds a pattern out
//! of runtime-evaluated fragments, such as `/#{prefix}-\d+/i`. Each build:
//!
//! 1. evaluates every fragment, left to right, before looking at the cache;
//! 2. on a hit returns a fresh instance of the cached template;
//! 3. on a miss compiles, stores the template while the site is under its
//!    limit, and returns an instance;
//! 4. once more distinct fragment sequences than the limit have been seen, the
//!    site drops its entries, advises once that it is unstable, and compiles
//!    every later build from scratch.
//!
//! A failed compilation leaves the cache exactly as it was.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::backend::cache::{Admission, Probe, SiteCache, SiteStats};
use crate::backend::config::CacheConfig;
use crate::backend::warning::{TracingSink, WarningSink};

use super::{
    is_seven_bit, preprocess, Encoding, Fragment, FragmentSource, Pattern, PatternBackend,
    PatternOptions, PatternResult, PatternTemplate,
};

pub const UNSTABLE_ADVISORY: &str = "unstable interpolated regexps are not optimized";

/// Cache state of one interpolated pattern call site.
pub struct PatternSite {
    options: PatternOptions,
    backend: Arc<dyn PatternBackend>,
    sink: Arc<dyn WarningSink>,
    warn_unstable: bool,
    cache: Mutex<SiteCache<Vec<Fragment>, Arc<PatternTemplate>>>,
}

impl PatternSite {
    /// Advisories go to `tracing`; use `with_sink` to redirect them.
    pub fn new(
        options: PatternOptions,
        backend: Arc<dyn PatternBackend>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            options,
            backend,
            sink: Arc::new(TracingSink),
            warn_unstable: config.warn_unstable,
            cache: Mutex::new(SiteCache::new(config.default_cache)),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Evaluate `sources` in order, then build from the results.
    pub fn build_from(&self, sources: &[&dyn FragmentSource]) -> PatternResult<Pattern> {
        let fragments = sources
            .iter()
            .map(|source| source.evaluate())
            .collect::<PatternResult<Vec<_>>>()?;
        self.build(fragments)
    }

    /// Build from already evaluated fragments.
    pub fn build(&self, fragments: Vec<Fragment>) -> PatternResult<Pattern> {
        let probe = self.cache.lock().probe(&fragments);
        match probe {
            Probe::Hit(template) => {
                trace!(target: "latebind::pattern::site", "Cache hit");
                Ok(template.instantiate())
            }
            Probe::Unstable => {
                let template = compile_fragments(&fragments, &self.options, self.backend.as_ref())?;
                Ok(Arc::new(template).instantiate())
            }
            Probe::Miss => {
                let template = Arc::new(compile_fragments(
                    &fragments,
                    &self.options,
                    self.backend.as_ref(),
                )?);
                let admission = self.cache.lock().admit(fragments, template.clone());
                match admission {
                    Admission::Stored => {
                        debug!(target: "latebind::pattern::site", "Cached new template");
                        Ok(template.instantiate())
                    }
                    Admission::Existing(existing) => Ok(existing.instantiate()),
                    Admission::BecameUnstable => {
                        debug!(target: "latebind::pattern::site", "Site became unstable");
                        if self.warn_unstable {
                            self.sink.advise(UNSTABLE_ADVISORY);
                        }
                        Ok(template.instantiate())
                    }
                    Admission::Rejected => Ok(template.instantiate()),
                }
            }
        }
    }

    pub fn stats(&self) -> SiteStats {
        self.cache.lock().stats()
    }

    pub fn is_unstable(&self) -> bool {
        self.cache.lock().is_unstable()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Compile a fragment sequence into a template, without any caching.
pub fn compile_fragments(
    fragments: &[Fragment],
    options: &PatternOptions,
    backend: &dyn PatternBackend,
) -> PatternResult<PatternTemplate> {
    let options = *options;
    let preprocessed = preprocess(fragments, &options)?;
    let compiled = backend.compile(&preprocessed, &options)?;

    let encoding = if options.no_encoding {
        if is_seven_bit(&preprocessed.bytes) {
            Encoding::UsAscii
        } else {
            Encoding::Binary
        }
    } else {
        compiled.source.encoding
    };

    Ok(PatternTemplate::new(
        compiled.matcher,
        compiled.source.bytes,
        encoding,
        options,
    ))
}
