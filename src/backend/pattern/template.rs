//! Compiled pattern templates and their instances
//!
//! A `PatternTemplate` is immutable once built and shared through an `Arc`.
//! Match progress lives in `Pattern`, so every instance handed out by a call
//! site can be mutated without affecting any other instance of the same
//! template.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::{Encoding, Matcher, PatternOptions};

/// Immutable compiled pattern.
#[derive(Debug)]
pub struct PatternTemplate {
    matcher: Arc<dyn Matcher>,
    source: Arc<[u8]>,
    encoding: Encoding,
    options: PatternOptions,
}

impl PatternTemplate {
    pub fn new(
        matcher: Arc<dyn Matcher>,
        source: Arc<[u8]>,
        encoding: Encoding,
        options: PatternOptions,
    ) -> Self {
        Self {
            matcher,
            source,
            encoding,
            options,
        }
    }

    /// A fresh instance with no match state.
    pub fn instantiate(self: &Arc<Self>) -> Pattern {
        Pattern {
            template: self.clone(),
            state: MatchState::default(),
        }
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn options(&self) -> &PatternOptions {
        &self.options
    }

    pub fn matcher(&self) -> &Arc<dyn Matcher> {
        &self.matcher
    }
}

/// Per-instance match progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchState {
    last_match: Option<Range<usize>>,
    attempts: usize,
}

/// A usable pattern: shared template plus its own match state.
#[derive(Debug, Clone)]
pub struct Pattern {
    template: Arc<PatternTemplate>,
    state: MatchState,
}

impl Pattern {
    /// Search from byte offset `start`, recording the outcome as this
    /// instance's last match.
    pub fn match_at(&mut self, haystack: &[u8], start: usize) -> Option<Range<usize>> {
        let found = self.template.matcher.find_at(haystack, start);
        self.state.attempts += 1;
        self.state.last_match = found.clone();
        found
    }

    /// Side-effect free test.
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.template.matcher.find_at(haystack, 0).is_some()
    }

    pub fn last_match(&self) -> Option<Range<usize>> {
        self.state.last_match.clone()
    }

    /// Number of `match_at` calls made on this instance.
    pub fn attempts(&self) -> usize {
        self.state.attempts
    }

    pub fn reset(&mut self) {
        self.state = MatchState::default();
    }

    pub fn template(&self) -> &Arc<PatternTemplate> {
        &self.template
    }

    /// Whether both instances were produced from the same template.
    pub fn shares_template(&self, other: &Pattern) -> bool {
        Arc::ptr_eq(&self.template, &other.template)
    }

    pub fn source(&self) -> &[u8] {
        self.template.source()
    }

    pub fn encoding(&self) -> Encoding {
        self.template.encoding()
    }

    pub fn options(&self) -> &PatternOptions {
        self.template.options()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}",
            String::from_utf8_lossy(self.source()),
            self.options().flag_string()
        )
    }
}
