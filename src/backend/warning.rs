//! Advisory warnings
//!
//! Call sites report performance advisories (such as a pattern site giving up
//! caching) through a `WarningSink`. Advising never fails and never changes the
//! result of the operation that triggered it.

use parking_lot::Mutex;
use tracing::warn;

/// Fire-and-forget receiver for advisories.
pub trait WarningSink: Send + Sync {
    fn advise(&self, message: &str);
}

/// Forwards advisories to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn advise(&self, message: &str) {
        warn!(target: "latebind::advisory", "{}", message);
    }
}

/// Keeps every advisory in memory. Used by tests and embedders that surface
/// advisories themselves.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl WarningSink for CollectingSink {
    fn advise(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
