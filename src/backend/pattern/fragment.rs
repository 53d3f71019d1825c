//! Evaluated pattern fragments.

use std::fmt;
use std::sync::Arc;

use crate::backend::cache::CacheKey;

use super::{Encoding, PatternResult};

/// One evaluated piece of an interpolated pattern: bytes plus encoding.
///
/// Bytes are shared, so a fragment produced from the same underlying buffer
/// (for example a literal part of the pattern) is identical to the previous
/// evaluation, not merely equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    bytes: Arc<[u8]>,
    encoding: Encoding,
}

impl Fragment {
    pub fn new(bytes: impl Into<Arc<[u8]>>, encoding: Encoding) -> Self {
        Self {
            bytes: bytes.into(),
            encoding,
        }
    }

    pub fn utf8(text: &str) -> Self {
        Self::new(text.as_bytes(), Encoding::Utf8)
    }

    pub fn binary(bytes: &[u8]) -> Self {
        Self::new(bytes, Encoding::Binary)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_ascii_only(&self) -> bool {
        self.bytes.is_ascii()
    }

    /// Same buffer and same encoding.
    pub fn same_identity(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes) && self.encoding == other.encoding
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fragment({:?}, {})",
            String::from_utf8_lossy(&self.bytes),
            self.encoding
        )
    }
}

impl CacheKey for Vec<Fragment> {
    fn same_identity(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_identity(b))
    }

    fn content_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// Produces a fragment each time a pattern is built. Evaluation may have side
/// effects and may fail.
pub trait FragmentSource {
    fn evaluate(&self) -> PatternResult<Fragment>;
}

/// A literal part: evaluates to itself.
impl FragmentSource for Fragment {
    fn evaluate(&self) -> PatternResult<Fragment> {
        Ok(self.clone())
    }
}

impl<F> FragmentSource for F
where
    F: Fn() -> PatternResult<Fragment>,
{
    fn evaluate(&self) -> PatternResult<Fragment> {
        self()
    }
}
