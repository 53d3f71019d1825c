//! Interpolated patterns
//!
//! Building a pattern from runtime fragments goes through these stages:
//!
//! ```text
//! FragmentSource* ──evaluate──▶ [Fragment] ──preprocess──▶ Source
//!        ──PatternBackend::compile──▶ CompiledPattern ──▶ PatternTemplate ──▶ Pattern
//! ```
//!
//! `PatternSite` wraps the pipeline in a per-call-site cache keyed by the
//! evaluated fragment sequence.

mod compiler;
mod encoding;
mod fragment;
mod options;
mod preprocess;
mod site;
mod template;

use std::fmt;

pub use compiler::{CompiledPattern, Matcher, PatternBackend, RegexBackend, RegexMatcher};
pub use encoding::{is_seven_bit, Encoding};
pub use fragment::{Fragment, FragmentSource};
pub use options::PatternOptions;
pub use preprocess::{preprocess, Source};
pub use site::{compile_fragments, PatternSite, UNSTABLE_ADVISORY};
pub use template::{MatchState, Pattern, PatternTemplate};

/// Result type for pattern construction.
pub type PatternResult<T> = Result<T, PatternError>;

/// Errors raised while building a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The backend rejected the source.
    Syntax { source: String, message: String },
    /// Two fragments carry non-ASCII bytes in different encodings.
    EncodingMismatch { left: Encoding, right: Encoding },
    /// Non-ASCII text in a pattern built without an encoding.
    NonAsciiWithoutEncoding { encoding: Encoding },
    /// Bytes that are not valid in their declared encoding.
    InvalidMultibyte { encoding: Encoding, source: String },
    /// Unknown or conflicting option flag.
    InvalidOption(char),
    /// A fragment evaluator failed.
    Fragment(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Syntax { source, message } => {
                write!(f, "{}: /{}/", message, source)
            }
            PatternError::EncodingMismatch { left, right } => {
                write!(f, "encoding mismatch in dynamic regexp : {} and {}", left, right)
            }
            PatternError::NonAsciiWithoutEncoding { encoding } => write!(
                f,
                "/.../n has a non escaped non ASCII character in non ASCII-8BIT script ({})",
                encoding
            ),
            PatternError::InvalidMultibyte { encoding, source } => {
                write!(f, "invalid multibyte character ({}): /{}/", encoding, source)
            }
            PatternError::InvalidOption(flag) => write!(f, "unknown regexp option: {}", flag),
            PatternError::Fragment(msg) => write!(f, "Fragment evaluation failed: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {}
