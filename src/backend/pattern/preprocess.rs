//! Joining evaluated fragments into one pattern source.
//!
//! Fragments whose bytes are all ASCII fit any ASCII-compatible encoding and
//! never constrain the result. Fragments carrying non-ASCII bytes must agree
//! on one encoding, which becomes the encoding of the source.

use std::sync::Arc;

use super::{Encoding, Fragment, PatternError, PatternOptions, PatternResult};

/// Pattern source bytes with their encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub bytes: Arc<[u8]>,
    pub encoding: Encoding,
}

impl Source {
    pub fn new(bytes: impl Into<Arc<[u8]>>, encoding: Encoding) -> Self {
        Self {
            bytes: bytes.into(),
            encoding,
        }
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Concatenate `fragments` and settle the encoding of the result.
pub fn preprocess(fragments: &[Fragment], options: &PatternOptions) -> PatternResult<Source> {
    let mut bytes = Vec::with_capacity(fragments.iter().map(|f| f.bytes().len()).sum());
    let mut non_ascii: Option<Encoding> = None;

    for fragment in fragments {
        if fragment.encoding() == Encoding::Utf8 && std::str::from_utf8(fragment.bytes()).is_err() {
            return Err(PatternError::InvalidMultibyte {
                encoding: fragment.encoding(),
                source: String::from_utf8_lossy(fragment.bytes()).into_owned(),
            });
        }

        if !fragment.is_ascii_only() {
            if options.no_encoding && fragment.encoding() != Encoding::Binary {
                return Err(PatternError::NonAsciiWithoutEncoding {
                    encoding: fragment.encoding(),
                });
            }
            match non_ascii {
                None => non_ascii = Some(fragment.encoding()),
                Some(seen) if seen != fragment.encoding() => {
                    return Err(PatternError::EncodingMismatch {
                        left: seen,
                        right: fragment.encoding(),
                    });
                }
                Some(_) => {}
            }
        }

        bytes.extend_from_slice(fragment.bytes());
    }

    let encoding = if options.no_encoding {
        Encoding::Binary
    } else if let Some(encoding) = non_ascii {
        encoding
    } else if options.fixed_encoding {
        Encoding::Utf8
    } else {
        Encoding::UsAscii
    };

    Ok(Source::new(bytes, encoding))
}
