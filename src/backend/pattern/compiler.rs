//! Pattern compiler backends
//!
//! A backend turns a preprocessed `Source` into a `Matcher`. It may also settle
//! the encoding of the source: the compiled result carries the source the
//! template should record, which is not necessarily the one passed in.
//!
//! `RegexBackend` compiles with the `regex` crate's byte-oriented engine.
//! Single-byte sources are compiled with Unicode mode off and every byte at or
//! above 0x80 written as a `\xHH` escape, so arbitrary bytes can be matched.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use regex::bytes::{Regex, RegexBuilder};

use super::{Encoding, PatternError, PatternOptions, PatternResult, Source};

/// Compiled matching automaton.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Leftmost match starting the search at byte offset `start`.
    fn find_at(&self, haystack: &[u8], start: usize) -> Option<Range<usize>>;
}

/// Output of a backend.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub matcher: Arc<dyn Matcher>,
    /// Source as resolved by the backend.
    pub source: Source,
}

/// Pluggable pattern compiler.
pub trait PatternBackend: Send + Sync {
    fn compile(&self, source: &Source, options: &PatternOptions) -> PatternResult<CompiledPattern>;
}

/// Backend built on `regex::bytes`.
#[derive(Debug, Clone, Default)]
pub struct RegexBackend {
    size_limit: Option<usize>,
}

impl RegexBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the compiled program size, in bytes.
    pub fn with_size_limit(mut self, bytes: usize) -> Self {
        self.size_limit = Some(bytes);
        self
    }
}

impl PatternBackend for RegexBackend {
    fn compile(&self, source: &Source, options: &PatternOptions) -> PatternResult<CompiledPattern> {
        let unicode = source.encoding == Encoding::Utf8;
        let text = regex_text(source)?;

        let mut builder = RegexBuilder::new(&text);
        builder
            .case_insensitive(options.ignore_case)
            .dot_matches_new_line(options.multiline)
            .ignore_whitespace(options.extended)
            // `^` and `$` are always line anchors
            .multi_line(true)
            .unicode(unicode);
        if let Some(limit) = self.size_limit {
            builder.size_limit(limit);
        }

        let regex = builder.build().map_err(|e| PatternError::Syntax {
            source: source.to_string_lossy(),
            message: e.to_string(),
        })?;

        let encoding = if source.encoding == Encoding::UsAscii
            && !options.no_encoding
            && has_unicode_escape(&source.bytes)
        {
            Encoding::Utf8
        } else {
            source.encoding
        };

        Ok(CompiledPattern {
            matcher: Arc::new(RegexMatcher(regex)),
            source: Source::new(source.bytes.clone(), encoding),
        })
    }
}

/// `Matcher` over a compiled `regex::bytes::Regex`.
#[derive(Debug, Clone)]
pub struct RegexMatcher(Regex);

impl RegexMatcher {
    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl Matcher for RegexMatcher {
    fn find_at(&self, haystack: &[u8], start: usize) -> Option<Range<usize>> {
        if start > haystack.len() {
            return None;
        }
        self.0.find_at(haystack, start).map(|m| m.range())
    }
}

fn regex_text(source: &Source) -> PatternResult<String> {
    if source.encoding == Encoding::Utf8 {
        return std::str::from_utf8(&source.bytes)
            .map(str::to_string)
            .map_err(|_| PatternError::InvalidMultibyte {
                encoding: Encoding::Utf8,
                source: source.to_string_lossy(),
            });
    }

    let mut text = String::with_capacity(source.bytes.len());
    for &b in source.bytes.iter() {
        if b.is_ascii() {
            text.push(b as char);
        } else {
            text.push_str(&format!("\\x{:02X}", b));
        }
    }
    Ok(text)
}

/// Whether the source contains an unescaped `\u` escape.
fn has_unicode_escape(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        if b == b'\\' {
            match iter.next() {
                Some(b'u') => return true,
                Some(_) | None => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(text: &[u8], encoding: Encoding, flags: &str) -> PatternResult<CompiledPattern> {
        RegexBackend::new().compile(
            &Source::new(text, encoding),
            &PatternOptions::parse(flags).unwrap(),
        )
    }

    #[test]
    fn test_compile_and_find() {
        let compiled = compile(b"b+", Encoding::UsAscii, "").unwrap();
        assert_eq!(compiled.matcher.find_at(b"abbbc", 0), Some(1..4));
        assert_eq!(compiled.matcher.find_at(b"abbbc", 4), None);
        assert_eq!(compiled.source.encoding, Encoding::UsAscii);
    }

    #[test]
    fn test_ignore_case() {
        let compiled = compile(b"abc", Encoding::UsAscii, "i").unwrap();
        assert_eq!(compiled.matcher.find_at(b"xABC", 0), Some(1..4));
    }

    #[test]
    fn test_multiline_dot_matches_newline() {
        let plain = compile(b"a.b", Encoding::UsAscii, "").unwrap();
        assert_eq!(plain.matcher.find_at(b"a\nb", 0), None);

        let multiline = compile(b"a.b", Encoding::UsAscii, "m").unwrap();
        assert_eq!(multiline.matcher.find_at(b"a\nb", 0), Some(0..3));
    }

    #[test]
    fn test_extended_ignores_whitespace() {
        let compiled = compile(b"a b # comment", Encoding::UsAscii, "x").unwrap();
        assert_eq!(compiled.matcher.find_at(b"ab", 0), Some(0..2));
    }

    #[test]
    fn test_binary_source_matches_raw_bytes() {
        let compiled = compile(&[b'a', 0xff], Encoding::Binary, "n").unwrap();
        assert_eq!(compiled.matcher.find_at(&[0x00, b'a', 0xff], 0), Some(1..3));
    }

    #[test]
    fn test_syntax_error() {
        let err = compile(b"(unclosed", Encoding::UsAscii, "").unwrap_err();
        match err {
            PatternError::Syntax { source, .. } => assert_eq!(source, "(unclosed"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unicode_escape_promotes_to_utf8() {
        let compiled = compile(br"\u0041", Encoding::UsAscii, "").unwrap();
        assert_eq!(compiled.source.encoding, Encoding::Utf8);

        let escaped = compile(br"\\u", Encoding::UsAscii, "").unwrap();
        assert_eq!(escaped.source.encoding, Encoding::UsAscii);
    }

    #[test]
    fn test_find_past_end() {
        let compiled = compile(b"a", Encoding::UsAscii, "").unwrap();
        assert_eq!(compiled.matcher.find_at(b"a", 5), None);
    }
}
