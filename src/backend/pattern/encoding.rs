//! Encoding tags and the 7-bit source scan.

use std::fmt;

/// How the bytes of a fragment or pattern source map to characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    /// 7-bit only.
    UsAscii,
    /// Raw bytes, every value allowed (ASCII-8BIT).
    Binary,
    Iso8859_1,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::UsAscii => "US-ASCII",
            Encoding::Binary => "ASCII-8BIT",
            Encoding::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// One byte per character.
    pub fn is_single_byte(&self) -> bool {
        !matches!(self, Encoding::Utf8)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True when every byte of a pattern source is below 0x80, counting `\xH` and
/// `\xHH` escapes by the byte value they denote.
///
/// A `\x` not followed by a hex digit is not an escape and is scanned as two
/// ordinary bytes.
pub fn is_seven_bit(bytes: &[u8]) -> bool {
    let mut n = 0;
    while n < bytes.len() {
        let b = bytes[n];
        if b >= 0x80 {
            return false;
        }
        if b == b'\\' && bytes.get(n + 1) == Some(&b'x') {
            let high = bytes.get(n + 2).and_then(|&d| hex_value(d));
            let low = bytes.get(n + 3).and_then(|&d| hex_value(d));
            match (high, low) {
                (Some(high), Some(low)) => {
                    if high * 16 + low > 0x7f {
                        return false;
                    }
                    n += 4;
                    continue;
                }
                // A single digit is at most 0xF
                (Some(_), None) => {
                    n += 3;
                    continue;
                }
                (None, _) => {}
            }
        }
        n += 1;
    }
    true
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|d| d as u8)
}
