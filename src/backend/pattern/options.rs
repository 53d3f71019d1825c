//! Pattern options (`/.../imxnu` flags).

use std::fmt;

use super::{PatternError, PatternResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PatternOptions {
    /// `i`
    pub ignore_case: bool,
    /// `m`: `.` also matches a newline.
    pub multiline: bool,
    /// `x`: whitespace and `#` comments in the source are ignored.
    pub extended: bool,
    /// `u`: the source keeps its fragments' encoding even when it is all ASCII.
    pub fixed_encoding: bool,
    /// `n`: no encoding; the source is scanned to pick US-ASCII or ASCII-8BIT.
    pub no_encoding: bool,
}

impl PatternOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse flag letters such as `"mix"`.
    pub fn parse(flags: &str) -> PatternResult<Self> {
        let mut options = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => options.ignore_case = true,
                'm' => options.multiline = true,
                'x' => options.extended = true,
                'u' => options.fixed_encoding = true,
                'n' => options.no_encoding = true,
                other => return Err(PatternError::InvalidOption(other)),
            }
        }
        if options.fixed_encoding && options.no_encoding {
            return Err(PatternError::InvalidOption('n'));
        }
        Ok(options)
    }

    /// Flags in display order, e.g. `"mix"`.
    pub fn flag_string(&self) -> String {
        let mut flags = String::new();
        if self.multiline {
            flags.push('m');
        }
        if self.ignore_case {
            flags.push('i');
        }
        if self.extended {
            flags.push('x');
        }
        if self.no_encoding {
            flags.push('n');
        }
        flags
    }
}

impl fmt::Display for PatternOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flag_string())
    }
}
