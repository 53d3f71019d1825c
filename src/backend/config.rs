//! Cache limit configuration
//!
//! Limits are read once when a call site is created. They come from, in order of
//! use:
//! - `CacheConfig::default()` (8 entries per site, advisories on)
//! - environment variables (`LATEBIND_CONSTANT_CACHE`, `LATEBIND_DEFAULT_CACHE`,
//!   `LATEBIND_WARN_UNSTABLE`)
//! - a TOML file with a `[cache]` table
//!
//! ```toml
//! [cache]
//! constant = 4
//! default = 2
//! warn-unstable = false
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONSTANT_CACHE: usize = 8;
pub const DEFAULT_CACHE: usize = 8;

/// Errors raised while loading a configuration file.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// File could not be read.
    Io(PathBuf, String),
    /// File is not valid TOML or has unexpected fields.
    Parse(String),
    /// A cache limit was zero.
    InvalidLimit(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => {
                write!(f, "Failed to read '{}': {}", path.display(), err)
            }
            ConfigError::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidLimit(key) => {
                write!(f, "Cache limit '{}' must be a positive integer", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Call-site cache limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Distinct names remembered by a constant site's missing-name path.
    pub constant_cache: NonZeroUsize,
    /// Distinct fragment sequences remembered by a pattern site.
    pub default_cache: NonZeroUsize,
    /// Emit an advisory when a site gives up caching.
    pub warn_unstable: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            constant_cache: non_zero(DEFAULT_CONSTANT_CACHE),
            default_cache: non_zero(DEFAULT_CACHE),
            warn_unstable: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    cache: CacheSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct CacheSection {
    constant: Option<usize>,
    default: Option<usize>,
    warn_unstable: Option<bool>,
}

impl CacheConfig {
    /// Defaults overridden by any valid `LATEBIND_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            constant_cache: env_limit("LATEBIND_CONSTANT_CACHE")
                .unwrap_or(defaults.constant_cache),
            default_cache: env_limit("LATEBIND_DEFAULT_CACHE").unwrap_or(defaults.default_cache),
            warn_unstable: std::env::var("LATEBIND_WARN_UNSTABLE")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.warn_unstable),
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();
        let section = file.cache;

        Ok(Self {
            constant_cache: checked_limit(section.constant, "constant")?
                .unwrap_or(defaults.constant_cache),
            default_cache: checked_limit(section.default, "default")?
                .unwrap_or(defaults.default_cache),
            warn_unstable: section.warn_unstable.unwrap_or(defaults.warn_unstable),
        })
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;
        Self::from_toml_str(&text)
    }

    pub fn with_constant_cache(mut self, limit: NonZeroUsize) -> Self {
        self.constant_cache = limit;
        self
    }

    pub fn with_default_cache(mut self, limit: NonZeroUsize) -> Self {
        self.default_cache = limit;
        self
    }

    pub fn with_warn_unstable(mut self, warn: bool) -> Self {
        self.warn_unstable = warn;
        self
    }
}

fn non_zero(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

fn env_limit(var: &str) -> Option<NonZeroUsize> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .and_then(NonZeroUsize::new)
}

fn checked_limit(
    value: Option<usize>,
    key: &'static str,
) -> Result<Option<NonZeroUsize>, ConfigError> {
    match value {
        None => Ok(None),
        Some(n) => NonZeroUsize::new(n)
            .map(Some)
            .ok_or(ConfigError::InvalidLimit(key)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
