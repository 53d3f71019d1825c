// Backend for late-bound names and interpolated patterns
//
// Two call-site mechanisms share one caching principle (`cache`):
// - `resolve`: constant reads with autoload and missing-name hooks
// - `pattern`: patterns compiled from runtime-evaluated fragments

pub mod cache;
pub mod config;
pub mod models;
pub mod namespace;
pub mod pattern;
pub mod resolve;
pub mod symbol;
pub mod warning;

pub use cache::{Admission, CacheKey, Probe, SiteCache, SiteStats};
pub use config::{CacheConfig, ConfigError};
pub use models::{Binding, LoadPath, Value};
pub use namespace::{Constant, MissingNameHook, Namespace, NamespaceId};
pub use pattern::{
    compile_fragments, Encoding, Fragment, FragmentSource, Pattern, PatternBackend, PatternError,
    PatternOptions, PatternResult, PatternSite, PatternTemplate, RegexBackend, UNSTABLE_ADVISORY,
};
pub use resolve::{
    AncestorLookup, ConstantResolver, FeatureLoader, Loader, LookupConstant, OwnLookup,
    ResolveError, ResolveResult,
};
pub use symbol::{intern, Name, Symbol};
pub use warning::{CollectingSink, TracingSink, WarningSink};
