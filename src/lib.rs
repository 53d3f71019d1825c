/// LateBind - Late-Bound Name Resolution Library
///
/// This library provides the two call-site caches an interpreter needs on its
/// hottest dynamic paths: reading constants that may not exist yet, and building
/// patterns from text that is only known at run time.
///
/// # Architecture
///
/// 1. **Constant resolution** (`backend::resolve`)
///    - `LookupConstant` strategies find the current binding of a name
///    - `ConstantResolver` returns values directly, runs autoloads through a
///      `Loader`, and dispatches missing-name hooks
///    - A failed autoload puts its marker back so the next read retries it
///
/// 2. **Interpolated patterns** (`backend::pattern`)
///    - Fragments are evaluated on every build, then looked up in the site cache
///    - Hits return a fresh `Pattern` instance over a shared, immutable template
///    - Sites that see too many distinct inputs stop caching for good
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use latebind::backend::*;
///
/// let config = CacheConfig::default();
///
/// // Constants
/// let m = Namespace::root("M");
/// m.set_constant("Answer", Value::Long(42));
/// let resolver = ConstantResolver::new(Arc::new(FeatureLoader::new()), &config);
/// let value = resolver.read(&m, &Name::new("Answer"), &OwnLookup).unwrap();
/// assert_eq!(value, Value::Long(42));
///
/// // Patterns
/// let site = PatternSite::new(PatternOptions::new(), Arc::new(RegexBackend::new()), &config);
/// let mut pattern = site
///     .build(vec![Fragment::utf8("ab"), Fragment::utf8("+")])
///     .unwrap();
/// assert_eq!(pattern.match_at(b"xabbb", 0), Some(1..5));
/// ```
///
/// # Configuration
///
/// Cache limits come from `CacheConfig`: defaults, `LATEBIND_*` environment
/// variables, or a TOML file.

pub mod backend;

pub use backend::{
    CacheConfig, ConstantResolver, Fragment, Name, Namespace, Pattern, PatternSite, ResolveError,
    Value,
};
