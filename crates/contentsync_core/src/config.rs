//! Configuration for the dependency resolver.

use contentsync_model::DEFAULT_LOCALE;

/// Default traversal depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Configuration for dependency resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Items at this depth or deeper are not fetched.
    pub max_depth: usize,
    /// Locale used for display titles in log output.
    pub default_locale: String,
}

impl ResolverConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the default locale.
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}
