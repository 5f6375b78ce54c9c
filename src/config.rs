//! Engine configuration.

use crate::cache::DEFAULT_CACHE_TTL;
use std::time::Duration;

/// Configuration for a [`FlagEngine`](crate::engine::FlagEngine).
///
/// # Examples
///
/// ```
/// use flagship::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::default()
///     .with_cache_ttl(Duration::from_secs(30))
///     .with_capability("export")
///     .with_capability("bulk-import");
///
/// assert_eq!(config.cache_ttl, Duration::from_secs(30));
/// assert_eq!(config.capabilities.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum age of a cached record before it is refreshed
    pub cache_ttl: Duration,

    /// Named capability flags evaluated as a fixed set
    pub capabilities: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            capabilities: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Add a capability flag name.
    pub fn with_capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    /// Replace the capability flag set.
    pub fn with_capabilities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = names.into_iter().map(Into::into).collect();
        self
    }
}
