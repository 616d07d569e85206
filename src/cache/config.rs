//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before least recently used ones are evicted.
    pub max_capacity: u64,

    /// Entries not read within this duration are evicted.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1024,
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set time-to-idle for cache entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }

    /// Config for resolved placeholder values.
    ///
    /// Freshness is decided per placeholder on read; the idle timeout only
    /// reclaims entries for contexts that stopped asking (players that left).
    pub fn resolved_values(max_capacity: u64) -> Self {
        Self::with_capacity(max_capacity).tti(Duration::from_secs(600))
    }
}
