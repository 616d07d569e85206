//! Configuration module.
//!
//! Loads configuration from environment variables (and a `.env` file, if
//! present). Every value has a default; unparsable values fall back to it.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// What a marker turns into when its callback fails.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Leave the marker text in place.
    #[default]
    Marker,
    /// Substitute the empty string.
    Empty,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on cached placeholder values.
    pub cache_capacity: u64,

    /// How long a callback may run before it counts as failed.
    /// Zero disables the timeout.
    pub callback_timeout: Duration,

    /// Log unresolved markers at `warn` instead of `debug`.
    pub debug: bool,

    pub fallback: FallbackPolicy,

    /// Honour `precision=`, `map=` and `bool_map=` options in parameters.
    pub formatting: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            callback_timeout: Duration::from_millis(2000),
            debug: false,
            fallback: FallbackPolicy::Marker,
            formatting: true,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from `PA_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fallback = match env::var("PA_FALLBACK")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "" => defaults.fallback,
            "empty" => FallbackPolicy::Empty,
            "marker" => FallbackPolicy::Marker,
            other => {
                warn!("Unknown PA_FALLBACK '{}', using marker", other);
                FallbackPolicy::Marker
            }
        };

        Self {
            cache_capacity: non_zero_or(
                "PA_CACHE_CAPACITY",
                parse_var("PA_CACHE_CAPACITY"),
                defaults.cache_capacity,
            ),
            callback_timeout: parse_var("PA_CALLBACK_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.callback_timeout),
            debug: parse_flag("PA_DEBUG").unwrap_or(defaults.debug),
            fallback,
            formatting: parse_flag("PA_FORMATTING").unwrap_or(defaults.formatting),
        }
    }
}

/// Demo application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,

    /// How often every online player's sidebar is refreshed.
    pub refresh_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            engine: EngineConfig::from_env(),
            refresh_interval: parse_var("PA_REFRESH_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(1000)),
        }
    }
}

fn parse_var(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}='{}': not a number", name, raw);
            None
        }
    }
}

/// A zero capacity would silently turn every cached placeholder into an
/// uncached one.
fn non_zero_or(name: &str, value: Option<u64>, default: u64) -> u64 {
    match value {
        Some(0) => {
            warn!("Ignoring {}=0: must be at least 1, using {}", name, default);
            default
        }
        Some(value) => value,
        None => default,
    }
}

fn parse_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring {}='{}': not a boolean", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.callback_timeout, Duration::from_secs(2));
        assert_eq!(config.fallback, FallbackPolicy::Marker);
        assert!(config.formatting);
        assert!(!config.debug);
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        assert_eq!(non_zero_or("PA_CACHE_CAPACITY", Some(0), 1024), 1024);
        assert_eq!(non_zero_or("PA_CACHE_CAPACITY", Some(64), 1024), 64);
        assert_eq!(non_zero_or("PA_CACHE_CAPACITY", None, 1024), 1024);
    }

    #[test]
    fn test_fallback_deserializes_lowercase() {
        let policy: FallbackPolicy = serde_json::from_str("\"empty\"").unwrap();
        assert_eq!(policy, FallbackPolicy::Empty);
    }
}
