//! Cache module - Resolved value caching using Moka.
//!
//! ## Architecture
//!
//! - `TypedCache` - Bounded, thread-safe wrapper over a Moka cache
//! - `CacheConfig` - Capacity and eviction settings for a `TypedCache`
//! - `ResolutionCache` - Placeholder values keyed by definition, context
//!   identity and parameter, expiring per the placeholder's cache duration
//!
//! Moka bounds memory. Freshness is checked on read against the engine
//! clock, which keeps expiry testable with tokio's paused time.

mod config;
mod layer;
mod typed;

pub use config::CacheConfig;
pub use layer::ResolutionCache;
pub use typed::TypedCache;
