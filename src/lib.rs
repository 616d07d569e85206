//! Placeholder Engine - named, context-aware text substitution.
//!
//! Plugins export callbacks and register placeholders against them; hosts
//! then resolve templates such as `"Hi {player:name}, time={srv:clock}"` for a
//! server, a player or any other actor.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `placeholder` - Contexts, definitions and the placeholder registry
//! - `callbacks` - Exported callback table and guarded dispatch
//! - `cache` - Time-windowed resolution cache on top of Moka
//! - `resolver` - Marker substitution
//! - `service` - The engine instance plugins talk to
//! - `scheduler` - Periodic refresh tasks
//! - `utils` - Marker parser and value formatting

pub mod cache;
pub mod callbacks;
pub mod config;
pub mod placeholder;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod utils;

pub use callbacks::{CallbackRef, CallbackResult, PlaceholderCallback, Signature};
pub use config::{Config, EngineConfig, FallbackPolicy};
pub use placeholder::{
    CacheScope, CallbackError, Context, ContextKind, PlaceholderInfo, RegisterError, Subject,
};
pub use scheduler::{CancelHandle, PeriodicTask, Scheduler, TokioScheduler};
pub use service::{PlaceholderService, Registration};
