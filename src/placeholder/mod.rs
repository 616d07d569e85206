//! Placeholder model - contexts, definitions and the registry.

mod context;
mod definition;
mod error;
mod registry;

pub use context::{Context, ContextKind, Subject};
pub use definition::{
    CacheScope, PlaceholderDefinition, PlaceholderInfo, PlaceholderKey, validate_name,
};
pub use error::{CallbackError, RegisterError};
pub use registry::PlaceholderRegistry;
