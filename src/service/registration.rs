//! Placeholder registration requests.

use std::time::Duration;

use crate::callbacks::CallbackRef;
use crate::placeholder::{CacheScope, ContextKind};

/// Everything needed to register a placeholder against an exported callback.
///
/// ## Example
///
/// ```rust
/// use placeholder_engine::{CallbackRef, ContextKind, Registration};
///
/// let registration = Registration::new(
///     ContextKind::Actor,
///     "js",
///     "actor_pos",
///     CallbackRef::new("JSPH", "actorPos"),
/// )
/// .cache_seconds(5);
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    pub kind: ContextKind,
    pub namespace: String,
    pub token: String,
    pub callback: CallbackRef,
    pub cache_duration: Duration,
    pub cache_scope: CacheScope,
}

impl Registration {
    /// An uncached registration.
    pub fn new(
        kind: ContextKind,
        namespace: impl Into<String>,
        token: impl Into<String>,
        callback: CallbackRef,
    ) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            token: token.into(),
            callback,
            cache_duration: Duration::ZERO,
            cache_scope: CacheScope::default(),
        }
    }

    /// Cache resolved values for `seconds` (0 disables caching).
    #[must_use]
    pub fn cache_seconds(self, seconds: u64) -> Self {
        self.cache_duration(Duration::from_secs(seconds))
    }

    #[must_use]
    pub fn cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = duration;
        self
    }

    #[must_use]
    pub fn cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }
}
