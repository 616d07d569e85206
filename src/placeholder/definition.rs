//! Placeholder definitions.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ContextKind, RegisterError};
use crate::callbacks::{CallbackRef, PlaceholderCallback};

/// How cached values of a placeholder are shared between contexts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// One cached value per player/actor.
    #[default]
    PerContext,
    /// One cached value for everyone.
    Shared,
}

/// Registry key: `(namespace, token)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderKey {
    pub namespace: String,
    pub token: String,
}

impl PlaceholderKey {
    pub fn new(namespace: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            token: token.into(),
        }
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}:{}}}", self.namespace, self.token)
    }
}

/// A registered placeholder. Immutable once it is in the registry.
#[derive(Debug, Clone)]
pub struct PlaceholderDefinition {
    /// Registration generation, assigned by the registry.
    pub(crate) id: u64,
    pub key: PlaceholderKey,
    pub kind: ContextKind,
    pub callback_ref: CallbackRef,
    pub callback: PlaceholderCallback,
    /// Zero disables caching.
    pub cache_duration: Duration,
    pub cache_scope: CacheScope,
    pub registered_at: DateTime<Utc>,
}

impl PlaceholderDefinition {
    pub fn new(
        key: PlaceholderKey,
        kind: ContextKind,
        callback_ref: CallbackRef,
        callback: PlaceholderCallback,
        cache_duration: Duration,
    ) -> Self {
        Self {
            id: 0,
            key,
            kind,
            callback_ref,
            callback,
            cache_duration,
            cache_scope: CacheScope::default(),
            registered_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn cache_scope(mut self, scope: CacheScope) -> Self {
        self.cache_scope = scope;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cached(&self) -> bool {
        !self.cache_duration.is_zero()
    }

    /// Identity under which a value computed for `identity` is cached.
    pub fn cache_identity<'a>(&self, identity: &'a str) -> &'a str {
        match (self.kind, self.cache_scope) {
            (ContextKind::Server, _) | (_, CacheScope::Shared) => "",
            _ => identity,
        }
    }

    pub fn info(&self) -> PlaceholderInfo {
        PlaceholderInfo {
            namespace: self.key.namespace.clone(),
            token: self.key.token.clone(),
            kind: self.kind,
            callback: self.callback_ref.to_string(),
            cache_seconds: self.cache_duration.as_secs(),
            cache_scope: self.cache_scope,
            registered_at: self.registered_at,
        }
    }
}

/// Serializable summary of a registered placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderInfo {
    pub namespace: String,
    pub token: String,
    pub kind: ContextKind,
    pub callback: String,
    pub cache_seconds: u64,
    pub cache_scope: CacheScope,
    pub registered_at: DateTime<Utc>,
}

/// Check a namespace or token against the marker grammar.
pub fn validate_name(name: &str) -> Result<(), RegisterError> {
    if name.is_empty() || name.contains(['{', '}', ':']) {
        return Err(RegisterError::InvalidName(name.to_string()));
    }
    Ok(())
}
