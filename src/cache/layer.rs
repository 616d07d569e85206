//! Resolution cache - memoized callback results with per-placeholder expiry.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use tracing::debug;

use super::{CacheConfig, TypedCache};
use crate::callbacks::CallbackDispatcher;
use crate::placeholder::{CallbackError, Context, PlaceholderDefinition};

/// `(definition id, context identity, param)`.
///
/// The definition id changes on every registration, so values cached for an
/// unregistered placeholder can never leak into a new one with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    definition: u64,
    identity: String,
    param: String,
}

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    computed_at: Instant,
}

type InFlight = Shared<BoxFuture<'static, Result<String, CallbackError>>>;

/// Resolves placeholder values, caching them for the definition's duration.
pub struct ResolutionCache {
    values: TypedCache<ResolutionKey, CachedValue>,
    in_flight: DashMap<ResolutionKey, InFlight>,
    dispatcher: CallbackDispatcher,
}

impl ResolutionCache {
    pub fn new(config: CacheConfig, dispatcher: CallbackDispatcher) -> Self {
        Self {
            values: TypedCache::new("resolved_values", config),
            in_flight: DashMap::new(),
            dispatcher,
        }
    }

    /// Value of `definition` for `ctx` and `param`.
    ///
    /// Uncached definitions always call the callback. Cached ones return the
    /// stored value while it is younger than the cache duration, otherwise
    /// they recompute and replace it. Concurrent misses for the same key share
    /// one callback invocation. Failures are never stored.
    pub async fn resolve(
        &self,
        definition: &Arc<PlaceholderDefinition>,
        ctx: &Context,
        param: &str,
    ) -> Result<String, CallbackError> {
        if !definition.is_cached() {
            return self.dispatcher.invoke(definition, param, ctx).await;
        }

        let key = ResolutionKey {
            definition: definition.id(),
            identity: definition.cache_identity(ctx.identity()).to_string(),
            param: param.to_string(),
        };

        if let Some(cached) = self.values.get(&key)
            && cached.computed_at.elapsed() < definition.cache_duration
        {
            debug!("Cache hit for {} ({:?})", definition.key, key.identity);
            return Ok(cached.value);
        }

        debug!("Cache miss for {} ({:?})", definition.key, key.identity);

        let computation = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let dispatcher = self.dispatcher;
                let definition = Arc::clone(definition);
                let ctx = ctx.clone();
                let param = param.to_string();
                let computation = async move { dispatcher.invoke(&definition, &param, &ctx).await }
                    .boxed()
                    .shared();
                entry.insert(computation.clone());
                computation
            }
        };

        let result = computation.clone().await;

        if let Ok(value) = &result {
            self.values.insert(
                key.clone(),
                CachedValue {
                    value: value.clone(),
                    computed_at: Instant::now(),
                },
            );
        }

        self.in_flight
            .remove_if(&key, |_, running| running.ptr_eq(&computation));

        result
    }

    /// Drop cached values of the given definitions.
    pub fn forget(&self, definition_ids: impl IntoIterator<Item = u64>) {
        let ids: HashSet<u64> = definition_ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        self.values
            .invalidate_where(move |key, _| ids.contains(&key.definition));
    }

    /// Drop every cached value.
    pub fn clear(&self) {
        self.values.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.values.entry_count()
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("values", &self.values)
            .field("in_flight", &self.in_flight.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
