//! Placeholder service - the engine instance plugins talk to.
//!
//! The service owns the placeholder registry, the exported callbacks and the
//! resolution cache. Create one with [`PlaceholderService::new`] and share
//! it as `Arc<PlaceholderService>`, or use the lazily created
//! [`PlaceholderService::global`] instance.
//!
//! ## Usage
//!
//! ```rust
//! use placeholder_engine::{EngineConfig, PlaceholderCallback, PlaceholderService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = PlaceholderService::new(EngineConfig::default());
//! service.export_callback("DEMO", "clock", PlaceholderCallback::server(|_, _| Ok("12:00".into())));
//! assert!(service.register_server_placeholder("srv", "clock", "DEMO", "clock", 0));
//!
//! assert_eq!(service.replace("time={srv:clock}").await, "time=12:00");
//! # }
//! ```

mod registration;

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

pub use registration::Registration;

use crate::cache::{CacheConfig, ResolutionCache};
use crate::callbacks::{CallbackDispatcher, CallbackRef, CallbackTable, PlaceholderCallback, Signature};
use crate::config::EngineConfig;
use crate::placeholder::{
    Context, ContextKind, PlaceholderDefinition, PlaceholderInfo, PlaceholderKey,
    PlaceholderRegistry, RegisterError, Subject, validate_name,
};
use crate::resolver::Resolver;
use crate::utils::truncate_for_log;

static GLOBAL: OnceCell<Arc<PlaceholderService>> = OnceCell::new();

/// The placeholder engine.
pub struct PlaceholderService {
    registry: PlaceholderRegistry,
    callbacks: CallbackTable,
    cache: ResolutionCache,
    config: EngineConfig,
}

impl PlaceholderService {
    pub fn new(config: EngineConfig) -> Self {
        let dispatcher = CallbackDispatcher::new(config.callback_timeout);
        if dispatcher.timeout().is_zero() {
            warn!("Callback timeout disabled; a stuck callback stalls its replace call");
        }
        let cache = ResolutionCache::new(
            CacheConfig::resolved_values(config.cache_capacity),
            dispatcher,
        );

        info!(
            "Placeholder service initialized (cache capacity {}, callback timeout {:?})",
            config.cache_capacity,
            dispatcher.timeout()
        );

        Self {
            registry: PlaceholderRegistry::new(),
            callbacks: CallbackTable::new(),
            cache,
            config,
        }
    }

    /// The process-wide default instance, configured from the environment on
    /// first use.
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new(EngineConfig::from_env()))))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Callbacks
    // ---------------------------------------------------------------------

    /// Export a callback under `(namespace, name)`.
    ///
    /// Returns `false` if that name is already exported.
    pub fn export_callback(
        &self,
        namespace: &str,
        name: &str,
        callback: PlaceholderCallback,
    ) -> bool {
        let ok = self
            .callbacks
            .export(CallbackRef::new(namespace, name), callback);
        if !ok {
            error!("Callback {}::{} is already exported", namespace, name);
        }
        ok
    }

    /// Remove every callback exported under `namespace`.
    ///
    /// Placeholders already registered keep their callback until they are
    /// unregistered.
    pub fn unexport_namespace(&self, namespace: &str) -> usize {
        self.callbacks.remove_namespace(namespace)
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Register a placeholder, reporting why it failed if it did.
    pub fn register(&self, registration: Registration) -> Result<(), RegisterError> {
        validate_name(&registration.namespace)?;
        validate_name(&registration.token)?;

        let callback = self
            .callbacks
            .get(&registration.callback)
            .ok_or_else(|| RegisterError::UnknownCallback(registration.callback.clone()))?;

        let expected = Signature::required_for(registration.kind);
        if callback.signature() != expected {
            return Err(RegisterError::SignatureMismatch {
                callback: registration.callback,
                kind: registration.kind,
                expected,
                found: callback.signature(),
            });
        }

        let definition = PlaceholderDefinition::new(
            PlaceholderKey::new(registration.namespace, registration.token),
            registration.kind,
            registration.callback,
            callback,
            registration.cache_duration,
        )
        .cache_scope(registration.cache_scope);

        let definition = self.registry.register(definition)?;
        info!(
            "Registered {} placeholder {} (cache {:?})",
            definition.kind, definition.key, definition.cache_duration
        );
        Ok(())
    }

    /// Register a placeholder of `kind`; `false` on failure (the reason is logged).
    pub fn register_placeholder_by_kind(
        &self,
        kind: ContextKind,
        namespace: &str,
        token: &str,
        callback_namespace: &str,
        callback_name: &str,
        cache_seconds: u64,
    ) -> bool {
        let registration = Registration::new(
            kind,
            namespace,
            token,
            CallbackRef::new(callback_namespace, callback_name),
        )
        .cache_seconds(cache_seconds);

        match self.register(registration) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to register {{{}:{}}}: {}", namespace, token, e);
                false
            }
        }
    }

    pub fn register_player_placeholder(
        &self,
        namespace: &str,
        token: &str,
        callback_namespace: &str,
        callback_name: &str,
        cache_seconds: u64,
    ) -> bool {
        self.register_placeholder_by_kind(
            ContextKind::Player,
            namespace,
            token,
            callback_namespace,
            callback_name,
            cache_seconds,
        )
    }

    pub fn register_actor_placeholder(
        &self,
        namespace: &str,
        token: &str,
        callback_namespace: &str,
        callback_name: &str,
        cache_seconds: u64,
    ) -> bool {
        self.register_placeholder_by_kind(
            ContextKind::Actor,
            namespace,
            token,
            callback_namespace,
            callback_name,
            cache_seconds,
        )
    }

    pub fn register_server_placeholder(
        &self,
        namespace: &str,
        token: &str,
        callback_namespace: &str,
        callback_name: &str,
        cache_seconds: u64,
    ) -> bool {
        self.register_placeholder_by_kind(
            ContextKind::Server,
            namespace,
            token,
            callback_namespace,
            callback_name,
            cache_seconds,
        )
    }

    /// Remove every placeholder in `namespace`. Returns how many were removed.
    pub fn unregister_namespace(&self, namespace: &str) -> usize {
        let removed = self.registry.unregister_namespace(namespace);
        self.cache.forget(removed.iter().map(|d| d.id()));
        removed.len()
    }

    /// Remove every placeholder bound to a callback of `callback_namespace`.
    ///
    /// Returns `true` if anything was removed.
    pub fn unregister_by_callback_namespace(&self, callback_namespace: &str) -> bool {
        let removed = self
            .registry
            .unregister_callback_namespace(callback_namespace);
        self.cache.forget(removed.iter().map(|d| d.id()));
        debug!(
            "Unregistered {} placeholders of callback namespace '{}'",
            removed.len(),
            callback_namespace
        );
        !removed.is_empty()
    }

    pub fn has_placeholder(&self, namespace: &str, token: &str) -> bool {
        self.registry.contains(namespace, token)
    }

    pub fn list_placeholders(&self) -> Vec<PlaceholderInfo> {
        self.registry.list()
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // ---------------------------------------------------------------------
    // Substitution
    // ---------------------------------------------------------------------

    /// Resolve `template` in `ctx`.
    pub async fn replace_with(&self, template: &str, ctx: &Context) -> String {
        let out = self.resolver().replace(template, ctx).await;
        debug!(
            "replace [{}] '{}' -> '{}'",
            ctx.kind(),
            truncate_for_log(template, 256),
            truncate_for_log(&out, 256)
        );
        out
    }

    /// Resolve with no player or actor (server placeholders only).
    pub async fn replace(&self, template: &str) -> String {
        self.replace_with(template, &Context::Server).await
    }

    pub async fn replace_for_player(&self, template: &str, player: &Subject) -> String {
        self.replace_with(template, &Context::Player(player.clone()))
            .await
    }

    pub async fn replace_for_actor(&self, template: &str, actor: &Subject) -> String {
        self.replace_with(template, &Context::Actor(actor.clone()))
            .await
    }

    /// Resolve several templates in the same context, in order.
    pub async fn replace_many<S: AsRef<str>>(&self, templates: &[S], ctx: &Context) -> Vec<String> {
        let mut out = Vec::with_capacity(templates.len());
        for template in templates {
            out.push(self.replace_with(template.as_ref(), ctx).await);
        }
        out
    }

    pub async fn replace_many_for_player<S: AsRef<str>>(
        &self,
        templates: &[S],
        player: &Subject,
    ) -> Vec<String> {
        self.replace_many(templates, &Context::Player(player.clone()))
            .await
    }

    /// Resolve every value of a map, keeping the keys.
    pub async fn replace_object(
        &self,
        templates: HashMap<String, String>,
        ctx: &Context,
    ) -> HashMap<String, String> {
        let mut out = HashMap::with_capacity(templates.len());
        for (key, template) in templates {
            let value = self.replace_with(&template, ctx).await;
            out.insert(key, value);
        }
        out
    }

    pub async fn replace_object_for_player(
        &self,
        templates: HashMap<String, String>,
        player: &Subject,
    ) -> HashMap<String, String> {
        self.replace_object(templates, &Context::Player(player.clone()))
            .await
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            registry: &self.registry,
            cache: &self.cache,
            config: &self.config,
        }
    }
}

impl std::fmt::Debug for PlaceholderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderService")
            .field("registry", &self.registry)
            .field("callbacks", &self.callbacks)
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}
