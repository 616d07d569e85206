//! Placeholder registry - `(namespace, token)` to definition.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{PlaceholderDefinition, PlaceholderInfo, RegisterError};

type Tokens = HashMap<String, Arc<PlaceholderDefinition>>;

/// Central registry of placeholder definitions, grouped by namespace.
///
/// Definitions are stored behind `Arc` and the map behind a single lock, so
/// a lookup sees either the whole definition or nothing.
pub struct PlaceholderRegistry {
    namespaces: RwLock<HashMap<String, Tokens>>,
    next_id: AtomicU64,
}

impl PlaceholderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a definition.
    ///
    /// Fails with [`RegisterError::AlreadyRegistered`] if the key is taken;
    /// the existing definition is left untouched.
    pub fn register(
        &self,
        mut definition: PlaceholderDefinition,
    ) -> Result<Arc<PlaceholderDefinition>, RegisterError> {
        let mut namespaces = self.namespaces.write();
        let tokens = namespaces
            .entry(definition.key.namespace.clone())
            .or_default();

        if tokens.contains_key(&definition.key.token) {
            return Err(RegisterError::AlreadyRegistered {
                namespace: definition.key.namespace,
                token: definition.key.token,
            });
        }

        definition.id = self.next_id.fetch_add(1, Ordering::Relaxed);

        debug!(
            "Registered {} placeholder {} -> {}",
            definition.kind, definition.key, definition.callback_ref
        );

        let definition = Arc::new(definition);
        tokens.insert(definition.key.token.clone(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Look up a definition.
    pub fn lookup(&self, namespace: &str, token: &str) -> Option<Arc<PlaceholderDefinition>> {
        self.namespaces.read().get(namespace)?.get(token).cloned()
    }

    pub fn contains(&self, namespace: &str, token: &str) -> bool {
        self.lookup(namespace, token).is_some()
    }

    /// Remove every placeholder of `namespace`.
    ///
    /// Returns the removed definitions; empty when nothing matched.
    pub fn unregister_namespace(&self, namespace: &str) -> Vec<Arc<PlaceholderDefinition>> {
        let removed: Vec<_> = self
            .namespaces
            .write()
            .remove(namespace)
            .map(|tokens| tokens.into_values().collect())
            .unwrap_or_default();

        if !removed.is_empty() {
            info!("Unregistered {} placeholders of '{}'", removed.len(), namespace);
        }
        removed
    }

    /// Remove every placeholder bound to a callback exported under `namespace`.
    pub fn unregister_callback_namespace(
        &self,
        namespace: &str,
    ) -> Vec<Arc<PlaceholderDefinition>> {
        let mut namespaces = self.namespaces.write();
        let mut removed = vec![];

        for tokens in namespaces.values_mut() {
            tokens.retain(|_, def| {
                if def.callback_ref.namespace == namespace {
                    removed.push(Arc::clone(def));
                    false
                } else {
                    true
                }
            });
        }
        namespaces.retain(|_, tokens| !tokens.is_empty());

        if !removed.is_empty() {
            info!(
                "Unregistered {} placeholders of callback namespace '{}'",
                removed.len(),
                namespace
            );
        }
        removed
    }

    /// Summaries of all registered placeholders, sorted by key.
    pub fn list(&self) -> Vec<PlaceholderInfo> {
        let mut infos: Vec<_> = self
            .namespaces
            .read()
            .values()
            .flat_map(|tokens| tokens.values().map(|d| d.info()))
            .collect();
        infos.sort_by(|a, b| (&a.namespace, &a.token).cmp(&(&b.namespace, &b.token)));
        infos
    }

    pub fn len(&self) -> usize {
        self.namespaces.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PlaceholderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaceholderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderRegistry")
            .field("placeholder_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::callbacks::{CallbackRef, PlaceholderCallback};
    use crate::placeholder::{ContextKind, PlaceholderKey};

    fn definition(namespace: &str, token: &str, callback_ns: &str) -> PlaceholderDefinition {
        PlaceholderDefinition::new(
            PlaceholderKey::new(namespace, token),
            ContextKind::Server,
            CallbackRef::new(callback_ns, token),
            PlaceholderCallback::server(|_, _| Ok("x".into())),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = PlaceholderRegistry::new();
        let def = registry.register(definition("ex", "foo", "EX")).unwrap();

        let found = registry.lookup("ex", "foo").unwrap();
        assert_eq!(found.id(), def.id());
        assert!(registry.lookup("ex", "bar").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = PlaceholderRegistry::new();
        let first = registry.register(definition("ex", "foo", "EX")).unwrap();

        let err = registry.register(definition("ex", "foo", "OTHER")).unwrap_err();
        assert_eq!(
            err,
            RegisterError::AlreadyRegistered {
                namespace: "ex".into(),
                token: "foo".into()
            }
        );
        // The first registration stays in place.
        let found = registry.lookup("ex", "foo").unwrap();
        assert_eq!(found.id(), first.id());
        assert_eq!(found.callback_ref.namespace, "EX");
    }

    #[test]
    fn test_ids_are_unique_across_reregistration() {
        let registry = PlaceholderRegistry::new();
        let first = registry.register(definition("ex", "foo", "EX")).unwrap();
        registry.unregister_namespace("ex");
        let second = registry.register(definition("ex", "foo", "EX")).unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_unregister_namespace_is_idempotent() {
        let registry = PlaceholderRegistry::new();
        registry.register(definition("ex", "foo", "EX")).unwrap();
        registry.register(definition("ex", "bar", "EX")).unwrap();
        registry.register(definition("other", "foo", "EX")).unwrap();

        assert_eq!(registry.unregister_namespace("ex").len(), 2);
        assert_eq!(registry.unregister_namespace("ex").len(), 0);
        assert!(registry.contains("other", "foo"));
    }

    #[test]
    fn test_unregister_callback_namespace() {
        let registry = PlaceholderRegistry::new();
        registry.register(definition("js", "hello", "JSPH")).unwrap();
        registry.register(definition("js", "time", "JSPH")).unwrap();
        registry.register(definition("js", "other", "LUA")).unwrap();

        assert_eq!(registry.unregister_callback_namespace("JSPH").len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("js", "other"));
        assert!(registry.lookup("js", "hello").is_none());
    }

    #[test]
    fn test_emptied_namespace_is_dropped() {
        let registry = PlaceholderRegistry::new();
        registry.register(definition("js", "hello", "JSPH")).unwrap();

        assert_eq!(registry.unregister_callback_namespace("JSPH").len(), 1);
        assert!(registry.is_empty());
        assert!(registry.unregister_namespace("js").is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_concurrent_registration_keeps_both() {
        let registry = Arc::new(PlaceholderRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .register(definition("ns", &format!("token{}", i), "CB"))
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 8);
        for i in 0..8 {
            assert!(registry.contains("ns", &format!("token{}", i)));
        }
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = PlaceholderRegistry::new();
        registry.register(definition("b", "x", "CB")).unwrap();
        registry.register(definition("a", "y", "CB")).unwrap();
        registry.register(definition("a", "x", "CB")).unwrap();

        let keys: Vec<_> = registry
            .list()
            .into_iter()
            .map(|i| format!("{}:{}", i.namespace, i.token))
            .collect();
        assert_eq!(keys, vec!["a:x", "a:y", "b:x"]);
    }
}
