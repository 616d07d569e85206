//! Typed table of exported callbacks.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::debug;

use crate::placeholder::{ContextKind, Subject};

/// What every callback eventually produces.
pub type CallbackResult = anyhow::Result<String>;

type ServerFn = dyn Fn(String, String) -> BoxFuture<'static, CallbackResult> + Send + Sync;
type SubjectFn = dyn Fn(String, String, Subject) -> BoxFuture<'static, CallbackResult> + Send + Sync;

/// Shape of a callback, checked against the placeholder kind at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `(token, param)`
    Server,
    /// `(token, param, subject)`
    Subject,
}

impl Signature {
    /// The signature a placeholder of `kind` must be bound to.
    pub fn required_for(kind: ContextKind) -> Self {
        match kind {
            ContextKind::Server => Signature::Server,
            ContextKind::Player | ContextKind::Actor => Signature::Subject,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Server => f.write_str("(token, param)"),
            Signature::Subject => f.write_str("(token, param, subject)"),
        }
    }
}

/// A callback value. Cloning is cheap and shares the same function.
#[derive(Clone)]
pub enum PlaceholderCallback {
    Server(Arc<ServerFn>),
    Subject(Arc<SubjectFn>),
}

impl PlaceholderCallback {
    /// Wrap a synchronous `(token, param)` function.
    ///
    /// The function runs when the returned future is polled, so a panic
    /// surfaces inside dispatch rather than at call time.
    pub fn server<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> CallbackResult + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        PlaceholderCallback::Server(Arc::new(move |token: String, param: String| {
            let f = Arc::clone(&f);
            async move { f(&token, &param) }.boxed()
        }))
    }

    /// Wrap an asynchronous `(token, param)` function.
    pub fn server_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        PlaceholderCallback::Server(Arc::new(move |token: String, param: String| {
            f(token, param).boxed()
        }))
    }

    /// Wrap a synchronous `(token, param, subject)` function.
    pub fn subject<F>(f: F) -> Self
    where
        F: Fn(&str, &str, &Subject) -> CallbackResult + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        PlaceholderCallback::Subject(Arc::new(move |token: String, param: String, subject: Subject| {
            let f = Arc::clone(&f);
            async move { f(&token, &param, &subject) }.boxed()
        }))
    }

    /// Wrap an asynchronous `(token, param, subject)` function.
    pub fn subject_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String, String, Subject) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        PlaceholderCallback::Subject(Arc::new(move |token: String, param: String, subject: Subject| {
            f(token, param, subject).boxed()
        }))
    }

    pub fn signature(&self) -> Signature {
        match self {
            PlaceholderCallback::Server(_) => Signature::Server,
            PlaceholderCallback::Subject(_) => Signature::Subject,
        }
    }
}

impl fmt::Debug for PlaceholderCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlaceholderCallback")
            .field(&self.signature())
            .finish()
    }
}

/// Identity of an exported callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackRef {
    pub namespace: String,
    pub name: String,
}

impl CallbackRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CallbackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

/// Callbacks exported under `(namespace, name)`.
#[derive(Default)]
pub struct CallbackTable {
    callbacks: RwLock<HashMap<CallbackRef, PlaceholderCallback>>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export a callback. Returns `false` if the name is already taken.
    pub fn export(&self, callback_ref: CallbackRef, callback: PlaceholderCallback) -> bool {
        let mut callbacks = self.callbacks.write();
        if callbacks.contains_key(&callback_ref) {
            return false;
        }
        debug!("Exported callback {} {}", callback_ref, callback.signature());
        callbacks.insert(callback_ref, callback);
        true
    }

    pub fn get(&self, callback_ref: &CallbackRef) -> Option<PlaceholderCallback> {
        self.callbacks.read().get(callback_ref).cloned()
    }

    /// Drop every callback exported under `namespace`.
    pub fn remove_namespace(&self, namespace: &str) -> usize {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|key, _| key.namespace != namespace);
        before - callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackTable")
            .field("callback_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_rejects_duplicates() {
        let table = CallbackTable::new();
        let key = CallbackRef::new("JSPH", "serverTime");

        assert!(table.export(key.clone(), PlaceholderCallback::server(|_, _| Ok("a".into()))));
        assert!(!table.export(key.clone(), PlaceholderCallback::server(|_, _| Ok("b".into()))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_namespace() {
        let table = CallbackTable::new();
        table.export(
            CallbackRef::new("JSPH", "a"),
            PlaceholderCallback::server(|_, _| Ok(String::new())),
        );
        table.export(
            CallbackRef::new("JSPH", "b"),
            PlaceholderCallback::subject(|_, _, _| Ok(String::new())),
        );
        table.export(
            CallbackRef::new("other", "a"),
            PlaceholderCallback::server(|_, _| Ok(String::new())),
        );

        assert_eq!(table.remove_namespace("JSPH"), 2);
        assert_eq!(table.remove_namespace("JSPH"), 0);
        assert!(table.get(&CallbackRef::new("other", "a")).is_some());
    }

    #[test]
    fn test_signature_required_for_kind() {
        assert_eq!(Signature::required_for(ContextKind::Server), Signature::Server);
        assert_eq!(Signature::required_for(ContextKind::Player), Signature::Subject);
        assert_eq!(Signature::required_for(ContextKind::Actor), Signature::Subject);
    }

    #[tokio::test]
    async fn test_sync_wrappers_run_on_poll() {
        let cb = PlaceholderCallback::subject(|token, param, subject| {
            Ok(format!("{}:{}:{}", token, param, subject.id()))
        });

        let PlaceholderCallback::Subject(f) = cb else {
            panic!("expected a subject callback");
        };
        let out = f("hello".into(), "x".into(), Subject::new("steve"))
            .await
            .unwrap();
        assert_eq!(out, "hello:x:steve");
    }
}
