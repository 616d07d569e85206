//! Evaluation contexts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The category of runtime object a placeholder is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Player,
    Actor,
    Server,
}

impl ContextKind {
    /// Whether a placeholder of this kind can be evaluated in `ctx`.
    ///
    /// Server placeholders resolve everywhere, actor placeholders also
    /// resolve for players (every player is an actor), player placeholders
    /// only resolve for players.
    pub fn accepts(self, ctx: &Context) -> bool {
        match self {
            ContextKind::Server => true,
            ContextKind::Actor => matches!(ctx, Context::Actor(_) | Context::Player(_)),
            ContextKind::Player => matches!(ctx, Context::Player(_)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextKind::Player => "player",
            ContextKind::Actor => "actor",
            ContextKind::Server => "server",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player or actor instance handed to callbacks.
///
/// The id is the stable identity used for per-context caching. The payload
/// is whatever the host wants its callbacks to see; callbacks get it back
/// with [`Subject::downcast_ref`].
#[derive(Clone)]
pub struct Subject {
    id: Arc<str>,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl Subject {
    /// Create a subject that only carries an identity.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            payload: None,
        }
    }

    /// Create a subject carrying a host object.
    pub fn with_payload<T>(id: impl Into<Arc<str>>, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            id: id.into(),
            payload: Some(Arc::new(payload)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Borrow the payload as `T`, if there is one of that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("id", &self.id)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// The context a template is resolved in.
#[derive(Debug, Clone)]
pub enum Context {
    Server,
    Player(Subject),
    Actor(Subject),
}

impl Context {
    pub fn kind(&self) -> ContextKind {
        match self {
            Context::Server => ContextKind::Server,
            Context::Player(_) => ContextKind::Player,
            Context::Actor(_) => ContextKind::Actor,
        }
    }

    pub fn subject(&self) -> Option<&Subject> {
        match self {
            Context::Server => None,
            Context::Player(s) | Context::Actor(s) => Some(s),
        }
    }

    /// Cache identity of this context. Server contexts use the empty string.
    pub fn identity(&self) -> &str {
        self.subject().map(Subject::id).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pos(i32, i32, i32);

    #[test]
    fn test_kind_compatibility() {
        let server = Context::Server;
        let player = Context::Player(Subject::new("steve"));
        let actor = Context::Actor(Subject::new("zombie-1"));

        assert!(ContextKind::Server.accepts(&server));
        assert!(ContextKind::Server.accepts(&player));
        assert!(ContextKind::Server.accepts(&actor));

        assert!(!ContextKind::Actor.accepts(&server));
        assert!(ContextKind::Actor.accepts(&player));
        assert!(ContextKind::Actor.accepts(&actor));

        assert!(!ContextKind::Player.accepts(&server));
        assert!(ContextKind::Player.accepts(&player));
        assert!(!ContextKind::Player.accepts(&actor));
    }

    #[test]
    fn test_subject_payload() {
        let subject = Subject::with_payload("steve", Pos(1, 64, -3));

        assert_eq!(subject.id(), "steve");
        assert_eq!(subject.downcast_ref::<Pos>(), Some(&Pos(1, 64, -3)));
        assert!(subject.downcast_ref::<String>().is_none());
        assert!(Subject::new("alex").downcast_ref::<Pos>().is_none());
    }

    #[test]
    fn test_identity() {
        assert_eq!(Context::Server.identity(), "");
        assert_eq!(Context::Actor(Subject::new("a-7")).identity(), "a-7");
    }
}
