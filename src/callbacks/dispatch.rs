//! Callback dispatch - runs a handler and contains whatever goes wrong.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::FutureExt;
use tracing::warn;

use super::PlaceholderCallback;
use crate::placeholder::{CallbackError, Context, PlaceholderDefinition};

/// Invokes callbacks with a timeout, turning errors and panics into
/// [`CallbackError`]s.
#[derive(Debug, Clone, Copy)]
pub struct CallbackDispatcher {
    timeout: Duration,
}

impl CallbackDispatcher {
    /// A zero `timeout` lets callbacks run for as long as they like.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke the definition's callback with `(token, param, context)`.
    pub async fn invoke(
        &self,
        definition: &PlaceholderDefinition,
        param: &str,
        ctx: &Context,
    ) -> Result<String, CallbackError> {
        let result = self.call(definition, param, ctx).await;
        if let Err(e) = &result {
            warn!("Placeholder {} unresolved: {}", definition.key, e);
        }
        result
    }

    async fn call(
        &self,
        definition: &PlaceholderDefinition,
        param: &str,
        ctx: &Context,
    ) -> Result<String, CallbackError> {
        let callback = &definition.callback_ref;
        let token = definition.key.token.clone();

        // Constructing the future runs user code too.
        let started = panic::catch_unwind(AssertUnwindSafe(|| match &definition.callback {
            PlaceholderCallback::Server(f) => Some(f(token, param.to_string())),
            PlaceholderCallback::Subject(f) => ctx
                .subject()
                .map(|subject| f(token, param.to_string(), subject.clone())),
        }));

        let future = match started {
            Ok(Some(future)) => future,
            Ok(None) => return Err(CallbackError::MissingSubject(callback.clone())),
            Err(payload) => {
                return Err(CallbackError::Panicked {
                    callback: callback.clone(),
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        let guarded = AssertUnwindSafe(future).catch_unwind();
        let outcome = if self.timeout.is_zero() {
            guarded.await
        } else {
            match tokio::time::timeout(self.timeout, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(CallbackError::TimedOut {
                        callback: callback.clone(),
                        timeout: self.timeout,
                    });
                }
            }
        };

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CallbackError::Failed {
                callback: callback.clone(),
                message: format!("{:#}", e),
            }),
            Err(payload) => Err(CallbackError::Panicked {
                callback: callback.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::CallbackRef;
    use crate::placeholder::{ContextKind, PlaceholderKey, Subject};

    fn definition(kind: ContextKind, callback: PlaceholderCallback) -> PlaceholderDefinition {
        PlaceholderDefinition::new(
            PlaceholderKey::new("js", "hello"),
            kind,
            CallbackRef::new("JSPH", "helloPlayer"),
            callback,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_invoke_passes_token_param_and_subject() {
        let dispatcher = CallbackDispatcher::new(Duration::from_secs(2));
        let def = definition(
            ContextKind::Player,
            PlaceholderCallback::subject(|token, param, subject| {
                Ok(format!("{}|{}|{}", token, param, subject.id()))
            }),
        );
        let ctx = Context::Player(Subject::new("steve"));

        let out = dispatcher.invoke(&def, "a:b", &ctx).await.unwrap();
        assert_eq!(out, "hello|a:b|steve");
    }

    #[tokio::test]
    async fn test_error_becomes_failed() {
        let dispatcher = CallbackDispatcher::new(Duration::from_secs(2));
        let def = definition(
            ContextKind::Server,
            PlaceholderCallback::server(|_, _| anyhow::bail!("no database")),
        );

        let err = dispatcher.invoke(&def, "", &Context::Server).await.unwrap_err();
        assert!(matches!(err, CallbackError::Failed { ref message, .. } if message == "no database"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let dispatcher = CallbackDispatcher::new(Duration::from_secs(2));
        let def = definition(
            ContextKind::Server,
            PlaceholderCallback::server(|_, _| panic!("boom")),
        );

        let err = dispatcher.invoke(&def, "", &Context::Server).await.unwrap_err();
        assert!(matches!(err, CallbackError::Panicked { ref message, .. } if message == "boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_callback_times_out() {
        let dispatcher = CallbackDispatcher::new(Duration::from_millis(2000));
        let def = definition(
            ContextKind::Server,
            PlaceholderCallback::server_async(|_, _| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, anyhow::Error>("late".to_string())
            }),
        );

        let err = dispatcher.invoke(&def, "", &Context::Server).await.unwrap_err();
        assert_eq!(
            err,
            CallbackError::TimedOut {
                callback: CallbackRef::new("JSPH", "helloPlayer"),
                timeout: Duration::from_millis(2000),
            }
        );
    }

    #[tokio::test]
    async fn test_subject_callback_without_subject() {
        let dispatcher = CallbackDispatcher::new(Duration::from_secs(2));
        let def = definition(
            ContextKind::Player,
            PlaceholderCallback::subject(|_, _, _| Ok("x".into())),
        );

        let err = dispatcher.invoke(&def, "", &Context::Server).await.unwrap_err();
        assert!(matches!(err, CallbackError::MissingSubject(_)));
    }
}
