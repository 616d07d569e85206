//! Registration and callback errors.

use std::time::Duration;

use thiserror::Error;

use super::ContextKind;
use crate::callbacks::{CallbackRef, Signature};

/// Why a placeholder could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("placeholder {{{namespace}:{token}}} is already registered")]
    AlreadyRegistered { namespace: String, token: String },

    #[error("no callback exported as {0}")]
    UnknownCallback(CallbackRef),

    #[error("{kind} placeholder needs a {expected} callback, but {callback} is {found}")]
    SignatureMismatch {
        callback: CallbackRef,
        kind: ContextKind,
        expected: Signature,
        found: Signature,
    },

    #[error("invalid placeholder name '{0}'")]
    InvalidName(String),
}

/// Why a callback did not produce a value.
///
/// `Clone` so one in-flight computation can hand the same failure to every
/// waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("callback {callback} failed: {message}")]
    Failed { callback: CallbackRef, message: String },

    #[error("callback {callback} panicked: {message}")]
    Panicked { callback: CallbackRef, message: String },

    #[error("callback {callback} timed out after {timeout:?}")]
    TimedOut { callback: CallbackRef, timeout: Duration },

    #[error("callback {0} needs a subject but the context has none")]
    MissingSubject(CallbackRef),
}
