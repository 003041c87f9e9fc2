//! Error types for proxy synthesis and dispatch

use protean_sdk::{MethodId, MethodSignature};

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors raised while synthesizing proxy types, binding handlers, or
/// dispatching calls
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Two protocols in the requested set declare the same method with
    /// different signatures
    #[error(
        "Conflicting contract for method `{method}`: {first} declares {first_signature}, \
         {second} declares {second_signature}"
    )]
    ConflictingContract {
        /// Method declared twice
        method: MethodId,
        /// Protocol that declared it first
        first: String,
        /// Signature in the first protocol
        first_signature: MethodSignature,
        /// Protocol that declared it differently
        second: String,
        /// Signature in the second protocol
        second_signature: MethodSignature,
    },

    /// A proxy type was requested for no protocols at all
    #[error("Cannot synthesize a proxy type for an empty protocol set")]
    EmptyProtocolSet,

    /// The binding session was used before it was committed
    #[error("Binding session has not been committed")]
    SessionNotReady,

    /// The binding session was used after it was committed or consumed
    #[error("Binding session is closed")]
    SessionClosed,

    /// No handler is bound for the invoked method
    ///
    /// `declared` tells whether any protocol of the proxy's type declares
    /// the method at all.
    #[error("No handler bound for method `{method}`{}", declared_suffix(.declared))]
    UnboundMethod {
        /// Invoked method
        method: MethodId,
        /// Whether the method is part of the proxy's protocols
        declared: bool,
    },

    /// A method was invoked with the wrong number of arguments
    #[error("Method `{method}` expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// Invoked method
        method: MethodId,
        /// Declared parameter count
        expected: usize,
        /// Arguments actually passed
        got: usize,
    },

    /// A binding targets a method none of the requested protocols declare
    #[error("Binding for `{method}` does not match any declared protocol method")]
    UndeclaredBinding {
        /// Method the binding targeted
        method: MethodId,
    },

    /// A required method has no handler and completeness was requested
    #[error("Protocol {protocol} requires method `{method}` but no handler was bound")]
    MissingRequiredMethod {
        /// Protocol requiring the method
        protocol: String,
        /// Unbound method
        method: MethodId,
    },

    /// The bound handler failed; its error is carried unmodified
    #[error(transparent)]
    Handler(anyhow::Error),
}

fn declared_suffix(declared: &bool) -> &'static str {
    if *declared {
        ""
    } else {
        " (not declared by any protocol)"
    }
}

impl ProxyError {
    /// Whether this is a missing-handler condition rather than a handler failure
    pub fn is_unbound(&self) -> bool {
        matches!(self, ProxyError::UnboundMethod { .. })
    }

    /// The handler's own failure, if this error carries one
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            ProxyError::Handler(err) => Some(err),
            _ => None,
        }
    }

    /// Take the handler's own failure out of this error
    pub fn into_handler_error(self) -> Result<anyhow::Error, ProxyError> {
        match self {
            ProxyError::Handler(err) => Ok(err),
            other => Err(other),
        }
    }
}
