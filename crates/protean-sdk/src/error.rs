//! Error types for protocol descriptors and value conversion

/// Result type for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors raised while describing protocols or converting values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SdkError {
    /// Type mismatch during value conversion
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// A handler asked for an argument that was not passed
    #[error("Missing argument at index {index} (got {count} arguments)")]
    MissingArgument {
        /// Requested argument index
        index: usize,
        /// Number of arguments actually passed
        count: usize,
    },

    /// A protocol or method name was empty
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    /// The same method was declared twice in one protocol
    #[error("Protocol {protocol} declares method `{method}` more than once")]
    DuplicateMethod {
        /// Protocol being built
        protocol: String,
        /// Method declared twice
        method: String,
    },

    /// A protocol with this name is already registered
    #[error("Protocol {0} is already registered")]
    DuplicateProtocol(String),

    /// No protocol with this name is registered
    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),
}
