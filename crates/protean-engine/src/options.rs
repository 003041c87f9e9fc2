//! Proxy creation options

/// What to do with a binding whose method no requested protocol declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndeclaredBindings {
    /// Fail creation with `ProxyError::UndeclaredBinding`
    #[default]
    Reject,
    /// Drop the binding; the method stays unreachable through the proxy
    Ignore,
}

/// Options applied when a factory turns bindings into a proxy instance
#[derive(Debug, Clone, Default)]
pub struct ProxyOptions {
    /// Handling of bindings outside the declared method set
    pub undeclared_bindings: UndeclaredBindings,

    /// Require a handler for every required method at creation time
    ///
    /// When false, missing required handlers surface as
    /// `ProxyError::UnboundMethod` on invocation instead.
    pub require_complete: bool,
}

impl ProxyOptions {
    /// Default options: reject undeclared bindings, allow incomplete proxies
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for strict test doubles: every required method must be bound
    pub fn strict() -> Self {
        Self {
            require_complete: true,
            ..Default::default()
        }
    }

    /// Set the undeclared-binding policy
    pub fn undeclared_bindings(mut self, policy: UndeclaredBindings) -> Self {
        self.undeclared_bindings = policy;
        self
    }

    /// Set whether required methods must be bound
    pub fn require_complete(mut self, require: bool) -> Self {
        self.require_complete = require;
        self
    }
}
