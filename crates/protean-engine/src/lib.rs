//! Protean Engine - run-time synthesis of protocol-conforming proxies
//!
//! Given a set of [`Protocol`] descriptors and a handler per method, the
//! engine produces a [`ProxyInstance`] that:
//!
//! - reports conformance to exactly those protocols,
//! - routes each declared method call to its bound handler,
//! - fails with [`ProxyError::UnboundMethod`] for anything else.
//!
//! # Architecture
//!
//! ```text
//! protocols ──▶ TypeSignature ──▶ ProxyTypeCache ──(miss)──▶ ProxyTypeBuilder
//!                                       │                        │
//!                                       ▼                        ▼
//!                                Arc<ProxyType> ◀── name, conformance, Dispatcher
//!                                       │
//! bindings ──▶ BindingSession ──commit──▶ DispatchTable ──produce──▶ ProxyInstance
//! ```
//!
//! Synthesized types are cached per protocol set. The crate-root functions
//! below use the process-wide cache and default [`ProxyOptions`]; use a
//! [`ProxyFactory`] for an isolated cache, stricter options, or to publish
//! conformance to a [`ConformanceRecorder`].
//!
//! # Example
//!
//! ```ignore
//! use protean_engine::{constant, create_proxy_for, MethodSignature, Protocol, Value, ValueKind};
//!
//! let greeter = Protocol::builder("Greeter")
//!     .required("greet", MethodSignature::nullary(ValueKind::Str))
//!     .build()?;
//!
//! let proxy = create_proxy_for(&greeter, [("greet", constant("hi"))])?;
//! assert_eq!(proxy.invoke("greet", &[])?, Value::from("hi"));
//! assert!(proxy.conforms_to(&greeter));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use std::sync::Arc;

pub mod builder;
pub mod cache;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod instance;
pub mod options;
pub mod session;
pub mod signature;

pub use builder::{ProxyType, ProxyTypeBuilder, ProxyTypeId};
pub use cache::ProxyTypeCache;
pub use dispatch::{DispatchTable, Dispatcher, MethodSlot};
pub use error::{ProxyError, ProxyResult};
pub use factory::ProxyFactory;
pub use instance::ProxyInstance;
pub use options::{ProxyOptions, UndeclaredBindings};
pub use session::{BindingSession, SessionState};
pub use signature::TypeSignature;

pub use protean_sdk::{
    arg, constant, handler, object_arg, ConformanceRecorder, FromValue, Handler, MethodId,
    MethodRequirement, MethodSignature, Protocol, ProtocolBuilder, ProtocolId, ProtocolRegistry,
    SdkError, SdkResult, Value, ValueKind,
};

/// Create a proxy conforming to `protocols` using the process-wide cache
pub fn create_proxy<I, K>(protocols: &[Arc<Protocol>], bindings: I) -> ProxyResult<ProxyInstance>
where
    I: IntoIterator<Item = (K, Handler)>,
    K: Into<MethodId>,
{
    ProxyFactory::new().create_proxy(protocols, bindings)
}

/// Create a proxy conforming to a single protocol
pub fn create_proxy_for<I, K>(protocol: &Arc<Protocol>, bindings: I) -> ProxyResult<ProxyInstance>
where
    I: IntoIterator<Item = (K, Handler)>,
    K: Into<MethodId>,
{
    ProxyFactory::new().create_proxy_for(protocol, bindings)
}

/// The process-wide proxy type for `protocols`
pub fn type_for(protocols: &[Arc<Protocol>]) -> ProxyResult<Arc<ProxyType>> {
    ProxyFactory::new().type_for(protocols)
}

/// The process-wide proxy type for a single protocol
pub fn type_for_protocol(protocol: &Arc<Protocol>) -> ProxyResult<Arc<ProxyType>> {
    ProxyFactory::new().type_for_protocol(protocol)
}
