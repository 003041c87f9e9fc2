//! Protean SDK - protocol descriptors and handler types
//!
//! This crate holds everything a caller needs to describe protocols and
//! write handlers without depending on the proxy engine:
//!
//! - [`Protocol`] / [`ProtocolBuilder`]: immutable protocol descriptors
//! - [`ProtocolRegistry`]: name lookup and conformance records
//! - [`Value`] / [`ValueKind`]: arguments, results, and signature kinds
//! - [`Handler`]: the closure bound to one method
//!
//! # Example
//!
//! ```ignore
//! use protean_sdk::{arg, handler, MethodSignature, Protocol, Value, ValueKind};
//!
//! let adder = Protocol::builder("Adder")
//!     .required("add", MethodSignature::new([ValueKind::Int, ValueKind::Int], ValueKind::Int))
//!     .build()?;
//!
//! let add = handler(|args| Ok(Value::from(arg::<i64>(args, 0)? + arg::<i64>(args, 1)?)));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod convert;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod value;

pub use convert::{arg, object_arg, FromValue};
pub use error::{SdkError, SdkResult};
pub use handler::{constant, handler, Handler};
pub use protocol::{
    MethodId, MethodRequirement, MethodSignature, Protocol, ProtocolBuilder, ProtocolId,
};
pub use registry::{ConformanceRecorder, ProtocolRegistry};
pub use value::{Value, ValueKind};
