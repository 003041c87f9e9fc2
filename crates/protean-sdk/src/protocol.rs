//! Protocol descriptors
//!
//! A [`Protocol`] names a set of method requirements. Descriptors are built
//! once through [`ProtocolBuilder`], shared as `Arc<Protocol>`, and never
//! change afterwards. Identity is the [`ProtocolId`] allocated at build time:
//! two descriptors are the same protocol only if they share that id.
//!
//! ```ignore
//! let greeter = Protocol::builder("Greeter")
//!     .required("greet", MethodSignature::nullary(ValueKind::Str))
//!     .optional("farewell", MethodSignature::new([ValueKind::Str], ValueKind::Void))
//!     .build()?;
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{SdkError, SdkResult};
use crate::value::ValueKind;

/// Unique identifier for a protocol descriptor
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolId(u64);

static NEXT_PROTOCOL_ID: AtomicU64 = AtomicU64::new(1);

impl ProtocolId {
    fn next() -> Self {
        ProtocolId(NEXT_PROTOCOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Method identifier (the name a caller dispatches on)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(Arc<str>);

impl MethodId {
    /// Create a method identifier
    pub fn new(name: impl AsRef<str>) -> Self {
        MethodId(Arc::from(name.as_ref()))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MethodId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MethodId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MethodId {
    fn from(name: &str) -> Self {
        MethodId::new(name)
    }
}

impl From<String> for MethodId {
    fn from(name: String) -> Self {
        MethodId(Arc::from(name))
    }
}

impl From<&MethodId> for MethodId {
    fn from(id: &MethodId) -> Self {
        id.clone()
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({:?})", &*self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter and return kinds of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    params: Vec<ValueKind>,
    returns: ValueKind,
}

impl MethodSignature {
    /// Create a signature from parameter kinds and a return kind
    pub fn new(params: impl IntoIterator<Item = ValueKind>, returns: ValueKind) -> Self {
        Self {
            params: params.into_iter().collect(),
            returns,
        }
    }

    /// Signature of a method taking no arguments
    pub fn nullary(returns: ValueKind) -> Self {
        Self::new([], returns)
    }

    /// Parameter kinds in order
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Return kind
    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// One method a protocol asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRequirement {
    /// Method identifier
    pub id: MethodId,
    /// Expected signature
    pub signature: MethodSignature,
    /// Whether conforming objects must implement it
    pub required: bool,
}

/// Immutable description of one protocol contract
#[derive(Debug)]
pub struct Protocol {
    id: ProtocolId,
    name: String,
    methods: Vec<MethodRequirement>,
}

impl Protocol {
    /// Start describing a new protocol
    pub fn builder(name: impl Into<String>) -> ProtocolBuilder {
        ProtocolBuilder::new(name)
    }

    /// Descriptor identity
    pub fn id(&self) -> ProtocolId {
        self.id
    }

    /// Protocol name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All method requirements in declaration order
    pub fn methods(&self) -> &[MethodRequirement] {
        &self.methods
    }

    /// Method identifiers in declaration order
    pub fn method_ids(&self) -> impl Iterator<Item = &MethodId> + '_ {
        self.methods.iter().map(|m| &m.id)
    }

    /// Look up one requirement
    pub fn method(&self, id: &str) -> Option<&MethodRequirement> {
        self.methods.iter().find(|m| m.id.as_str() == id)
    }

    /// Required methods only
    pub fn required_methods(&self) -> impl Iterator<Item = &MethodRequirement> + '_ {
        self.methods.iter().filter(|m| m.required)
    }

    /// Optional methods only
    pub fn optional_methods(&self) -> impl Iterator<Item = &MethodRequirement> + '_ {
        self.methods.iter().filter(|m| !m.required)
    }

    /// Whether both descriptors denote the same protocol
    pub fn is_same(&self, other: &Protocol) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Protocol {}

impl Hash for Protocol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`Protocol`] descriptors
#[derive(Debug, Clone)]
pub struct ProtocolBuilder {
    name: String,
    methods: Vec<MethodRequirement>,
}

impl ProtocolBuilder {
    /// Create a builder for a protocol with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add a required method
    pub fn required(mut self, id: impl Into<MethodId>, signature: MethodSignature) -> Self {
        self.methods.push(MethodRequirement {
            id: id.into(),
            signature,
            required: true,
        });
        self
    }

    /// Add an optional method
    pub fn optional(mut self, id: impl Into<MethodId>, signature: MethodSignature) -> Self {
        self.methods.push(MethodRequirement {
            id: id.into(),
            signature,
            required: false,
        });
        self
    }

    /// Name of the protocol being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finish the descriptor and allocate its identity
    ///
    /// Fails on an empty protocol or method name, or when a method is
    /// declared twice.
    pub fn build(self) -> SdkResult<Arc<Protocol>> {
        if self.name.is_empty() {
            return Err(SdkError::InvalidName(self.name));
        }

        let mut seen = FxHashSet::default();
        for method in &self.methods {
            if method.id.as_str().is_empty() {
                return Err(SdkError::InvalidName(String::new()));
            }
            if !seen.insert(method.id.clone()) {
                return Err(SdkError::DuplicateMethod {
                    protocol: self.name,
                    method: method.id.to_string(),
                });
            }
        }

        Ok(Arc::new(Protocol {
            id: ProtocolId::next(),
            name: self.name,
            methods: self.methods,
        }))
    }
}
