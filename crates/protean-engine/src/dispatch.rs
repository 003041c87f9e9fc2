//! Dispatch - routing method calls to bound handlers
//!
//! Every proxy type owns a [`Dispatcher`]: the merged method set of its
//! protocols. Every proxy instance owns a [`DispatchTable`]: the handlers
//! bound for it. A call is forwarded only if the dispatcher declares the
//! method; it reaches a handler only if the instance's table binds it.
//!
//! ```text
//! invoke(method, args)
//!   ├─ not declared by the type      → UnboundMethod { declared: false }
//!   ├─ declared, no handler bound     → UnboundMethod { declared: true }
//!   ├─ wrong argument count           → ArityMismatch
//!   └─ handler(args)                  → Ok(value) | Handler(error)
//! ```

use std::fmt;

use indexmap::IndexMap;
use protean_sdk::{Handler, MethodId, MethodSignature, Value};
use rustc_hash::FxBuildHasher;

use crate::error::{ProxyError, ProxyResult};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// One method of a proxy type's merged method set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSlot {
    /// Declared signature (identical across every declaring protocol)
    pub signature: MethodSignature,
    /// Name of the first protocol that declared the method
    pub declared_by: String,
    /// Name of the first protocol that requires the method, if any does
    pub required_by: Option<String>,
}

impl MethodSlot {
    /// Whether any protocol requires this method
    pub fn is_required(&self) -> bool {
        self.required_by.is_some()
    }
}

/// Declared methods of a proxy type and the call-routing logic over them
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    slots: FxIndexMap<MethodId, MethodSlot>,
}

impl Dispatcher {
    pub(crate) fn new(slots: FxIndexMap<MethodId, MethodSlot>) -> Self {
        Self { slots }
    }

    /// Check if a method is declared
    pub fn declares(&self, method: &str) -> bool {
        self.slots.contains_key(method)
    }

    /// Get the slot of a declared method
    pub fn slot(&self, method: &str) -> Option<&MethodSlot> {
        self.slots.get(method)
    }

    /// Declared methods in synthesis order
    pub fn methods(&self) -> impl Iterator<Item = (&MethodId, &MethodSlot)> + '_ {
        self.slots.iter()
    }

    /// Number of declared methods
    pub fn method_count(&self) -> usize {
        self.slots.len()
    }

    /// Route one call through `table`
    pub fn dispatch(&self, table: &DispatchTable, method: &str, args: &[Value]) -> ProxyResult<Value> {
        let Some(slot) = self.slots.get(method) else {
            log::trace!("call to undeclared method `{}`", method);
            return Err(ProxyError::UnboundMethod {
                method: MethodId::from(method),
                declared: false,
            });
        };

        let Some(handler) = table.get(method) else {
            log::trace!("call to unbound method `{}`", method);
            return Err(ProxyError::UnboundMethod {
                method: MethodId::from(method),
                declared: true,
            });
        };

        let expected = slot.signature.arity();
        if args.len() != expected {
            return Err(ProxyError::ArityMismatch {
                method: MethodId::from(method),
                expected,
                got: args.len(),
            });
        }

        handler(args).map_err(ProxyError::Handler)
    }

    /// First required method with no handler in `table`
    pub(crate) fn first_missing_required(&self, table: &DispatchTable) -> Option<ProxyError> {
        self.slots.iter().find_map(|(id, slot)| {
            let protocol = slot.required_by.as_ref()?;
            if table.contains(id.as_str()) {
                return None;
            }
            Some(ProxyError::MissingRequiredMethod {
                protocol: protocol.clone(),
                method: id.clone(),
            })
        })
    }
}

/// Frozen method → handler map owned by one proxy instance
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: FxIndexMap<MethodId, Handler>,
}

impl DispatchTable {
    pub(crate) fn from_bindings(handlers: FxIndexMap<MethodId, Handler>) -> Self {
        Self { handlers }
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the handler bound for a method
    pub fn get(&self, method: &str) -> Option<&Handler> {
        self.handlers.get(method)
    }

    /// Check if a method has a handler
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Bound methods in binding order
    pub fn method_ids(&self) -> impl Iterator<Item = &MethodId> + '_ {
        self.handlers.keys()
    }

    /// Number of bound methods
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.handlers.keys().map(MethodId::as_str))
            .finish()
    }
}
