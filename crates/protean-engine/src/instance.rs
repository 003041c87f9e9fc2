//! Proxy instances

use std::fmt;
use std::sync::Arc;

use protean_sdk::{MethodId, Protocol, Value};

use crate::builder::ProxyType;
use crate::dispatch::DispatchTable;
use crate::error::ProxyResult;

/// An object conforming to its type's protocols, backed by bound handlers
///
/// Cloning an instance shares its handlers; the dispatch table itself is
/// never mutated after the instance is produced.
#[derive(Clone)]
pub struct ProxyInstance {
    proxy_type: Arc<ProxyType>,
    table: DispatchTable,
}

impl ProxyInstance {
    /// Produce an instance of `proxy_type` dispatching through `table`
    pub fn new(proxy_type: Arc<ProxyType>, table: DispatchTable) -> Self {
        Self { proxy_type, table }
    }

    /// The synthesized type of this instance
    pub fn proxy_type(&self) -> &Arc<ProxyType> {
        &self.proxy_type
    }

    /// Call `method` with `args`
    ///
    /// See [`Dispatcher::dispatch`](crate::Dispatcher::dispatch) for the
    /// failure cases.
    pub fn invoke(&self, method: &str, args: &[Value]) -> ProxyResult<Value> {
        self.proxy_type.dispatcher().dispatch(&self.table, method, args)
    }

    /// Whether this instance conforms to `protocol`
    pub fn conforms_to(&self, protocol: &Protocol) -> bool {
        self.proxy_type.conforms_to(protocol)
    }

    /// Whether invoking `method` would reach a handler
    pub fn responds_to(&self, method: &str) -> bool {
        self.proxy_type.declares(method) && self.table.contains(method)
    }

    /// Whether a handler is bound for `method`
    pub fn is_bound(&self, method: &str) -> bool {
        self.table.contains(method)
    }

    /// Bound methods in binding order
    pub fn bound_methods(&self) -> impl Iterator<Item = &MethodId> + '_ {
        self.table.method_ids()
    }

    /// The instance's dispatch table
    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.table
    }
}

impl fmt::Debug for ProxyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyInstance")
            .field("type", &self.proxy_type.name())
            .field("bound", &self.table)
            .finish()
    }
}
