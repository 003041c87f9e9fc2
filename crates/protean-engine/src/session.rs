//! Binding sessions
//!
//! A [`BindingSession`] accumulates method → handler bindings for one proxy
//! construction. The session is a plain value owned by the constructing
//! call; nothing about it is shared or global, so concurrent constructions
//! cannot observe each other's bindings.
//!
//! ## States
//!
//! ```text
//! start() ──▶ Accumulating ──commit()──▶ Committed ──produce()──▶ Produced
//!              │  bind()*                 │                        │
//!              │                          bind()/commit() → SessionClosed
//!              produce() → SessionNotReady                         any call → SessionClosed
//! ```
//!
//! Binding the same method twice replaces the earlier handler (last write
//! wins); the method keeps its first position in binding order.

use std::sync::Arc;

use indexmap::IndexMap;
use protean_sdk::{Handler, MethodId};
use rustc_hash::FxBuildHasher;

use crate::builder::ProxyType;
use crate::dispatch::DispatchTable;
use crate::error::{ProxyError, ProxyResult};
use crate::instance::ProxyInstance;

/// Lifecycle state of a binding session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting bindings
    Accumulating,
    /// Frozen into a dispatch table, waiting to produce an instance
    Committed,
    /// Instance produced; the session is spent
    Produced,
}

/// Per-construction accumulator of method bindings
pub struct BindingSession {
    state: SessionState,
    bindings: IndexMap<MethodId, Handler, FxBuildHasher>,
    table: Option<DispatchTable>,
}

impl BindingSession {
    /// Begin an empty session
    pub fn start() -> Self {
        Self {
            state: SessionState::Accumulating,
            bindings: IndexMap::default(),
            table: None,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of distinct methods bound so far
    pub fn len(&self) -> usize {
        match &self.table {
            Some(table) => table.len(),
            None => self.bindings.len(),
        }
    }

    /// Check if nothing has been bound
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind `handler` to `method`
    ///
    /// A later bind for the same method replaces the earlier handler.
    /// Fails with `SessionClosed` once the session has been committed.
    pub fn bind(&mut self, method: impl Into<MethodId>, handler: Handler) -> ProxyResult<&mut Self> {
        if self.state != SessionState::Accumulating {
            return Err(ProxyError::SessionClosed);
        }
        let method = method.into();
        if self.bindings.insert(method.clone(), handler).is_some() {
            log::trace!("binding for `{}` replaced", method);
        }
        Ok(self)
    }

    /// Freeze the bindings into a dispatch table
    ///
    /// Fails with `SessionClosed` if the session was already committed.
    pub fn commit(&mut self) -> ProxyResult<&DispatchTable> {
        if self.state != SessionState::Accumulating {
            return Err(ProxyError::SessionClosed);
        }
        let bindings = std::mem::take(&mut self.bindings);
        self.state = SessionState::Committed;
        Ok(self.table.insert(DispatchTable::from_bindings(bindings)))
    }

    /// Produce an instance of `proxy_type` owning the committed table
    ///
    /// Fails with `SessionNotReady` before `commit` and with
    /// `SessionClosed` once an instance has been produced.
    pub fn produce(&mut self, proxy_type: &Arc<ProxyType>) -> ProxyResult<ProxyInstance> {
        match self.state {
            SessionState::Accumulating => Err(ProxyError::SessionNotReady),
            SessionState::Produced => Err(ProxyError::SessionClosed),
            SessionState::Committed => {
                let table = self.table.take().ok_or(ProxyError::SessionNotReady)?;
                self.state = SessionState::Produced;
                Ok(ProxyInstance::new(Arc::clone(proxy_type), table))
            }
        }
    }
}

impl Default for BindingSession {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Debug for BindingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSession")
            .field("state", &self.state)
            .field("bindings", &self.len())
            .finish()
    }
}
