//! Proxy type synthesis
//!
//! [`ProxyTypeBuilder`] turns a protocol set into a [`ProxyType`]: a name,
//! an explicit conformance table, and a [`Dispatcher`] over the union of the
//! protocols' methods.
//!
//! Protocols are processed in id order after deduplication, so the declared
//! set, the synthesized name, and the method order do not depend on how the
//! caller ordered its input.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use protean_sdk::{ConformanceRecorder, MethodId, Protocol, ProtocolId};
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::dispatch::{Dispatcher, MethodSlot};
use crate::error::{ProxyError, ProxyResult};
use crate::signature::{normalize, TypeSignature};

/// Unique identifier for a synthesized proxy type
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyTypeId(u64);

static NEXT_PROXY_TYPE_ID: AtomicU64 = AtomicU64::new(1);

impl ProxyTypeId {
    fn next() -> Self {
        ProxyTypeId(NEXT_PROXY_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProxyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A synthesized type conforming to exactly one protocol set
pub struct ProxyType {
    id: ProxyTypeId,
    name: String,
    /// `name` plus `id`; unique among all synthesized types
    qualified_name: String,
    signature: TypeSignature,
    /// Declared protocols in id order
    protocols: Vec<Arc<Protocol>>,
    /// Conformance lookup table
    conformance: FxHashSet<ProtocolId>,
    dispatcher: Dispatcher,
}

impl ProxyType {
    /// Identity of this synthesized type
    pub fn id(&self) -> ProxyTypeId {
        self.id
    }

    /// Display name, e.g. `Proxy<Counter,Greeter>`
    ///
    /// Not unique: distinct protocols may share a name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unique name, e.g. `Proxy<Counter,Greeter>#4`
    ///
    /// Conformance is published under this name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Cache key this type was built for
    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }

    /// Declared protocols in id order
    pub fn protocols(&self) -> &[Arc<Protocol>] {
        &self.protocols
    }

    /// Whether instances of this type conform to `protocol`
    pub fn conforms_to(&self, protocol: &Protocol) -> bool {
        self.conformance.contains(&protocol.id())
    }

    /// Find a declared protocol by name
    pub fn protocol_named(&self, name: &str) -> Option<&Arc<Protocol>> {
        self.protocols.iter().find(|p| p.name() == name)
    }

    /// Whether any declared protocol declares `method`
    pub fn declares(&self, method: &str) -> bool {
        self.dispatcher.declares(method)
    }

    /// The dispatcher installed on this type
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Record this type's conformances with the platform under
    /// [`qualified_name`](Self::qualified_name)
    ///
    /// Idempotent as long as the recorder is.
    pub fn publish_conformance(&self, recorder: &dyn ConformanceRecorder) {
        for protocol in &self.protocols {
            recorder.record_conformance(&self.qualified_name, protocol);
        }
    }
}

impl fmt::Debug for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("methods", &self.dispatcher.method_count())
            .finish()
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder that synthesizes proxy types
#[derive(Debug, Default, Clone, Copy)]
pub struct ProxyTypeBuilder;

impl ProxyTypeBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        ProxyTypeBuilder
    }

    /// Synthesize a type conforming to exactly `protocols`
    ///
    /// Fails with `EmptyProtocolSet` for an empty set and with
    /// `ConflictingContract` when two protocols declare the same method with
    /// different signatures. Identical declarations merge into one slot; a
    /// method required by any protocol is required on the type.
    pub fn build(&self, protocols: &[Arc<Protocol>]) -> ProxyResult<ProxyType> {
        let protocols = normalize(protocols);
        if protocols.is_empty() {
            return Err(ProxyError::EmptyProtocolSet);
        }

        let mut slots: IndexMap<MethodId, MethodSlot, FxBuildHasher> = IndexMap::default();
        for protocol in &protocols {
            for requirement in protocol.methods() {
                match slots.entry(requirement.id.clone()) {
                    Entry::Vacant(vacant) => {
                        vacant.insert(MethodSlot {
                            signature: requirement.signature.clone(),
                            declared_by: protocol.name().to_string(),
                            required_by: requirement
                                .required
                                .then(|| protocol.name().to_string()),
                        });
                    }
                    Entry::Occupied(mut occupied) => {
                        let slot = occupied.get_mut();
                        if slot.signature != requirement.signature {
                            return Err(ProxyError::ConflictingContract {
                                method: requirement.id.clone(),
                                first: slot.declared_by.clone(),
                                first_signature: slot.signature.clone(),
                                second: protocol.name().to_string(),
                                second_signature: requirement.signature.clone(),
                            });
                        }
                        if requirement.required && slot.required_by.is_none() {
                            slot.required_by = Some(protocol.name().to_string());
                        }
                    }
                }
            }
        }

        let id = ProxyTypeId::next();
        let name = synthesize_name(&protocols);
        Ok(ProxyType {
            id,
            qualified_name: format!("{}{}", name, id),
            name,
            signature: TypeSignature::of(&protocols),
            conformance: protocols.iter().map(|p| p.id()).collect(),
            protocols,
            dispatcher: Dispatcher::new(slots),
        })
    }
}

/// `Proxy<A,B,...>` with protocol names sorted; ties keep id order
fn synthesize_name(protocols: &[Arc<Protocol>]) -> String {
    let mut names: Vec<&str> = protocols.iter().map(|p| p.name()).collect();
    names.sort();
    format!("Proxy<{}>", names.join(","))
}
