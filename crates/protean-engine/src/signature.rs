//! Type signatures - cache keys for synthesized proxy types
//!
//! A signature is the sorted, deduplicated list of protocol ids in a
//! requested set, so `{A, B}`, `{B, A}` and `{A, B, A}` all produce the same
//! key.

use std::fmt;
use std::sync::Arc;

use protean_sdk::{Protocol, ProtocolId};

/// Order-independent, duplicate-independent key for a protocol set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSignature {
    ids: Box<[ProtocolId]>,
}

impl TypeSignature {
    /// Compute the signature of a protocol set
    pub fn of(protocols: &[Arc<Protocol>]) -> Self {
        let mut ids: Vec<ProtocolId> = protocols.iter().map(|p| p.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        Self {
            ids: ids.into_boxed_slice(),
        }
    }

    /// Protocol ids in ascending order
    pub fn ids(&self) -> &[ProtocolId] {
        &self.ids
    }

    /// Number of distinct protocols
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the signature names no protocols
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check if a protocol is part of the set
    pub fn contains(&self, id: ProtocolId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id.as_u64())?;
        }
        write!(f, "]")
    }
}

/// Sort a protocol set by identity and drop duplicates
pub(crate) fn normalize(protocols: &[Arc<Protocol>]) -> Vec<Arc<Protocol>> {
    let mut sorted = protocols.to_vec();
    sorted.sort_by_key(|p| p.id());
    sorted.dedup_by_key(|p| p.id());
    sorted
}
