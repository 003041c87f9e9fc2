//! Protocol registry
//!
//! Name → descriptor lookup plus the platform-side record of which
//! synthesized types conform to which protocols. Proxy factories report
//! conformance here through [`ConformanceRecorder`] so that queries made
//! against the registry agree with the proxies' own `conforms_to`.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{SdkError, SdkResult};
use crate::protocol::{Protocol, ProtocolBuilder, ProtocolId};

/// Sink for conformance declarations made by synthesized types
pub trait ConformanceRecorder: Send + Sync {
    /// Record that the type named `type_name` conforms to `protocol`.
    ///
    /// `type_name` identifies one synthesized type; distinct types never
    /// share it.
    ///
    /// Called again for the same pair whenever a type is re-resolved; must
    /// be idempotent.
    fn record_conformance(&self, type_name: &str, protocol: &Protocol);
}

#[derive(Debug, Default)]
struct RegistryInner {
    by_name: FxHashMap<String, Arc<Protocol>>,
    conformances: FxHashMap<String, FxHashSet<ProtocolId>>,
}

/// Thread-safe registry of protocol descriptors
#[derive(Debug, Default)]
pub struct ProtocolRegistry {
    inner: RwLock<RegistryInner>,
}

impl ProtocolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor and register it under its name
    pub fn declare(&self, builder: ProtocolBuilder) -> SdkResult<Arc<Protocol>> {
        if self.contains(builder.name()) {
            return Err(SdkError::DuplicateProtocol(builder.name().to_string()));
        }
        let protocol = builder.build()?;
        self.register(protocol.clone())?;
        Ok(protocol)
    }

    /// Register an existing descriptor
    ///
    /// Registering the same descriptor twice is a no-op; registering a
    /// different descriptor under a taken name fails.
    pub fn register(&self, protocol: Arc<Protocol>) -> SdkResult<()> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_name.get(protocol.name()) {
            if existing.is_same(&protocol) {
                return Ok(());
            }
            return Err(SdkError::DuplicateProtocol(protocol.name().to_string()));
        }
        log::debug!(
            "registered protocol {} {} with {} methods",
            protocol.name(),
            protocol.id(),
            protocol.methods().len()
        );
        inner.by_name.insert(protocol.name().to_string(), protocol);
        Ok(())
    }

    /// Look up a protocol by name
    pub fn get(&self, name: &str) -> Option<Arc<Protocol>> {
        self.inner.read().by_name.get(name).cloned()
    }

    /// Look up several protocols by name, failing on the first unknown one
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> SdkResult<Vec<Arc<Protocol>>> {
        let inner = self.inner.read();
        names
            .iter()
            .map(|name| {
                inner
                    .by_name
                    .get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| SdkError::UnknownProtocol(name.as_ref().to_string()))
            })
            .collect()
    }

    /// Check if a protocol name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().by_name.contains_key(name)
    }

    /// Number of registered protocols
    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_name.is_empty()
    }

    /// Registered protocol names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether the named type has been recorded as conforming to `protocol`
    pub fn type_conforms(&self, type_name: &str, protocol: &Protocol) -> bool {
        self.inner
            .read()
            .conformances
            .get(type_name)
            .is_some_and(|ids| ids.contains(&protocol.id()))
    }

    /// Names of all types recorded as conforming to `protocol`, sorted
    pub fn conforming_types(&self, protocol: &Protocol) -> Vec<String> {
        let mut types: Vec<String> = self
            .inner
            .read()
            .conformances
            .iter()
            .filter(|(_, ids)| ids.contains(&protocol.id()))
            .map(|(name, _)| name.clone())
            .collect();
        types.sort();
        types
    }
}

impl ConformanceRecorder for ProtocolRegistry {
    fn record_conformance(&self, type_name: &str, protocol: &Protocol) {
        let mut inner = self.inner.write();
        let inserted = inner
            .conformances
            .entry(type_name.to_string())
            .or_default()
            .insert(protocol.id());
        if inserted {
            log::trace!("type {} conforms to {}", type_name, protocol.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MethodSignature;
    use crate::value::ValueKind;

    fn counter_builder() -> ProtocolBuilder {
        Protocol::builder("Counter").required("count", MethodSignature::nullary(ValueKind::Int))
    }

    #[test]
    fn test_registry_creation() {
        let registry = ProtocolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_declare_and_get() {
        let registry = ProtocolRegistry::new();
        let counter = registry.declare(counter_builder()).unwrap();

        assert!(registry.contains("Counter"));
        assert_eq!(registry.len(), 1);
        let fetched = registry.get("Counter").unwrap();
        assert!(fetched.is_same(&counter));
        assert!(registry.get("Greeter").is_none());
    }

    #[test]
    fn test_duplicate_declaration() {
        let registry = ProtocolRegistry::new();
        registry.declare(counter_builder()).unwrap();

        let err = registry.declare(counter_builder()).unwrap_err();
        assert_eq!(err, SdkError::DuplicateProtocol("Counter".to_string()));
    }

    #[test]
    fn test_register_same_descriptor_twice() {
        let registry = ProtocolRegistry::new();
        let counter = counter_builder().build().unwrap();

        registry.register(counter.clone()).unwrap();
        registry.register(counter).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_all() {
        let registry = ProtocolRegistry::new();
        registry.declare(counter_builder()).unwrap();
        registry.declare(Protocol::builder("Empty")).unwrap();

        let found = registry.resolve_all(&["Empty", "Counter"]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name(), "Empty");

        let err = registry.resolve_all(&["Counter", "Nope"]).unwrap_err();
        assert_eq!(err, SdkError::UnknownProtocol("Nope".to_string()));
        assert_eq!(registry.names(), vec!["Counter".to_string(), "Empty".to_string()]);
    }

    #[test]
    fn test_conformance_records() {
        let registry = ProtocolRegistry::new();
        let counter = registry.declare(counter_builder()).unwrap();
        let other = registry.declare(Protocol::builder("Other")).unwrap();

        registry.record_conformance("Proxy<Counter>", &counter);
        registry.record_conformance("Proxy<Counter>", &counter);

        assert!(registry.type_conforms("Proxy<Counter>", &counter));
        assert!(!registry.type_conforms("Proxy<Counter>", &other));
        assert!(!registry.type_conforms("Proxy<Other>", &counter));
        assert_eq!(registry.conforming_types(&counter), vec!["Proxy<Counter>".to_string()]);
        assert!(registry.conforming_types(&other).is_empty());
    }
}
