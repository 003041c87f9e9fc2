//! Proxy factory - the public construction surface
//!
//! A [`ProxyFactory`] ties together a type cache, creation options, and an
//! optional conformance recorder. The crate-root functions use a factory
//! over the process-wide cache with default options.

use std::fmt;
use std::sync::Arc;

use protean_sdk::{ConformanceRecorder, Handler, MethodId, Protocol};

use crate::builder::{ProxyType, ProxyTypeBuilder};
use crate::cache::ProxyTypeCache;
use crate::error::{ProxyError, ProxyResult};
use crate::instance::ProxyInstance;
use crate::options::{ProxyOptions, UndeclaredBindings};
use crate::session::BindingSession;
use crate::signature::TypeSignature;

/// Creates proxy types and instances against one cache
#[derive(Clone)]
pub struct ProxyFactory {
    cache: Arc<ProxyTypeCache>,
    options: ProxyOptions,
    recorder: Option<Arc<dyn ConformanceRecorder>>,
}

impl ProxyFactory {
    /// Factory over the process-wide cache with default options
    pub fn new() -> Self {
        Self::with_cache(ProxyTypeCache::global())
    }

    /// Factory over an explicit cache
    pub fn with_cache(cache: Arc<ProxyTypeCache>) -> Self {
        Self {
            cache,
            options: ProxyOptions::default(),
            recorder: None,
        }
    }

    /// Replace the creation options
    pub fn options(mut self, options: ProxyOptions) -> Self {
        self.options = options;
        self
    }

    /// Publish conformance of every resolved type to `recorder`
    pub fn recorder(mut self, recorder: Arc<dyn ConformanceRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// The cache this factory resolves types in
    pub fn cache(&self) -> &Arc<ProxyTypeCache> {
        &self.cache
    }

    /// The creation options in effect
    pub fn current_options(&self) -> &ProxyOptions {
        &self.options
    }

    /// The type conforming to exactly `protocols`, synthesized on first use
    pub fn type_for(&self, protocols: &[Arc<Protocol>]) -> ProxyResult<Arc<ProxyType>> {
        if protocols.is_empty() {
            return Err(ProxyError::EmptyProtocolSet);
        }
        let signature = TypeSignature::of(protocols);
        let proxy_type = self
            .cache
            .resolve(&signature, || ProxyTypeBuilder::new().build(protocols))?;
        if let Some(recorder) = &self.recorder {
            proxy_type.publish_conformance(recorder.as_ref());
        }
        Ok(proxy_type)
    }

    /// Single-protocol form of [`type_for`](Self::type_for)
    pub fn type_for_protocol(&self, protocol: &Arc<Protocol>) -> ProxyResult<Arc<ProxyType>> {
        self.type_for(std::slice::from_ref(protocol))
    }

    /// Create an instance conforming to `protocols` backed by `bindings`
    ///
    /// Later bindings for the same method replace earlier ones. Bindings for
    /// methods none of the protocols declare are rejected or dropped per
    /// [`ProxyOptions::undeclared_bindings`].
    pub fn create_proxy<I, K>(&self, protocols: &[Arc<Protocol>], bindings: I) -> ProxyResult<ProxyInstance>
    where
        I: IntoIterator<Item = (K, Handler)>,
        K: Into<MethodId>,
    {
        let proxy_type = self.type_for(protocols)?;

        let mut session = BindingSession::start();
        for (method, handler) in bindings {
            let method = method.into();
            if !proxy_type.declares(method.as_str()) {
                match self.options.undeclared_bindings {
                    UndeclaredBindings::Reject => {
                        return Err(ProxyError::UndeclaredBinding { method });
                    }
                    UndeclaredBindings::Ignore => {
                        log::debug!(
                            "ignoring binding for `{}`: not declared by {}",
                            method,
                            proxy_type.name()
                        );
                        continue;
                    }
                }
            }
            session.bind(method, handler)?;
        }

        let table = session.commit()?;
        if self.options.require_complete {
            if let Some(err) = proxy_type.dispatcher().first_missing_required(table) {
                return Err(err);
            }
        }

        session.produce(&proxy_type)
    }

    /// Single-protocol form of [`create_proxy`](Self::create_proxy)
    pub fn create_proxy_for<I, K>(&self, protocol: &Arc<Protocol>, bindings: I) -> ProxyResult<ProxyInstance>
    where
        I: IntoIterator<Item = (K, Handler)>,
        K: Into<MethodId>,
    {
        self.create_proxy(std::slice::from_ref(protocol), bindings)
    }
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyFactory")
            .field("cache", &self.cache)
            .field("options", &self.options)
            .field("recorder", &self.recorder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_sdk::{constant, MethodSignature, ProtocolRegistry, Value, ValueKind};

    fn local() -> ProxyFactory {
        ProxyFactory::with_cache(Arc::new(ProxyTypeCache::new()))
    }

    fn greeter() -> Arc<Protocol> {
        Protocol::builder("Greeter")
            .required("greet", MethodSignature::nullary(ValueKind::Str))
            .optional("farewell", MethodSignature::nullary(ValueKind::Str))
            .build()
            .unwrap()
    }

    #[test]
    fn test_type_for_is_cached() {
        let factory = local();
        let g = greeter();

        let first = factory.type_for_protocol(&g).unwrap();
        let second = factory.type_for(&[g.clone(), g.clone()]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.cache().synthesis_count(), 1);
    }

    #[test]
    fn test_type_for_empty() {
        let err = local().type_for(&[]).unwrap_err();
        assert!(matches!(err, ProxyError::EmptyProtocolSet));
    }

    #[test]
    fn test_create_proxy() {
        let factory = local();
        let g = greeter();

        let proxy = factory
            .create_proxy_for(&g, [("greet", constant("hello"))])
            .unwrap();
        assert_eq!(proxy.invoke("greet", &[]).unwrap(), Value::from("hello"));
        assert!(proxy.conforms_to(&g));
    }

    #[test]
    fn test_undeclared_binding_rejected() {
        let factory = local();
        let err = factory
            .create_proxy_for(&greeter(), [("shout", constant("HEY"))])
            .unwrap_err();
        match err {
            ProxyError::UndeclaredBinding { method } => assert_eq!(method.as_str(), "shout"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_undeclared_binding_ignored() {
        let factory = local().options(ProxyOptions::new().undeclared_bindings(UndeclaredBindings::Ignore));
        let proxy = factory
            .create_proxy_for(
                &greeter(),
                [("shout", constant("HEY")), ("greet", constant("hi"))],
            )
            .unwrap();

        assert!(!proxy.is_bound("shout"));
        let err = proxy.invoke("shout", &[]).unwrap_err();
        assert!(matches!(err, ProxyError::UnboundMethod { declared: false, .. }));
    }

    #[test]
    fn test_require_complete() {
        let factory = local().options(ProxyOptions::strict());
        let g = greeter();

        let err = factory
            .create_proxy_for(&g, Vec::<(&str, Handler)>::new())
            .unwrap_err();
        assert!(matches!(err, ProxyError::MissingRequiredMethod { .. }));

        // `farewell` is optional
        assert!(factory.create_proxy_for(&g, [("greet", constant("hi"))]).is_ok());
    }

    #[test]
    fn test_incomplete_allowed_by_default() {
        let proxy = local()
            .create_proxy_for(&greeter(), Vec::<(&str, Handler)>::new())
            .unwrap();
        let err = proxy.invoke("greet", &[]).unwrap_err();
        assert!(err.is_unbound());
    }

    #[test]
    fn test_recorder_published_on_every_resolve() {
        let registry = Arc::new(ProtocolRegistry::new());
        let cache = Arc::new(ProxyTypeCache::new());
        let g = greeter();

        // First synthesized without a recorder
        let ty = ProxyFactory::with_cache(cache.clone()).type_for_protocol(&g).unwrap();
        assert!(!registry.type_conforms(ty.qualified_name(), &g));

        let recording = ProxyFactory::with_cache(cache).recorder(registry.clone());
        recording.type_for_protocol(&g).unwrap();
        assert!(registry.type_conforms(ty.qualified_name(), &g));
    }
}
