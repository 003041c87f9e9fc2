//! Concurrency tests for the proxy type cache and proxy construction

use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use protean_engine::{
    constant, MethodSignature, Protocol, ProxyFactory, ProxyType, ProxyTypeBuilder,
    ProxyTypeCache, TypeSignature, Value, ValueKind,
};

fn greeter() -> Arc<Protocol> {
    Protocol::builder("Greeter")
        .required("greet", MethodSignature::nullary(ValueKind::Str))
        .build()
        .unwrap()
}

fn counter() -> Arc<Protocol> {
    Protocol::builder("Counter")
        .required("count", MethodSignature::nullary(ValueKind::Int))
        .build()
        .unwrap()
}

mod type_cache {
    use super::*;

    #[test]
    fn test_concurrent_type_for_synthesizes_once() {
        const THREADS: usize = 100;

        let cache = Arc::new(ProxyTypeCache::new());
        let protocols = vec![greeter(), counter()];
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                let mut protocols = protocols.clone();
                if i % 2 == 1 {
                    protocols.reverse();
                }
                thread::spawn(move || {
                    barrier.wait();
                    ProxyFactory::with_cache(cache).type_for(&protocols).unwrap()
                })
            })
            .collect();

        let types: Vec<Arc<ProxyType>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let first = &types[0];
        assert!(types.iter().all(|ty| Arc::ptr_eq(ty, first)));
        assert_eq!(cache.synthesis_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_signatures_do_not_block() {
        let cache = Arc::new(ProxyTypeCache::new());
        let slow = vec![greeter()];
        let fast = vec![counter()];

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slow_cache = cache.clone();
        let slow_handle = thread::spawn(move || {
            let sig = TypeSignature::of(&slow);
            slow_cache
                .resolve(&sig, || {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    ProxyTypeBuilder::new().build(&slow)
                })
                .unwrap()
        });

        // The slow build is now in progress and holding its slot
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let fast_cache = cache.clone();
        let fast_handle = thread::spawn(move || {
            let ty = ProxyFactory::with_cache(fast_cache).type_for(&fast).unwrap();
            done_tx.send(()).unwrap();
            ty
        });

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("resolve of an unrelated signature waited on another build");

        release_tx.send(()).unwrap();
        let slow_ty = slow_handle.join().unwrap();
        let fast_ty = fast_handle.join().unwrap();

        assert_eq!(slow_ty.name(), "Proxy<Greeter>");
        assert_eq!(fast_ty.name(), "Proxy<Counter>");
        assert_eq!(cache.synthesis_count(), 2);
    }
}

mod construction {
    use super::*;

    #[test]
    fn test_concurrent_create_proxy_isolated_bindings() {
        const THREADS: usize = 32;

        let factory = ProxyFactory::with_cache(Arc::new(ProxyTypeCache::new()));
        let g = greeter();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let factory = factory.clone();
                let g = g.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let proxy = factory
                        .create_proxy_for(&g, [("greet", constant(format!("hello {i}")))])
                        .unwrap();
                    (i, proxy)
                })
            })
            .collect();

        for handle in handles {
            let (i, proxy) = handle.join().unwrap();
            assert_eq!(
                proxy.invoke("greet", &[]).unwrap(),
                Value::from(format!("hello {i}"))
            );
        }
        assert_eq!(factory.cache().synthesis_count(), 1);
    }

    #[test]
    fn test_instance_shared_across_threads() {
        let factory = ProxyFactory::with_cache(Arc::new(ProxyTypeCache::new()));
        let proxy = Arc::new(
            factory
                .create_proxy_for(&counter(), [("count", constant(9))])
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let proxy = proxy.clone();
                thread::spawn(move || proxy.invoke("count", &[]).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Value::from(9));
        }
    }
}
