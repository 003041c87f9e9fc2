//! Proxy type cache
//!
//! Maps [`TypeSignature`] → synthesized [`ProxyType`] so each distinct
//! protocol set is synthesized at most once per cache.
//!
//! ## Locking
//!
//! Each signature owns a slot (`Arc<OnceCell<..>>`) in a sharded map. The
//! shard lock is held only long enough to fetch or create the slot; the
//! build itself runs inside the slot's `get_or_try_init`, so:
//! - concurrent resolves of the same signature run exactly one build and
//!   the rest wait for its result;
//! - resolves of different signatures never wait on each other's builds;
//! - a failed build leaves the slot empty, and the slot is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rustc_hash::FxBuildHasher;

use crate::builder::ProxyType;
use crate::error::ProxyResult;
use crate::signature::TypeSignature;

type Slot = Arc<OnceCell<Arc<ProxyType>>>;

static GLOBAL_CACHE: OnceLock<Arc<ProxyTypeCache>> = OnceLock::new();

/// Thread-safe registry of synthesized proxy types
pub struct ProxyTypeCache {
    /// Signature → slot holding the type once built
    slots: DashMap<TypeSignature, Slot, FxBuildHasher>,
    /// Number of builds that actually ran and succeeded
    syntheses: AtomicU64,
}

impl ProxyTypeCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            slots: DashMap::with_hasher(FxBuildHasher),
            syntheses: AtomicU64::new(0),
        }
    }

    /// The process-wide cache
    pub fn global() -> Arc<ProxyTypeCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(ProxyTypeCache::new()))
            .clone()
    }

    /// Return the type cached for `signature`, building it with `build` on a miss
    ///
    /// If `build` fails, its error is returned and nothing is cached.
    pub fn resolve<F>(&self, signature: &TypeSignature, build: F) -> ProxyResult<Arc<ProxyType>>
    where
        F: FnOnce() -> ProxyResult<ProxyType>,
    {
        if let Some(ty) = self.get(signature) {
            log::trace!("proxy type cache hit for {}", signature);
            return Ok(ty);
        }

        let slot: Slot = self
            .slots
            .entry(signature.clone())
            .or_insert_with(Slot::default)
            .value()
            .clone();

        let result = slot
            .get_or_try_init(|| {
                let ty = build()?;
                self.syntheses.fetch_add(1, Ordering::Relaxed);
                log::debug!("synthesized proxy type {} for {}", ty.qualified_name(), signature);
                Ok(Arc::new(ty))
            })
            .map(Arc::clone);

        if result.is_err() {
            self.slots
                .remove_if(signature, |_, slot| slot.get().is_none());
        }
        result
    }

    /// Get a cached type without building
    pub fn get(&self, signature: &TypeSignature) -> Option<Arc<ProxyType>> {
        self.slots
            .get(signature)
            .and_then(|entry| entry.value().get().cloned())
    }

    /// Check if a type is cached for `signature`
    pub fn contains(&self, signature: &TypeSignature) -> bool {
        self.get(signature).is_some()
    }

    /// Number of cached types
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Check if no types are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful builds run by this cache
    pub fn synthesis_count(&self) -> u64 {
        self.syntheses.load(Ordering::Relaxed)
    }

    /// Drop every cached type
    ///
    /// Types already handed out stay alive through their `Arc`s; later
    /// resolves synthesize fresh ones.
    pub fn clear(&self) {
        self.slots.clear();
    }
}

impl Default for ProxyTypeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProxyTypeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyTypeCache")
            .field("types", &self.len())
            .field("syntheses", &self.synthesis_count())
            .finish()
    }
}
