//! Memoization of scan results, for callers that request the same computation repeatedly.
//!
//! The scanners never consult a cache themselves. A caller wraps a scan in
//! [`ScanCache::get_or_compute`], keyed by whatever identifies its inputs (strain set, chromosome).

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;
use twox_hash::XxHash64;

use crate::error::Result;

type KeyMap<K, V> = HashMap<K, V, BuildHasherDefault<XxHash64>>;

/// Where cached artifacts live.
pub trait ArtifactStore<K, V>: Send + Sync {
    fn load(&self, key: &K) -> Option<V>;

    fn store(&self, key: K, value: V);
}

/// An [`ArtifactStore`] keeping every artifact in memory for the lifetime of the store.
pub struct MemoryStore<K, V> {
    entries: Mutex<KeyMap<K, V>>,
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(KeyMap::default()),
        }
    }
}

impl<K, V> MemoryStore<K, V> {
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> ArtifactStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn load(&self, key: &K) -> Option<V> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: K, value: V) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }
}

/// A cache in front of an [`ArtifactStore`] that runs at most one computation per key at a time.
/// Concurrent requests for a key wait for the running computation and reuse its result.
pub struct ScanCache<K, V, S = MemoryStore<K, V>> {
    store: S,
    in_flight: Mutex<KeyMap<K, Arc<Mutex<()>>>>,
    _value: std::marker::PhantomData<fn() -> V>,
}

impl<K, V> Default for ScanCache<K, V, MemoryStore<K, V>> {
    fn default() -> Self {
        Self::with_store(MemoryStore::default())
    }
}

impl<K, V, S> ScanCache<K, V, S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            in_flight: Mutex::new(KeyMap::default()),
            _value: std::marker::PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<K, V, S> ScanCache<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: ArtifactStore<K, V>,
{
    /// Return the stored artifact for `key`, or run `compute` and store its result. Failed
    /// computations are not stored, so a later request runs them again.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.store.load(&key) {
            return Ok(value);
        }

        let gate = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone();
        let _running = gate.lock().unwrap_or_else(PoisonError::into_inner);

        // another request may have finished while we waited
        if let Some(value) = self.store.load(&key) {
            trace!("reusing artifact computed concurrently");
            return Ok(value);
        }

        let result = compute();
        if let Ok(value) = &result {
            self.store.store(key.clone(), value.clone());
        }
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        result
    }
}
