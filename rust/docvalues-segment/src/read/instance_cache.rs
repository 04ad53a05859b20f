//! Per-field cache of lazily constructed column instances.

use std::sync::{Arc, Mutex, OnceLock, RwLock};

use ahash::AHashMap;
use docvalues_common::Result;

/// Lazily populated, never evicted map from field number to a shared instance.
///
/// The map lock is held only to find or insert a slot. Construction runs under the
/// slot's own mutex, so different fields are built in parallel while concurrent
/// requests for the same field wait for a single construction. A failed
/// construction publishes nothing; the next request retries.
pub struct InstanceCache<V> {
    slots: RwLock<AHashMap<u32, Arc<Slot<V>>>>,
}

struct Slot<V> {
    value: OnceLock<V>,
    init: Mutex<()>,
}

impl<V> Slot<V> {
    fn new() -> Slot<V> {
        Slot {
            value: OnceLock::new(),
            init: Mutex::new(()),
        }
    }
}

impl<V: Clone> InstanceCache<V> {
    pub fn new() -> InstanceCache<V> {
        InstanceCache {
            slots: Default::default(),
        }
    }

    /// Returns the published instance for `key`, if any.
    pub fn get(&self, key: u32) -> Option<V> {
        self.slots
            .read()
            .expect("read lock")
            .get(&key)
            .and_then(|slot| slot.value.get().cloned())
    }

    /// Returns the instance for `key`, constructing it with `init` on first use.
    ///
    /// The flag is `true` when this call constructed the instance.
    pub fn get_or_try_init<F>(&self, key: u32, init: F) -> Result<(V, bool)>
    where
        F: FnOnce() -> Result<V>,
    {
        let slot = self.slot(key);
        if let Some(value) = slot.value.get() {
            return Ok((value.clone(), false));
        }

        let _guard = slot.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = slot.value.get() {
            return Ok((value.clone(), false));
        }
        let value = init()?;
        let _ = slot.value.set(value.clone());
        Ok((value, true))
    }

    /// Number of published instances.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .expect("read lock")
            .values()
            .filter(|slot| slot.value.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: u32) -> Arc<Slot<V>> {
        if let Some(slot) = self.slots.read().expect("read lock").get(&key) {
            return slot.clone();
        }
        self.slots
            .write()
            .expect("write lock")
            .entry(key)
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }
}

impl<V: Clone> Default for InstanceCache<V> {
    fn default() -> Self {
        InstanceCache::new()
    }
}
