use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use bytes::Bytes;
use docvalues_io::ReadAt;

use crate::{ObjectStore, validate_name};

/// An in-memory object store. Streams are immutable once put; putting a stream under
/// an existing name replaces it for subsequent `open` calls only.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<AHashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> MemoryObjectStore {
        Default::default()
    }

    pub fn put(&self, name: &str, data: impl Into<Bytes>) -> std::io::Result<()> {
        validate_name(name)?;
        self.objects
            .write()
            .map_err(|_| std::io::Error::other("memory store lock poisoned"))?
            .insert(name.to_string(), data.into());
        Ok(())
    }

    /// Returns the current contents of a stream.
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.objects.read().ok()?.get(name).cloned()
    }

    /// Lists the stored stream names in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl ObjectStore for MemoryObjectStore {
    fn open(&self, name: &str) -> std::io::Result<Arc<dyn ReadAt>> {
        validate_name(name)?;
        let data = self.get(name).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("'{name}' not found"))
        })?;
        Ok(Arc::new(data))
    }

    fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
