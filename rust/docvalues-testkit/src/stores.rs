//! Object store helpers for tests.

use std::{
    ops::Range,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use bytes::{Bytes, BytesMut};
use docvalues_io::{ReadAt, StorageProfile};
use docvalues_objectstore::{LocalFsObjectStore, MemoryObjectStore, ObjectStore};

/// Wraps a store and tracks how many of the handles it opened are still alive.
pub struct CountingObjectStore {
    inner: Arc<dyn ObjectStore>,
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl CountingObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> CountingObjectStore {
        CountingObjectStore {
            inner,
            opened: Default::default(),
            live: Default::default(),
        }
    }

    /// Total number of successful `open` calls.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of opened handles not yet dropped.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl ObjectStore for CountingObjectStore {
    fn open(&self, name: &str) -> std::io::Result<Arc<dyn ReadAt>> {
        let inner = self.inner.open(name)?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountedReader {
            inner,
            live: self.live.clone(),
        }))
    }

    fn exists(&self, name: &str) -> bool {
        self.inner.exists(name)
    }
}

struct CountedReader {
    inner: Arc<dyn ReadAt>,
    live: Arc<AtomicUsize>,
}

impl ReadAt for CountedReader {
    fn size(&self) -> std::io::Result<u64> {
        self.inner.size()
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        self.inner.read_at(range)
    }

    fn storage_profile(&self) -> StorageProfile {
        self.inner.storage_profile()
    }
}

impl Drop for CountedReader {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Flips every bit of the byte at `pos` of a stored stream.
pub fn flip_byte(store: &MemoryObjectStore, name: &str, pos: usize) -> anyhow::Result<()> {
    let Some(bytes) = store.get(name) else {
        anyhow::bail!("stream '{name}' not found");
    };
    if pos >= bytes.len() {
        anyhow::bail!("position {pos} beyond stream '{name}' of {} bytes", bytes.len());
    }
    let mut tampered = BytesMut::from(bytes.as_ref());
    tampered[pos] ^= 0xff;
    store.put(name, tampered.freeze())?;
    Ok(())
}

/// Replaces a stored stream with its first `len` bytes.
pub fn truncate(store: &MemoryObjectStore, name: &str, len: usize) -> anyhow::Result<()> {
    let Some(bytes) = store.get(name) else {
        anyhow::bail!("stream '{name}' not found");
    };
    store.put(name, bytes.slice(..len.min(bytes.len())))?;
    Ok(())
}

/// Copies every stream of `source` into a fresh local directory.
///
/// The returned `TempDir` owns the directory; keep it alive while the store is
/// in use.
pub fn copy_to_local(
    source: &MemoryObjectStore,
) -> anyhow::Result<(tempfile::TempDir, LocalFsObjectStore)> {
    let dir = tempfile::tempdir()?;
    for name in source.names() {
        if let Some(bytes) = source.get(&name) {
            std::fs::write(dir.path().join(&name), &bytes)?;
        }
    }
    let store = LocalFsObjectStore::new(dir.path())?;
    Ok((dir, store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_store_tracks_handles() {
        let memory = Arc::new(MemoryObjectStore::new());
        memory.put("a.dvd", vec![1u8, 2, 3]).unwrap();
        let store = CountingObjectStore::new(memory);
        let handle = store.open("a.dvd").unwrap();
        assert_eq!(handle.size().unwrap(), 3);
        assert_eq!((store.opened(), store.live()), (1, 1));
        drop(handle);
        assert_eq!((store.opened(), store.live()), (1, 0));
        assert!(store.open("missing").is_err());
        assert_eq!(store.opened(), 1);
    }

    #[test]
    fn test_flip_byte() {
        let memory = MemoryObjectStore::new();
        memory.put("x", vec![0u8, 0x0f]).unwrap();
        flip_byte(&memory, "x", 1).unwrap();
        assert_eq!(memory.get("x").unwrap().as_ref(), &[0u8, 0xf0]);
        assert!(flip_byte(&memory, "x", 2).is_err());
    }

    #[test]
    fn test_copy_to_local() {
        let memory = MemoryObjectStore::new();
        memory.put("_0.dvm", vec![7u8; 10]).unwrap();
        let (_dir, local) = copy_to_local(&memory).unwrap();
        assert!(local.exists("_0.dvm"));
        assert_eq!(local.open("_0.dvm").unwrap().size().unwrap(), 10);
    }
}
