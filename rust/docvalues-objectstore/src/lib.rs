//! *Object Store* abstraction: a "directory" of immutable named streams capable of
//! issuing positional readers for a given stream name.

pub mod local_store;
pub mod memory_store;

use std::sync::Arc;

use docvalues_io::ReadAt;

pub use local_store::LocalFsObjectStore;
pub use memory_store::MemoryObjectStore;

/// The `ObjectStore` trait represents the directory holding the streams of one or
/// more segments.
///
/// Stream names are flat, e.g. `_0_Memory_0.dvd`; they never contain path separators.
pub trait ObjectStore: Send + Sync + 'static {
    /// Opens a reader for an existing stream.
    ///
    /// The returned handle is independent of the store and stays valid until dropped.
    fn open(&self, name: &str) -> std::io::Result<Arc<dyn ReadAt>>;

    /// Returns `true` if a stream with the given name exists.
    fn exists(&self, name: &str) -> bool;
}

impl<T> ObjectStore for Arc<T>
where
    T: ObjectStore + ?Sized,
{
    fn open(&self, name: &str) -> std::io::Result<Arc<dyn ReadAt>> {
        self.as_ref().open(name)
    }

    fn exists(&self, name: &str) -> bool {
        self.as_ref().exists(name)
    }
}

/// Validates a stream name: non-empty, no path separators, not a relative path
/// component.
pub fn validate_name(name: &str) -> std::io::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid stream name '{name}'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_name;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("_0.dvd").is_ok());
        assert!(validate_name("_0_Memory_0.dvm").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../x.dvd").is_err());
        assert!(validate_name("a\\b").is_err());
    }
}
