use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use docvalues_common::error::Error;
use docvalues_io::{FileReader, ReadAt};

use crate::{ObjectStore, validate_name};

/// A `LocalFsObjectStore` implementation that serves streams stored as files in a
/// single local directory. Names are confined to that directory.
pub struct LocalFsObjectStore {
    container_path: PathBuf,
}

impl LocalFsObjectStore {
    /// Creates a new `LocalFsObjectStore` over the given directory.
    ///
    /// The directory must exist.
    pub fn new(container_path: &Path) -> docvalues_common::Result<LocalFsObjectStore> {
        if !container_path.is_dir() {
            return Err(Error::invalid_arg(
                "container",
                format!("{container_path:?} is not a directory"),
            ));
        }
        Ok(LocalFsObjectStore {
            container_path: container_path.to_path_buf(),
        })
    }

    /// Returns the file system path of the store's directory.
    pub fn container_path(&self) -> &Path {
        &self.container_path
    }

    /// Converts a stream name to a path inside the container.
    pub fn name_to_path(&self, name: &str) -> std::io::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.container_path.join(name))
    }
}

impl ObjectStore for LocalFsObjectStore {
    fn open(&self, name: &str) -> std::io::Result<Arc<dyn ReadAt>> {
        let path = self.name_to_path(name)?;
        Ok(Arc::new(FileReader::open(path)?))
    }

    fn exists(&self, name: &str) -> bool {
        self.name_to_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("_0.dvm"), b"meta").unwrap();

        let store = LocalFsObjectStore::new(dir.path()).unwrap();
        assert!(store.exists("_0.dvm"));
        assert!(!store.exists("_0.dvd"));
        let reader = store.open("_0.dvm").unwrap();
        assert_eq!(reader.read_at(0..4).unwrap().as_ref(), b"meta");

        assert!(store.open("_0.dvd").is_err());
        assert!(store.open("../_0.dvm").is_err());
    }

    #[test]
    fn test_missing_container() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(LocalFsObjectStore::new(&missing).is_err());
    }
}
