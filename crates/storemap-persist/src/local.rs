//! Primary medium: one file per key under a directory, with a total quota.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{check_key, StateStore, StorageError};

const ENTRY_EXT: &str = "json";

#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
    quota_bytes: usize,
}

impl LocalStore {
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota_bytes })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXT}"))
    }

    /// Bytes used by every entry except `skip`.
    fn used_bytes_excluding(&self, skip: &Path) -> Result<usize, StorageError> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path == skip || path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
                continue;
            }
            let len = usize::try_from(entry.metadata()?.len()).unwrap_or(usize::MAX);
            total = total.saturating_add(len);
        }
        Ok(total)
    }
}

impl StateStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        match fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let path = self.entry_path(key);
        let needed = self.used_bytes_excluding(&path)?.saturating_add(value.len());
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed,
                quota: self.quota_bytes,
            });
        }

        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), 1024).unwrap();
        store.set("storeMapState", r#"{"ver":1}"#).unwrap();

        let reopened = LocalStore::open(dir.path(), 1024).unwrap();
        assert_eq!(
            reopened.get("storeMapState").unwrap().as_deref(),
            Some(r#"{"ver":1}"#)
        );
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), 1024).unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
        store.remove("absent").unwrap();
    }

    #[test]
    fn quota_counts_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), 10).unwrap();
        store.set("a", "123456").unwrap();
        let err = store.set("b", "12345").unwrap_err();
        assert!(
            matches!(err, StorageError::QuotaExceeded { needed: 11, quota: 10 }),
            "got {err:?}"
        );
        // Overwriting an entry only counts its new size.
        store.set("a", "1234567890").unwrap();
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), 1024).unwrap();
        let err = store.set("../escape", "x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
