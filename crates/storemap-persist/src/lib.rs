//! Persistence of the store-map filter state.
//!
//! A [`StateStore`] is a small string key-value medium. Three media exist,
//! tried in order at startup: a directory-backed primary store with a quota,
//! a cookie-jar fallback with a per-entry size limit and expiry, and an
//! in-memory store that lasts for the session only. The [`writer`] task
//! coalesces model changes and writes the blob after a quiet period.

mod cookie;
mod error;
mod local;
mod memory;
mod probe;
pub mod writer;

pub use cookie::CookieStore;
pub use error::StorageError;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use probe::{select_store, StorageConfig};
pub use writer::{clear_state, discard, load_state, spawn_writer};

/// A string key-value medium for the persisted blob.
pub trait StateStore: Send + Sync {
    /// Short medium name used in logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys become file names, so only a conservative alphabet is accepted.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
