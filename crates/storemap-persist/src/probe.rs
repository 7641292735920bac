//! Startup selection of the storage medium.

use std::path::PathBuf;
use std::sync::Arc;

use storemap_core::AppConfig;

use crate::{CookieStore, LocalStore, MemoryStore, StateStore, StorageError};

const PROBE_KEY: &str = "__storemap_probe__";
const PROBE_VALUE: &str = "1";

/// Storage settings taken from the application config.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub state_dir: PathBuf,
    pub quota_bytes: usize,
    pub cookie_max_bytes: usize,
    pub cookie_max_age_days: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            state_dir: config.state_dir.clone(),
            quota_bytes: config.storage_quota_bytes,
            cookie_max_bytes: config.cookie_max_bytes,
            cookie_max_age_days: config.cookie_max_age_days,
        }
    }
}

/// Write, read back and remove a marker value.
fn probe(store: &dyn StateStore) -> Result<(), StorageError> {
    store.set(PROBE_KEY, PROBE_VALUE)?;
    let read = store.get(PROBE_KEY)?;
    store.remove(PROBE_KEY)?;
    if read.as_deref() == Some(PROBE_VALUE) {
        Ok(())
    } else {
        Err(StorageError::Unavailable(format!(
            "{} store did not return the probe value",
            store.name()
        )))
    }
}

fn open_local(config: &StorageConfig) -> Result<LocalStore, StorageError> {
    let store = LocalStore::open(config.state_dir.join("local"), config.quota_bytes)?;
    probe(&store)?;
    Ok(store)
}

fn open_cookie(config: &StorageConfig) -> Result<CookieStore, StorageError> {
    let max_age = chrono::Duration::days(i64::from(config.cookie_max_age_days));
    let store = CookieStore::open(config.state_dir.join("cookie"), config.cookie_max_bytes, max_age)?;
    probe(&store)?;
    Ok(store)
}

/// Pick the first medium that passes a write-read probe: local, then cookie,
/// then memory. Never fails; the memory store always works.
#[must_use]
pub fn select_store(config: &StorageConfig) -> Arc<dyn StateStore> {
    match open_local(config) {
        Ok(store) => {
            tracing::debug!(dir = %store.dir().display(), "using local state storage");
            return Arc::new(store);
        }
        Err(e) => tracing::warn!(error = %e, "local state storage unavailable, trying cookie jar"),
    }

    match open_cookie(config) {
        Ok(store) => return Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "cookie state storage unavailable, state will not survive restart");
        }
    }

    Arc::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            state_dir: dir.to_path_buf(),
            quota_bytes: 1024,
            cookie_max_bytes: 4096,
            cookie_max_age_days: 365,
        }
    }

    #[test]
    fn writable_dir_selects_local() {
        let dir = tempfile::tempdir().unwrap();
        let store = select_store(&config(dir.path()));
        assert_eq!(store.name(), "local");
        assert_eq!(store.get(PROBE_KEY).unwrap(), None);
    }

    #[test]
    fn zero_quota_falls_back_to_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.quota_bytes = 0;
        assert_eq!(select_store(&cfg).name(), "cookie");
    }

    #[test]
    fn unusable_dir_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        assert_eq!(select_store(&config(&blocker)).name(), "memory");
    }
}
