//! Fallback medium modelled on a browser cookie jar: values are
//! percent-encoded, each entry has a size limit, and entries expire.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use storemap_core::URI_COMPONENT;

use crate::{check_key, StateStore, StorageError};

const JAR_FILE: &str = "cookies.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CookieEntry {
    value: String,
    expires: DateTime<Utc>,
}

type Jar = BTreeMap<String, CookieEntry>;

#[derive(Debug)]
pub struct CookieStore {
    path: PathBuf,
    max_bytes: usize,
    max_age: Duration,
    lock: Mutex<()>,
}

impl CookieStore {
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(
        dir: impl Into<PathBuf>,
        max_bytes: usize,
        max_age: Duration,
    ) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(JAR_FILE),
            max_bytes,
            max_age,
            lock: Mutex::new(()),
        })
    }

    fn read_jar(&self) -> Result<Jar, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Jar::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_jar(&self, jar: &Jar) -> Result<(), StorageError> {
        let raw = serde_json::to_string(jar)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Run `f` on the jar with expired entries already dropped.
    fn with_jar<T>(
        &self,
        f: impl FnOnce(&mut Jar) -> Result<(T, bool), StorageError>,
    ) -> Result<T, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("cookie jar lock poisoned".to_string()))?;
        let mut jar = self.read_jar()?;
        let now = Utc::now();
        let before = jar.len();
        jar.retain(|_, entry| entry.expires > now);
        let (out, dirty) = f(&mut jar)?;
        if dirty || jar.len() != before {
            self.write_jar(&jar)?;
        }
        Ok(out)
    }
}

impl StateStore for CookieStore {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        self.with_jar(|jar| {
            let Some(entry) = jar.get(key) else {
                return Ok((None, false));
            };
            let value = percent_decode_str(&entry.value)
                .decode_utf8()
                .map_err(|e| StorageError::Unavailable(format!("corrupt cookie '{key}': {e}")))?;
            Ok((Some(value.into_owned()), false))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let encoded = utf8_percent_encode(value, URI_COMPONENT).to_string();
        let size = key.len() + 1 + encoded.len();
        if size > self.max_bytes {
            return Err(StorageError::EntryTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        let expires = Utc::now() + self.max_age;
        self.with_jar(|jar| {
            jar.insert(
                key.to_string(),
                CookieEntry {
                    value: encoded,
                    expires,
                },
            );
            Ok(((), true))
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.with_jar(|jar| {
            let removed = jar.remove(key).is_some();
            Ok(((), removed))
        })
    }
}
