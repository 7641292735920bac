//! Debounced persistence of the state blob, plus load and clear helpers.

use std::sync::Arc;
use std::time::Duration;

use storemap_core::{PersistedState, STATE_KEY};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{StateStore, StorageError};

/// Read the saved blob. A blob that fails to parse or has the wrong version
/// is logged, removed from the medium, and treated as absent.
pub fn load_state(store: &dyn StateStore) -> Option<PersistedState> {
    let raw = match store.get(STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "failed to read saved state");
            return None;
        }
    };

    match PersistedState::from_json(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "discarding saved state");
            discard(store);
            None
        }
    }
}

/// Remove the saved blob after a restore found it unusable.
pub fn discard(store: &dyn StateStore) {
    if let Err(e) = store.remove(STATE_KEY) {
        tracing::warn!(store = store.name(), error = %e, "failed to remove saved state");
    }
}

/// Remove the saved blob so the next start is fresh.
///
/// # Errors
///
/// Returns [`StorageError`] if the medium cannot be written.
pub fn clear_state(store: &dyn StateStore) -> Result<(), StorageError> {
    store.remove(STATE_KEY)?;
    tracing::info!(store = store.name(), "saved state cleared");
    Ok(())
}

/// Tracks the last blob written so identical snapshots are skipped.
struct Saver {
    store: Arc<dyn StateStore>,
    last_saved: Option<String>,
}

impl Saver {
    fn save(&mut self, state: &PersistedState) {
        let blob = match state.to_json() {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize state");
                return;
            }
        };
        if self.last_saved.as_deref() == Some(blob.as_str()) {
            tracing::debug!("state unchanged, skipping write");
            return;
        }
        match self.store.set(STATE_KEY, &blob) {
            Ok(()) => {
                tracing::debug!(store = self.store.name(), bytes = blob.len(), "state saved");
                self.last_saved = Some(blob);
            }
            Err(e) => {
                tracing::warn!(store = self.store.name(), error = %e, "failed to save state");
            }
        }
    }
}

/// Spawn the writer task.
///
/// Each change notification restarts a quiet period of `debounce`; the latest
/// snapshot is written when the period elapses. When every sender is dropped
/// the pending snapshot is flushed and the task exits.
pub fn spawn_writer(
    store: Arc<dyn StateStore>,
    mut changes: watch::Receiver<PersistedState>,
    debounce: Duration,
) -> JoinHandle<()> {
    let last_saved = store.get(STATE_KEY).ok().flatten();
    let mut saver = Saver { store, last_saved };

    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let mut closed = false;
            loop {
                tokio::select! {
                    res = changes.changed() => {
                        if res.is_err() {
                            closed = true;
                            break;
                        }
                    }
                    () = tokio::time::sleep(debounce) => break,
                }
            }

            let snapshot = changes.borrow_and_update().clone();
            saver.save(&snapshot);
            if closed {
                break;
            }
        }
        tracing::debug!("state writer stopped");
    })
}
