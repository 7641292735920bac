use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("entry of {size} bytes exceeds the {limit}-byte limit")]
    EntryTooLarge { size: usize, limit: usize },

    #[error("storage medium unavailable: {0}")]
    Unavailable(String),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
