use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while loading the store catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-2xx status.
    #[error("catalog source {url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    /// A file-backed source could not be read.
    #[error("failed to read catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The body was not a JSON array of store records.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid catalog URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no catalog sources configured")]
    EmptySources,
}
