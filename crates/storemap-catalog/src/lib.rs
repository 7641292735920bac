//! Catalog loading for the store map.
//!
//! Each source is either an HTTP(S) JSON endpoint or a local JSON file holding
//! an array of store records. All sources are fetched concurrently and
//! concatenated in declared order. Any failure aborts the load.

mod client;
mod error;
mod source;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use source::CatalogSource;
