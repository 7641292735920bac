//! Fetches catalog sources over HTTP or from disk.

use std::path::Path;
use std::time::Duration;

use futures::future::try_join_all;
use reqwest::{Client, Url};
use storemap_core::{Catalog, StoreRecord};

use crate::error::CatalogError;
use crate::source::CatalogSource;

/// Loads store records from configured sources.
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch every source concurrently and concatenate them in declared order.
    ///
    /// There is no retry and no partial result: the first failing source
    /// fails the whole load.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::EmptySources`] if `sources` is empty.
    /// - Any error from [`CatalogClient::fetch_source`].
    pub async fn load_catalog(&self, sources: &[CatalogSource]) -> Result<Catalog, CatalogError> {
        if sources.is_empty() {
            return Err(CatalogError::EmptySources);
        }

        let lists = try_join_all(sources.iter().map(|s| self.fetch_source(s))).await?;
        let catalog = Catalog::from_sources(lists);

        for name in catalog.duplicate_names() {
            tracing::warn!(store = %name, "duplicate store name in catalog");
        }
        tracing::info!(
            sources = sources.len(),
            stores = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Fetch and decode a single source.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::HttpStatus`] on a non-2xx response.
    /// - [`CatalogError::Io`] if a file cannot be read.
    /// - [`CatalogError::Deserialize`] if the body is not an array of stores.
    pub async fn fetch_source(
        &self,
        source: &CatalogSource,
    ) -> Result<Vec<StoreRecord>, CatalogError> {
        let stores = match source {
            CatalogSource::Url(url) => self.fetch_url(url).await?,
            CatalogSource::File(path) => read_file(path).await?,
        };
        tracing::debug!(source = %source, stores = stores.len(), "catalog source fetched");
        Ok(stores)
    }

    async fn fetch_url(&self, url: &Url) -> Result<Vec<StoreRecord>, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        decode_stores(&body, url.as_str())
    }
}

async fn read_file(path: &Path) -> Result<Vec<StoreRecord>, CatalogError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    decode_stores(&body, &path.display().to_string())
}

fn decode_stores(body: &str, context: &str) -> Result<Vec<StoreRecord>, CatalogError> {
    serde_json::from_str(body).map_err(|source| CatalogError::Deserialize {
        context: context.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_stores_reads_type_field() {
        let body = r#"[{"name":"A","type":"pxmart","address":"addr","county":"Taipei",
            "district":"Daan","direction":"North","lat":25.03,"lng":121.56}]"#;
        let stores = decode_stores(body, "inline").expect("valid body");
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].store_type, "pxmart");
    }

    #[test]
    fn decode_stores_rejects_objects() {
        let err = decode_stores(r#"{"stores":[]}"#, "inline").unwrap_err();
        assert!(
            matches!(err, CatalogError::Deserialize { ref context, .. } if context == "inline")
        );
    }

    #[test]
    fn decode_stores_keeps_records_without_coordinates() {
        let body = r#"[
            {"name":"A","type":"pxmart","address":"addr","county":"Taipei",
             "district":"Daan","direction":"North","lat":25.03,"lng":121.56},
            {"name":"B","type":"pxmart","address":"addr","county":"Taipei",
             "district":"Xinyi","direction":"North","lat":null,"lng":null}
        ]"#;
        let stores = decode_stores(body, "inline").expect("null coordinates load");
        assert_eq!(stores.len(), 2);
        assert!(stores[0].has_coordinates());
        assert!(!stores[1].has_coordinates());
    }
}
