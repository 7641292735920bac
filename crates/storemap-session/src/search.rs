//! Geolocation-ranked search and nearby lookup with latest-query-wins
//! ordering.

use std::sync::Arc;

use storemap_core::search::{match_by_name, rank_alphabetically, rank_by_distance};
use storemap_core::{
    nearby_stores, Catalog, Position, RankedStore, NEARBY_RESULT_LIMIT, SEARCH_RESULT_LIMIT,
};

use crate::geo::{GeolocationError, GeolocationOptions, Geolocator};
use crate::query::QueryGate;

/// Nearby result: the user's position and the closest stores to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<'a> {
    pub origin: Position,
    pub stores: Vec<RankedStore<'a>>,
}

/// Runs store searches against a shared catalog. Calls may overlap; a call
/// whose query was superseded while waiting for a position returns `None`.
pub struct StoreSearch<G> {
    catalog: Arc<Catalog>,
    geolocator: G,
    options: GeolocationOptions,
    search_gate: QueryGate,
    nearby_gate: QueryGate,
}

impl<G: Geolocator> StoreSearch<G> {
    pub fn new(catalog: Arc<Catalog>, geolocator: G, options: GeolocationOptions) -> Self {
        Self {
            catalog,
            geolocator,
            options,
            search_gate: QueryGate::new(),
            nearby_gate: QueryGate::new(),
        }
    }

    /// Name search ranked by distance from the user, or alphabetically when
    /// no position is available.
    ///
    /// An empty query or one with no matches answers immediately with an
    /// empty list and still supersedes any search in flight.
    pub async fn search(&self, query: &str) -> Option<Vec<RankedStore<'_>>> {
        let token = self.search_gate.issue();
        let matches = match_by_name(&self.catalog, query);
        if matches.is_empty() {
            return Some(Vec::new());
        }

        let position = self.geolocator.current_position(&self.options).await;
        if !self.search_gate.is_current(token) {
            tracing::debug!(query, "dropping stale search response");
            return None;
        }

        Some(match position {
            Ok(from) => rank_by_distance(matches, from, SEARCH_RESULT_LIMIT),
            Err(e) => {
                tracing::debug!(error = %e, "no position for search, ranking alphabetically");
                rank_alphabetically(matches, SEARCH_RESULT_LIMIT)
            }
        })
    }

    /// Drop any search in flight, as when the search box is cleared.
    pub fn cancel_search(&self) {
        self.search_gate.cancel();
    }

    /// The closest stores across the whole catalog.
    ///
    /// Returns `None` if a newer nearby request was issued meanwhile.
    pub async fn nearby(&self) -> Option<Result<Nearby<'_>, GeolocationError>> {
        let token = self.nearby_gate.issue();
        let position = self.geolocator.current_position(&self.options).await;
        if !self.nearby_gate.is_current(token) {
            tracing::debug!("dropping stale nearby response");
            return None;
        }

        Some(position.map(|origin| Nearby {
            origin,
            stores: nearby_stores(&self.catalog, origin, NEARBY_RESULT_LIMIT),
        }))
    }
}
