//! Name search and distance ranking.

use serde::{Deserialize, Serialize};

use crate::store::{Catalog, StoreRecord};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const SEARCH_RESULT_LIMIT: usize = 10;
pub const NEARBY_RESULT_LIMIT: usize = 20;
/// Quiet period before a typed query is searched.
pub const SEARCH_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance in kilometres (haversine).
#[must_use]
pub fn distance_km(from: Position, to: Position) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStore<'a> {
    pub store: &'a StoreRecord,
    /// Present when the ranking was computed from a known position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Stores whose name contains `query`, case-insensitively, in catalog order.
#[must_use]
pub fn match_by_name<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a StoreRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    catalog
        .stores()
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}

/// Nearest first, ties kept in input order. Stores without coordinates
/// carry no distance and sort last.
#[must_use]
pub fn rank_by_distance<'a>(
    stores: impl IntoIterator<Item = &'a StoreRecord>,
    from: Position,
    limit: usize,
) -> Vec<RankedStore<'a>> {
    let mut ranked: Vec<RankedStore<'a>> = stores
        .into_iter()
        .map(|store| RankedStore {
            store,
            distance_km: store.has_coordinates().then(|| {
                distance_km(
                    from,
                    Position {
                        lat: store.lat,
                        lng: store.lng,
                    },
                )
            }),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
    });
    ranked.truncate(limit);
    ranked
}

/// Deterministic ordering used when no position is available.
#[must_use]
pub fn rank_alphabetically<'a>(
    stores: impl IntoIterator<Item = &'a StoreRecord>,
    limit: usize,
) -> Vec<RankedStore<'a>> {
    let mut ranked: Vec<RankedStore<'a>> = stores
        .into_iter()
        .map(|store| RankedStore {
            store,
            distance_km: None,
        })
        .collect();
    ranked.sort_by(|a, b| a.store.name.cmp(&b.store.name));
    ranked.truncate(limit);
    ranked
}

/// Top name matches for `query`: nearest first when `position` is known,
/// alphabetical otherwise.
#[must_use]
pub fn search_stores<'a>(
    catalog: &'a Catalog,
    query: &str,
    position: Option<Position>,
) -> Vec<RankedStore<'a>> {
    let matches = match_by_name(catalog, query);
    match position {
        Some(from) => rank_by_distance(matches, from, SEARCH_RESULT_LIMIT),
        None => rank_alphabetically(matches, SEARCH_RESULT_LIMIT),
    }
}

/// The `limit` placeable stores closest to `position` across the whole catalog.
#[must_use]
pub fn nearby_stores(catalog: &Catalog, position: Position, limit: usize) -> Vec<RankedStore<'_>> {
    let placed = catalog.stores().iter().filter(|s| s.has_coordinates());
    rank_by_distance(placed, position, limit)
}
