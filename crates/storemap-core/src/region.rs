//! Direction → county → district taxonomy derived from the catalog.
//!
//! The index is rebuilt from scratch whenever the store-type filter changes and
//! is never edited in place. `BTreeMap` keys keep every level sorted so tree
//! ordering does not depend on catalog order.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::store::Catalog;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountyNode {
    /// Sorted, distinct districts with at least one matching store.
    pub districts: Vec<String>,
    pub store_count: usize,
    pub district_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionIndex {
    directions: BTreeMap<String, BTreeMap<String, CountyNode>>,
}

impl RegionIndex {
    /// Build the index over stores matching `types` (every store when empty).
    #[must_use]
    pub fn build(catalog: &Catalog, types: &BTreeSet<String>) -> Self {
        let mut directions: BTreeMap<String, BTreeMap<String, CountyNode>> = BTreeMap::new();

        for store in catalog.with_types(types) {
            let node = directions
                .entry(store.direction.clone())
                .or_default()
                .entry(store.county.clone())
                .or_default();
            node.store_count += 1;
            *node
                .district_counts
                .entry(store.district.clone())
                .or_default() += 1;
        }

        for counties in directions.values_mut() {
            for node in counties.values_mut() {
                node.districts = node.district_counts.keys().cloned().collect();
            }
        }

        Self { directions }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn directions(&self) -> impl Iterator<Item = &str> {
        self.directions.keys().map(String::as_str)
    }

    /// Counties under `direction`, sorted. Empty for an unknown direction.
    pub fn counties_in(&self, direction: &str) -> impl Iterator<Item = (&str, &CountyNode)> {
        self.directions
            .get(direction)
            .into_iter()
            .flat_map(|counties| counties.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Every county across all directions, sorted and distinct. Feeds the
    /// single-filter county dropdown.
    #[must_use]
    pub fn counties(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .directions
            .values()
            .flat_map(|counties| counties.keys().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    /// Districts of `county`, sorted. A county listed under more than one
    /// direction contributes the union of its districts.
    #[must_use]
    pub fn districts_of(&self, county: &str) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .directions
            .values()
            .filter_map(|counties| counties.get(county))
            .flat_map(|node| node.districts.iter().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    #[must_use]
    pub fn contains_county(&self, county: &str) -> bool {
        self.directions.values().any(|c| c.contains_key(county))
    }

    #[must_use]
    pub fn contains_district(&self, county: &str, district: &str) -> bool {
        self.directions
            .values()
            .filter_map(|counties| counties.get(county))
            .any(|node| node.district_counts.contains_key(district))
    }

    /// Every `(county, district)` pair under `direction`.
    #[must_use]
    pub fn pairs_in(&self, direction: &str) -> Vec<(&str, &str)> {
        self.counties_in(direction)
            .flat_map(|(county, node)| node.districts.iter().map(move |d| (county, d.as_str())))
            .collect()
    }

    /// Total stores counted under `county` across directions.
    #[must_use]
    pub fn county_store_count(&self, county: &str) -> usize {
        self.directions
            .values()
            .filter_map(|counties| counties.get(county))
            .map(|node| node.store_count)
            .sum()
    }
}
