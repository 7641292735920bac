//! The filter resolver: (catalog, selection) → visible stores.
//!
//! Resolution is pure. It reads nothing but its arguments and returns stores
//! in catalog order.

use std::collections::BTreeSet;

use crate::region::RegionIndex;
use crate::selection::{FilterMode, MultiFilter, SelectionModel, SingleFilter};
use crate::store::{Catalog, StoreRecord};

/// Resolve the visible stores for the active tab.
#[must_use]
pub fn resolve<'a>(catalog: &'a Catalog, selection: &SelectionModel) -> Vec<&'a StoreRecord> {
    match selection.mode {
        FilterMode::Single => resolve_single(catalog, &selection.single),
        FilterMode::Multi => resolve_multi(catalog, &selection.multi),
    }
}

/// Conjunction of type, county and district.
#[must_use]
pub fn resolve_single<'a>(catalog: &'a Catalog, filter: &SingleFilter) -> Vec<&'a StoreRecord> {
    catalog
        .with_types(filter.store_types())
        .filter(|s| filter.county().is_none_or(|c| s.county == c))
        .filter(|s| filter.district().is_none_or(|d| s.district == d))
        .collect()
}

/// `(county, district)` pairs the region tree currently selects.
///
/// 1. Every explicitly checked district.
/// 2. Every district of a checked county. Explicit district checks never
///    narrow a checked county.
/// 3. Every pair under a direction whose county checkboxes are all checked.
///
/// The set deduplicates pairs reached by more than one rule.
#[must_use]
pub fn selected_pairs(catalog: &Catalog, filter: &MultiFilter) -> BTreeSet<(String, String)> {
    let index = RegionIndex::build(catalog, filter.store_types());
    let mut pairs = BTreeSet::new();

    for (county, sel) in filter.selections() {
        for district in &sel.districts {
            pairs.insert((county.clone(), district.clone()));
        }
    }

    for (county, sel) in filter.selections() {
        if sel.whole {
            for district in index.districts_of(county) {
                pairs.insert((county.clone(), district.to_string()));
            }
        }
    }

    for direction in index.directions() {
        if filter.is_direction_fully_selected(direction, &index) {
            for (county, district) in index.pairs_in(direction) {
                pairs.insert((county.to_string(), district.to_string()));
            }
        }
    }

    pairs
}

/// Stores inside the selected pairs and the type filter. No selected pair
/// means no stores: an open region picker with nothing ticked shows nothing.
#[must_use]
pub fn resolve_multi<'a>(catalog: &'a Catalog, filter: &MultiFilter) -> Vec<&'a StoreRecord> {
    let pairs = selected_pairs(catalog, filter);
    if pairs.is_empty() {
        return Vec::new();
    }
    catalog
        .with_types(filter.store_types())
        .filter(|s| pairs.contains(&(s.county.clone(), s.district.clone())))
        .collect()
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
