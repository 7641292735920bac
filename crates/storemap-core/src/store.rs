//! Store records and the catalog they are loaded into.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

/// One retail location as published by a catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    /// Chain identifier. Compared case-insensitively.
    #[serde(rename = "type")]
    pub store_type: String,
    pub address: String,
    pub county: String,
    pub district: String,
    /// Macro-region grouping counties.
    pub direction: String,
    /// `0.0` when the source omits the coordinate or leaves it blank.
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: f64,
}

/// Accepts a number, a numeric string, `null` or `""`. Anything that is not a
/// number becomes `0.0`, which [`StoreRecord::has_coordinates`] rejects, so
/// the record stays in the catalog but is never placed on the map.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(v)) => v,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

impl StoreRecord {
    /// Chain identifier folded for comparison against a type filter.
    #[must_use]
    pub fn type_key(&self) -> String {
        normalize_type(&self.store_type)
    }

    /// `true` when `types` is empty (no filter) or contains this store's chain.
    #[must_use]
    pub fn matches_types(&self, types: &BTreeSet<String>) -> bool {
        types.is_empty() || types.contains(&self.type_key())
    }

    /// Records with a zero or non-finite coordinate cannot be placed on the map.
    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() > f64::EPSILON
            && self.lng.abs() > f64::EPSILON
    }
}

/// Fold a chain identifier to its comparison form.
#[must_use]
pub fn normalize_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The full list of stores for one load. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    stores: Vec<StoreRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new(stores: Vec<StoreRecord>) -> Self {
        Self { stores }
    }

    /// Concatenate several source lists in the order given.
    #[must_use]
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Vec<StoreRecord>>,
    {
        Self {
            stores: sources.into_iter().flatten().collect(),
        }
    }

    #[must_use]
    pub fn stores(&self) -> &[StoreRecord] {
        &self.stores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Stores whose chain is in `types` (all stores when `types` is empty).
    pub fn with_types<'a, 'b>(
        &'a self,
        types: &'b BTreeSet<String>,
    ) -> impl Iterator<Item = &'a StoreRecord> + use<'a, 'b> {
        self.stores.iter().filter(move |s| s.matches_types(types))
    }

    /// First store with exactly this name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&StoreRecord> {
        self.stores.iter().find(|s| s.name == name)
    }

    /// Names that occur more than once, sorted. Name is used as a marker key,
    /// so duplicates make focus-by-name ambiguous.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for store in &self.stores {
            *counts.entry(store.name.as_str()).or_default() += 1;
        }
        let mut dups: Vec<&str> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        dups.sort_unstable();
        dups
    }

    /// Distinct chain identifiers present in the catalog, folded and sorted.
    #[must_use]
    pub fn store_types(&self) -> BTreeSet<String> {
        self.stores.iter().map(StoreRecord::type_key).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{island, store};
    use super::*;

    #[test]
    fn type_matching_is_case_insensitive() {
        let s = store("A", " PXMart ", "North", "Taipei", "Daan");
        let types: BTreeSet<String> = ["pxmart".to_string()].into();
        assert!(s.matches_types(&types));
        assert!(s.matches_types(&BTreeSet::new()));
    }

    #[test]
    fn from_sources_concatenates_in_order() {
        let primary = vec![store("P", "pxmart", "North", "Taipei", "Daan")];
        let extra = vec![store("M", "hipp", "South", "Tainan", "East")];
        let catalog = Catalog::from_sources([primary, extra]);
        let names: Vec<&str> = catalog.stores().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["P", "M"]);
    }

    #[test]
    fn duplicate_names_are_reported_once() {
        let catalog = Catalog::new(vec![
            store("Same", "pxmart", "North", "Taipei", "Daan"),
            store("Same", "pxmart", "North", "Taipei", "Xinyi"),
            store("Other", "pxmart", "North", "Taipei", "Xinyi"),
        ]);
        assert_eq!(catalog.duplicate_names(), ["Same"]);
        assert_eq!(
            catalog.find_by_name("Same").map(|s| s.district.as_str()),
            Some("Daan")
        );
    }

    #[test]
    fn missing_or_blank_coordinates_load_unplaced() {
        let json = r#"[
            {"name":"N","type":"pxmart","address":"a","county":"Taipei",
             "district":"Daan","direction":"North","lat":null,"lng":null},
            {"name":"M","type":"pxmart","address":"a","county":"Taipei",
             "district":"Daan","direction":"North"},
            {"name":"S","type":"pxmart","address":"a","county":"Taipei",
             "district":"Daan","direction":"North","lat":"","lng":" 121.5 "},
            {"name":"T","type":"pxmart","address":"a","county":"Taipei",
             "district":"Daan","direction":"North","lat":"25.04","lng":"121.5"}
        ]"#;
        let stores: Vec<StoreRecord> = serde_json::from_str(json).expect("parse");
        assert_eq!(stores.len(), 4);
        assert!(!stores[0].has_coordinates());
        assert!(!stores[1].has_coordinates());
        assert!(!stores[2].has_coordinates());
        assert!((stores[2].lng - 121.5).abs() < f64::EPSILON);
        assert!(stores[3].has_coordinates());
    }

    #[test]
    fn with_types_items_outlive_the_type_set() {
        let catalog = island();
        let picked: Vec<&StoreRecord> = {
            let types: BTreeSet<String> = ["rt-mart".to_string()].into();
            catalog.with_types(&types).collect()
        };
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "C2");
    }

    #[test]
    fn store_types_are_folded() {
        let types = island().store_types();
        assert_eq!(
            types.into_iter().collect::<Vec<_>>(),
            ["carrefour", "pxmart", "rt-mart"]
        );
    }

    #[test]
    fn zero_coordinates_are_not_placeable() {
        let mut s = store("A", "pxmart", "North", "Taipei", "Daan");
        assert!(s.has_coordinates());
        s.lat = 0.0;
        assert!(!s.has_coordinates());
    }

    #[test]
    fn record_deserializes_type_field() {
        let json = r#"{"name":"X","type":"pxmart","address":"a","county":"Taipei",
            "district":"Daan","direction":"North","lat":25.0,"lng":121.5}"#;
        let s: StoreRecord = serde_json::from_str(json).expect("parse");
        assert_eq!(s.store_type, "pxmart");
    }
}
