//! The selection model: which filter tab is active and what the user picked
//! in each tab.
//!
//! Both tabs keep their own selections. Switching tabs never clears the
//! inactive one; only [`SelectionModel::reset`] does, one tab at a time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, PercentEncode, CONTROLS,
};
use serde::{Deserialize, Serialize};

use crate::region::RegionIndex;
use crate::store::{normalize_type, Catalog};
use crate::viewport::Viewport;
use crate::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Single,
    Multi,
}

impl FilterMode {
    /// Identifier of the tab control showing this mode.
    #[must_use]
    pub const fn tab_id(self) -> &'static str {
        match self {
            FilterMode::Single => "filter-tab",
            FilterMode::Multi => "multi-filter-tab",
        }
    }

    #[must_use]
    pub fn from_tab_id(id: &str) -> Option<Self> {
        match id {
            "filter-tab" => Some(FilterMode::Single),
            "multi-filter-tab" => Some(FilterMode::Multi),
            _ => None,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Single => write!(f, "single"),
            FilterMode::Multi => write!(f, "multi"),
        }
    }
}

fn fold_types<I, S>(types: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    types
        .into_iter()
        .map(|t| normalize_type(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

// ---------------------------------------------------------------------------
// Single filter: type checkboxes plus county/district dropdowns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleFilter {
    store_types: BTreeSet<String>,
    county: Option<String>,
    district: Option<String>,
}

impl SingleFilter {
    #[must_use]
    pub fn store_types(&self) -> &BTreeSet<String> {
        &self.store_types
    }

    #[must_use]
    pub fn county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    #[must_use]
    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn set_store_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.store_types = fold_types(types);
    }

    /// Select a county (`None` or blank clears it). Picking a different
    /// county clears the district.
    pub fn set_county(&mut self, county: Option<&str>) {
        let county = non_empty(county);
        if county != self.county {
            self.district = None;
        }
        self.county = county;
    }

    /// Select a district within the current county.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DistrictWithoutCounty`] when a district is given
    /// while no county is selected.
    pub fn set_district(&mut self, district: Option<&str>) -> Result<(), CoreError> {
        let district = non_empty(district);
        if let (Some(d), None) = (&district, &self.county) {
            return Err(CoreError::DistrictWithoutCounty {
                district: d.clone(),
            });
        }
        self.district = district;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store_types.is_empty() && self.county.is_none() && self.district.is_none()
    }

    /// Drop a county or district the index no longer offers. Returns `true`
    /// if anything was cleared.
    pub fn retain_within(&mut self, index: &RegionIndex) -> bool {
        let mut changed = false;
        if let Some(county) = self.county.as_deref() {
            if !index.contains_county(county) {
                self.county = None;
                self.district = None;
                return true;
            }
            if let Some(district) = self.district.as_deref() {
                if !index.contains_district(county, district) {
                    self.district = None;
                    changed = true;
                }
            }
        }
        changed
    }
}

// ---------------------------------------------------------------------------
// Multi filter: direction → county → district checkbox tree
// ---------------------------------------------------------------------------

/// Checkbox state for one county in the region tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountySelection {
    /// County checkbox itself is checked.
    pub whole: bool,
    /// Explicitly checked district checkboxes.
    pub districts: BTreeSet<String>,
}

impl CountySelection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.whole && self.districts.is_empty()
    }
}

/// Leaf addressed by a region toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionTarget {
    AllDistricts,
    District(String),
}

/// Serialized region selection: `county|*` or `county|district`.
///
/// `|`, `*` and `%` inside a name are percent-escaped, so a district named
/// `*` or a county containing `|` still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegionKey {
    County(String),
    District { county: String, district: String },
}

/// Characters reserved by the region key syntax.
const REGION_KEY_RESERVED: &AsciiSet = &CONTROLS.add(b'|').add(b'*').add(b'%');

/// Marker standing in for "every district" in a county key.
const ALL_DISTRICTS: &str = "*";

fn escape_component(raw: &str) -> PercentEncode<'_> {
    utf8_percent_encode(raw, REGION_KEY_RESERVED)
}

fn unescape_component(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::County(county) => {
                write!(f, "{}|{ALL_DISTRICTS}", escape_component(county))
            }
            RegionKey::District { county, district } => write!(
                f,
                "{}|{}",
                escape_component(county),
                escape_component(district)
            ),
        }
    }
}

impl FromStr for RegionKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidRegionKey(s.to_string());
        let (county, district) = s.split_once('|').ok_or_else(invalid)?;
        if county.is_empty() || district.is_empty() || district.contains('|') {
            return Err(invalid());
        }
        let county = unescape_component(county).ok_or_else(invalid)?;
        if district == ALL_DISTRICTS {
            return Ok(RegionKey::County(county));
        }
        let district = unescape_component(district).ok_or_else(invalid)?;
        Ok(RegionKey::District { county, district })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiFilter {
    store_types: BTreeSet<String>,
    selections: BTreeMap<String, CountySelection>,
}

impl MultiFilter {
    #[must_use]
    pub fn store_types(&self) -> &BTreeSet<String> {
        &self.store_types
    }

    pub fn set_store_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.store_types = fold_types(types);
    }

    #[must_use]
    pub fn selections(&self) -> &BTreeMap<String, CountySelection> {
        &self.selections
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selections.is_empty()
    }

    #[must_use]
    pub fn is_county_checked(&self, county: &str) -> bool {
        self.selections.get(county).is_some_and(|s| s.whole)
    }

    #[must_use]
    pub fn is_district_checked(&self, county: &str, district: &str) -> bool {
        self.selections
            .get(county)
            .is_some_and(|s| s.districts.contains(district))
    }

    pub fn set_county_checked(&mut self, county: &str, checked: bool) {
        if checked {
            self.selections.entry(county.to_string()).or_default().whole = true;
        } else if let Some(sel) = self.selections.get_mut(county) {
            sel.whole = false;
            self.prune(county);
        }
    }

    pub fn set_district_checked(&mut self, county: &str, district: &str, checked: bool) {
        if checked {
            self.selections
                .entry(county.to_string())
                .or_default()
                .districts
                .insert(district.to_string());
        } else if let Some(sel) = self.selections.get_mut(county) {
            sel.districts.remove(district);
            self.prune(county);
        }
    }

    /// Flip one district checkbox or a county checkbox. Returns the new state.
    pub fn toggle_region(&mut self, county: &str, target: &RegionTarget) -> bool {
        match target {
            RegionTarget::AllDistricts => {
                let checked = !self.is_county_checked(county);
                self.set_county_checked(county, checked);
                checked
            }
            RegionTarget::District(district) => {
                let checked = !self.is_district_checked(county, district);
                self.set_district_checked(county, district, checked);
                checked
            }
        }
    }

    /// Every county checkbox under `direction` is checked. Derived on each
    /// call so adding or removing one county flips it immediately.
    #[must_use]
    pub fn is_direction_fully_selected(&self, direction: &str, index: &RegionIndex) -> bool {
        let mut counties = index.counties_in(direction).peekable();
        counties.peek().is_some() && counties.all(|(county, _)| self.is_county_checked(county))
    }

    /// Check every county under `direction`, or uncheck them all when they
    /// already are. Returns the resulting state.
    pub fn toggle_direction_all(&mut self, direction: &str, index: &RegionIndex) -> bool {
        let checked = !self.is_direction_fully_selected(direction, index);
        let counties: Vec<String> = index
            .counties_in(direction)
            .map(|(c, _)| c.to_string())
            .collect();
        for county in &counties {
            self.set_county_checked(county, checked);
        }
        checked && !counties.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drop selections referring to regions absent from `index`. Returns
    /// `true` if anything was removed.
    pub fn retain_within(&mut self, index: &RegionIndex) -> bool {
        let before = self.selections.clone();
        self.selections.retain(|county, sel| {
            if !index.contains_county(county) {
                return false;
            }
            sel.districts
                .retain(|district| index.contains_district(county, district));
            !sel.is_empty()
        });
        before != self.selections
    }

    /// Selections as serializable keys, county entries first within a county.
    #[must_use]
    pub fn region_keys(&self) -> Vec<RegionKey> {
        let mut keys = Vec::new();
        for (county, sel) in &self.selections {
            if sel.whole {
                keys.push(RegionKey::County(county.clone()));
            }
            keys.extend(sel.districts.iter().map(|d| RegionKey::District {
                county: county.clone(),
                district: d.clone(),
            }));
        }
        keys
    }

    pub fn apply_region_key(&mut self, key: &RegionKey) {
        match key {
            RegionKey::County(county) => self.set_county_checked(county, true),
            RegionKey::District { county, district } => {
                self.set_district_checked(county, district, true);
            }
        }
    }

    fn prune(&mut self, county: &str) {
        if self.selections.get(county).is_some_and(CountySelection::is_empty) {
            self.selections.remove(county);
        }
    }
}

// ---------------------------------------------------------------------------
// Whole model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionModel {
    pub mode: FilterMode,
    pub single: SingleFilter,
    pub multi: MultiFilter,
    pub clustering: bool,
    pub viewport: Viewport,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self {
            mode: FilterMode::Single,
            single: SingleFilter::default(),
            multi: MultiFilter::default(),
            clustering: true,
            viewport: Viewport::default(),
        }
    }
}

impl SelectionModel {
    #[must_use]
    pub fn store_types(&self, mode: FilterMode) -> &BTreeSet<String> {
        match mode {
            FilterMode::Single => self.single.store_types(),
            FilterMode::Multi => self.multi.store_types(),
        }
    }

    #[must_use]
    pub fn active_store_types(&self) -> &BTreeSet<String> {
        self.store_types(self.mode)
    }

    /// Region taxonomy for `mode`'s current type filter.
    #[must_use]
    pub fn region_index(&self, catalog: &Catalog, mode: FilterMode) -> RegionIndex {
        RegionIndex::build(catalog, self.store_types(mode))
    }

    /// Replace the active tab's type filter, rebuild that tab's region index
    /// and drop region picks the new index no longer contains.
    pub fn set_store_types<I, S>(&mut self, types: I, catalog: &Catalog) -> RegionIndex
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_store_types_for(self.mode, types, catalog)
    }

    /// Same as [`Self::set_store_types`] for an explicit tab.
    pub fn set_store_types_for<I, S>(
        &mut self,
        mode: FilterMode,
        types: I,
        catalog: &Catalog,
    ) -> RegionIndex
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match mode {
            FilterMode::Single => self.single.set_store_types(types),
            FilterMode::Multi => self.multi.set_store_types(types),
        }
        let index = self.region_index(catalog, mode);
        match mode {
            FilterMode::Single => self.single.retain_within(&index),
            FilterMode::Multi => self.multi.retain_within(&index),
        };
        index
    }

    /// Clear one tab's selections; the other tab is untouched.
    pub fn reset(&mut self, mode: FilterMode) {
        match mode {
            FilterMode::Single => self.single.reset(),
            FilterMode::Multi => self.multi.reset(),
        }
    }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
