//! The persisted-state blob stored under [`STATE_KEY`].
//!
//! Field names are kept short because the fallback medium has a small size
//! limit. Decoding is strict: anything that does not match the current schema
//! is an error, and callers treat an error as "no saved state".

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::selection::{FilterMode, RegionKey, SelectionModel};
use crate::viewport::{round_coord, Viewport, MAX_ZOOM};
use crate::CoreError;

pub const STATE_KEY: &str = "storeMapState";
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("persisted state does not match the schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("persisted state version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("unknown tab id '{0}'")]
    UnknownTab(String),

    #[error("invalid selection in persisted state: {0}")]
    Selection(#[from] CoreError),

    #[error("persisted viewport out of range: lat {lat}, lng {lng}, zoom {zoom}")]
    ViewportOutOfRange { lat: f64, lng: f64, zoom: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedViewport {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lng: f64,
    #[serde(rename = "z")]
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(rename = "ver")]
    pub version: u32,
    /// Active tab id.
    #[serde(rename = "t")]
    pub tab: String,
    #[serde(rename = "c")]
    pub clustering: bool,
    #[serde(rename = "s", default)]
    pub single_types: Vec<String>,
    #[serde(rename = "sc", default)]
    pub single_county: String,
    #[serde(rename = "sd", default)]
    pub single_district: String,
    #[serde(rename = "m", default)]
    pub multi_types: Vec<String>,
    /// `county|*` and `county|district` entries.
    #[serde(rename = "f", default)]
    pub regions: Vec<String>,
    #[serde(rename = "v")]
    pub viewport: PersistedViewport,
}

/// Older blobs wrote coordinates as fixed-precision strings.
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

impl PersistedState {
    /// Snapshot the selection model in blob form.
    #[must_use]
    pub fn capture(selection: &SelectionModel) -> Self {
        Self {
            version: STATE_VERSION,
            tab: selection.mode.tab_id().to_string(),
            clustering: selection.clustering,
            single_types: selection.single.store_types().iter().cloned().collect(),
            single_county: selection.single.county().unwrap_or_default().to_string(),
            single_district: selection.single.district().unwrap_or_default().to_string(),
            multi_types: selection.multi.store_types().iter().cloned().collect(),
            regions: selection
                .multi
                .region_keys()
                .iter()
                .map(ToString::to_string)
                .collect(),
            viewport: PersistedViewport {
                lat: round_coord(selection.viewport.lat()),
                lng: round_coord(selection.viewport.lng()),
                zoom: selection.viewport.zoom(),
            },
        }
    }

    /// # Errors
    ///
    /// Returns [`StateError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored blob and check its version.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Json`] for malformed or schema-mismatched JSON and
    /// [`StateError::VersionMismatch`] for blobs written by another version.
    pub fn from_json(raw: &str) -> Result<Self, StateError> {
        let state: Self = serde_json::from_str(raw)?;
        if state.version != STATE_VERSION {
            return Err(StateError::VersionMismatch {
                found: state.version,
                expected: STATE_VERSION,
            });
        }
        Ok(state)
    }

    /// Active tab encoded in the blob.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownTab`] for an unrecognised tab id.
    pub fn mode(&self) -> Result<FilterMode, StateError> {
        FilterMode::from_tab_id(&self.tab).ok_or_else(|| StateError::UnknownTab(self.tab.clone()))
    }

    /// Parsed region entries.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Selection`] for an entry that is not a region key.
    pub fn region_keys(&self) -> Result<Vec<RegionKey>, StateError> {
        self.regions
            .iter()
            .map(|raw| raw.parse::<RegionKey>().map_err(StateError::from))
            .collect()
    }

    /// Validated viewport.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ViewportOutOfRange`] for non-finite or
    /// out-of-range coordinates or zoom.
    pub fn viewport(&self) -> Result<Viewport, StateError> {
        let PersistedViewport { lat, lng, zoom } = self.viewport;
        let in_range = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng)
            && zoom <= MAX_ZOOM;
        if !in_range {
            return Err(StateError::ViewportOutOfRange { lat, lng, zoom });
        }
        Ok(Viewport::new(lat, lng, zoom))
    }

    /// Rebuild the selection model without consulting a catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if any field fails validation.
    pub fn into_selection(self) -> Result<SelectionModel, StateError> {
        let mut model = SelectionModel {
            mode: self.mode()?,
            clustering: self.clustering,
            viewport: self.viewport()?,
            ..SelectionModel::default()
        };
        model.single.set_store_types(&self.single_types);
        model.single.set_county(Some(&self.single_county));
        model.single.set_district(Some(&self.single_district))?;
        model.multi.set_store_types(&self.multi_types);
        for key in self.region_keys()? {
            model.multi.apply_region_key(&key);
        }
        Ok(model)
    }
}

/// Serialize a selection model to its stored form.
///
/// # Errors
///
/// Returns [`StateError::Json`] if serialization fails.
pub fn encode(selection: &SelectionModel) -> Result<String, StateError> {
    PersistedState::capture(selection).to_json()
}

/// Parse and validate a stored blob into a selection model.
///
/// # Errors
///
/// Returns a [`StateError`] for corrupt or schema-mismatched input.
pub fn decode(raw: &str) -> Result<SelectionModel, StateError> {
    PersistedState::from_json(raw)?.into_selection()
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
