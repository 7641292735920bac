mod app_config;
mod config;
pub mod navigate;
pub mod region;
pub mod resolve;
pub mod search;
pub mod selection;
pub mod state;
pub mod store;
pub mod viewport;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use navigate::{navigation_url, MapProvider, URI_COMPONENT};
pub use region::{CountyNode, RegionIndex};
pub use resolve::{resolve, resolve_multi, resolve_single, selected_pairs};
pub use search::{
    distance_km, nearby_stores, search_stores, Position, RankedStore, NEARBY_RESULT_LIMIT,
    SEARCH_DEBOUNCE_MS, SEARCH_RESULT_LIMIT,
};
pub use selection::{
    CountySelection, FilterMode, MultiFilter, RegionKey, RegionTarget, SelectionModel,
    SingleFilter,
};
pub use state::{decode, encode, PersistedState, StateError, STATE_KEY, STATE_VERSION};
pub use store::{normalize_type, Catalog, StoreRecord};
pub use viewport::{Bounds, Viewport, FOCUS_ZOOM, MAP_BOUNDS, NEARBY_FOCUS_ZOOM};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("district '{district}' selected without a county")]
    DistrictWithoutCounty { district: String },

    #[error("invalid region key '{0}': expected \"county|district\" or \"county|*\"")]
    InvalidRegionKey(String),
}
