use storemap_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] CoreError),

    #[error("county '{0}' has no stores for the current type filter")]
    UnknownCounty(String),

    #[error("district '{district}' of '{county}' has no stores for the current type filter")]
    UnknownDistrict { county: String, district: String },

    #[error("unknown direction '{0}'")]
    UnknownDirection(String),

    #[error("no store named '{0}'")]
    UnknownStore(String),

    #[error("store '{0}' has no coordinates")]
    MissingCoordinates(String),
}
