//! Device position lookup.

use std::future::Future;
use std::time::Duration;

use storemap_core::{AppConfig, Position};
use thiserror::Error;

/// Accuracy and freshness knobs passed through to the position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Accept a cached fix up to this old.
    pub max_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(15),
            max_age: Duration::from_secs(30),
        }
    }
}

impl GeolocationOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            high_accuracy: config.geo_high_accuracy,
            timeout: Duration::from_secs(config.geo_timeout_secs),
            max_age: Duration::from_secs(config.geo_max_age_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable")]
    Unavailable,

    #[error("location request timed out")]
    Timeout,
}

impl GeolocationError {
    /// Text shown to the user in place of a nearby list.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Please allow access to your location.",
            Self::Timeout => "Locating timed out. Move outdoors or to an open area and try again.",
            Self::Unavailable => "Unable to determine your location.",
        }
    }
}

pub trait Geolocator: Send + Sync {
    fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Position, GeolocationError>> + Send;
}

/// A position source that always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Result<Position, GeolocationError>);

impl FixedGeolocator {
    #[must_use]
    pub fn at(lat: f64, lng: f64) -> Self {
        Self(Ok(Position { lat, lng }))
    }

    #[must_use]
    pub fn failing(error: GeolocationError) -> Self {
        Self(Err(error))
    }
}

impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Position, GeolocationError> {
        self.0
    }
}
