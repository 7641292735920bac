//! Map center and zoom.

use serde::{Deserialize, Serialize};

use crate::search::Position;

/// Zoom used when focusing a store picked from search results.
pub const FOCUS_ZOOM: u8 = 15;
/// Zoom used when focusing a store picked from the nearby list.
pub const NEARBY_FOCUS_ZOOM: u8 = 16;
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

const COORD_SCALE: f64 = 1_000_000.0;

/// Rectangle the map may not be panned out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

pub const MAP_BOUNDS: Bounds = Bounds {
    south: 20.0,
    west: 118.0,
    north: 26.0,
    east: 124.0,
};

/// Round a coordinate to six decimal digits.
#[must_use]
pub fn round_coord(value: f64) -> f64 {
    (value * COORD_SCALE).round() / COORD_SCALE
}

/// Coordinates are always held at six-decimal precision so that a persisted
/// viewport restores to exactly the same value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    lat: f64,
    lng: f64,
    zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(23.5, 121.0, 8)
    }
}

impl Viewport {
    #[must_use]
    pub fn new(lat: f64, lng: f64, zoom: u8) -> Self {
        Self {
            lat: round_coord(lat),
            lng: round_coord(lng),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub fn center(&self) -> Position {
        Position {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Same zoom with the center pulled inside `bounds`.
    #[must_use]
    pub fn clamped(self, bounds: &Bounds) -> Self {
        Self::new(
            self.lat.clamp(bounds.south, bounds.north),
            self.lng.clamp(bounds.west, bounds.east),
            self.zoom,
        )
    }

    /// Viewport centred on `position`.
    #[must_use]
    pub fn centered_on(position: Position, zoom: u8) -> Self {
        Self::new(position.lat, position.lng, zoom)
    }
}
