//! Turn-by-turn deep links for a store address.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Escapes everything `encodeURIComponent` escapes.
pub const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapProvider {
    Google,
    Apple,
}

impl fmt::Display for MapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapProvider::Google => write!(f, "google"),
            MapProvider::Apple => write!(f, "apple"),
        }
    }
}

impl FromStr for MapProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(MapProvider::Google),
            "apple" => Ok(MapProvider::Apple),
            other => Err(format!("unknown map provider '{other}' (expected google or apple)")),
        }
    }
}

/// Directions URL to `address` in the given provider's map app.
#[must_use]
pub fn navigation_url(address: &str, provider: MapProvider) -> String {
    let encoded = utf8_percent_encode(address, URI_COMPONENT);
    match provider {
        MapProvider::Google => {
            format!("https://www.google.com/maps/dir/?api=1&destination={encoded}")
        }
        MapProvider::Apple => format!("https://maps.apple.com/?daddr={encoded}"),
    }
}
