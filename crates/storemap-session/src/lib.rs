//! The store-map controller: one object owning the catalog, the selection
//! model and both region indices, driving a [`Renderer`] and publishing every
//! change for the persistence writer.

mod error;
mod geo;
mod query;
mod renderer;
mod search;
mod session;

pub use error::SessionError;
pub use geo::{FixedGeolocator, GeolocationError, GeolocationOptions, Geolocator};
pub use query::{QueryGate, QueryToken};
pub use renderer::Renderer;
pub use search::{Nearby, StoreSearch};
pub use session::StoreMapSession;
