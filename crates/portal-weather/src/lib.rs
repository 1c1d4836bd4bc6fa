//! Weather for SA Daily Portal
//!
//! Location resolution (device position, typed text, autocomplete picks),
//! geocoding, the OpenWeatherMap provider used by the server and the client
//! side weather page controller.

pub mod client;
pub mod display;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod types;

pub use client::{PortalWeatherClient, WeatherApi};
pub use display::{AttemptOutcome, DisplayState, RequestTicket, WeatherController};
pub use geocode::{
    GeocodeMatch, Geocoder, GoogleReverseGeocoder, NamedPlace, NominatimGeocoder, ReverseAddress,
};
pub use location::{locate, FixedPosition, NoPositionSource, Position, PositionOptions, PositionSource};
pub use provider::{sa_today, WeatherProvider};
pub use resolver::{LocationResolver, PlaceSelection, ResolveError};
pub use types::*;
