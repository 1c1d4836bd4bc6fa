//! Forward and reverse geocoding.
//!
//! [`Geocoder`] is the seam the resolver depends on; [`NominatimGeocoder`]
//! is the production implementation. [`GoogleReverseGeocoder`] is used by the
//! server to attach the most precise place name it can find to a report.

mod google;
mod nominatim;

pub use google::{GoogleReverseGeocoder, NamedPlace};
pub use nominatim::NominatimGeocoder;

use crate::types::{Coordinates, WeatherError};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Best forward-geocoding match for a free-text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Address parts returned by a reverse lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReverseAddress {
    pub display_name: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
}

impl ReverseAddress {
    /// City, then town, then village, else "Your Location"
    pub fn place_name(&self) -> String {
        [&self.city, &self.town, &self.village]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "Your Location".to_string())
    }
}

/// Forward and reverse geocoding service
pub trait Geocoder: Send + Sync {
    /// Single best match for `query`, or `None` when nothing matched
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<GeocodeMatch>, WeatherError>> + Send;

    /// Address parts for a coordinate pair
    fn reverse(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<ReverseAddress, WeatherError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_name_priority() {
        let address = ReverseAddress {
            display_name: Some("Sandton, Johannesburg, Gauteng".into()),
            city: None,
            town: Some("Sandton".into()),
            village: Some("Ignored".into()),
        };
        assert_eq!(address.place_name(), "Sandton");

        let address = ReverseAddress {
            city: Some("Durban".into()),
            town: Some("Umhlanga".into()),
            ..Default::default()
        };
        assert_eq!(address.place_name(), "Durban");
    }

    #[test]
    fn test_place_name_fallback() {
        assert_eq!(ReverseAddress::default().place_name(), "Your Location");

        let blank = ReverseAddress {
            city: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.place_name(), "Your Location");
    }
}
