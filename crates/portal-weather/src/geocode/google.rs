//! Google Geocoding reverse lookups, used to label weather reports with the
//! most specific place name available (street, suburb, town...).

use crate::types::{Coordinates, LocationAccuracy, WeatherError};
use portal_core::TtlCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const REQUEST_TIMEOUT_SECS: u64 = 5;
const CACHE_SECONDS: u64 = 86_400;
const RESULT_TYPES: &str = "street_address|route|locality|sublocality|neighborhood";

/// A place name together with how precise it is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPlace {
    pub name: String,
    pub formatted_address: String,
    pub accuracy: LocationAccuracy,
    /// False when the name is the coordinate fallback
    pub resolved: bool,
}

impl NamedPlace {
    fn fallback(coordinates: Coordinates) -> Self {
        Self {
            name: coordinates.label(),
            formatted_address: format!(
                "Latitude: {:.4}, Longitude: {:.4}",
                coordinates.lat, coordinates.lon
            ),
            accuracy: LocationAccuracy::Coordinates,
            resolved: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    #[serde(default)]
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResult {
    fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }

    fn component(&self, kinds: &[&str]) -> Option<&str> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| kinds.contains(&t.as_str())))
            .map(|c| c.long_name.as_str())
    }

    /// Name at the most specific level this result describes
    fn best_name(&self) -> Option<String> {
        if self.has_type("street_address") || self.has_type("route") {
            if let Some(street) = self.component(&["route"]) {
                return Some(match self.component(&["street_number"]) {
                    Some(number) if !number.is_empty() => format!("{} {}", number, street),
                    _ => street.to_string(),
                });
            }
        }

        let levels: [(&[&str], &[&str]); 4] = [
            (&["neighborhood"], &["neighborhood"]),
            (
                &["sublocality", "sublocality_level_1"],
                &["sublocality", "sublocality_level_1"],
            ),
            (&["locality"], &["locality"]),
            (
                &["administrative_area_level_2"],
                &["administrative_area_level_2"],
            ),
        ];
        levels.iter().find_map(|(result_kinds, component_kinds)| {
            result_kinds
                .iter()
                .any(|kind| self.has_type(kind))
                .then(|| self.component(component_kinds).map(str::to_string))
                .flatten()
        })
    }
}

fn extract_best_name(results: &[GeocodeResult], coordinates: Coordinates) -> String {
    if let Some(name) = results.iter().find_map(GeocodeResult::best_name) {
        return name;
    }

    results
        .first()
        .and_then(|first| first.formatted_address.split(',').next())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| coordinates.label())
}

fn determine_accuracy(results: &[GeocodeResult]) -> LocationAccuracy {
    let Some(first) = results.first() else {
        return LocationAccuracy::Coordinates;
    };

    [
        ("street_address", LocationAccuracy::StreetAddress),
        ("route", LocationAccuracy::Route),
        ("neighborhood", LocationAccuracy::Neighborhood),
        ("sublocality", LocationAccuracy::Sublocality),
        ("locality", LocationAccuracy::Locality),
        ("administrative_area_level_2", LocationAccuracy::Municipality),
    ]
    .into_iter()
    .find(|(kind, _)| first.has_type(kind))
    .map(|(_, accuracy)| accuracy)
    .unwrap_or(LocationAccuracy::General)
}

#[derive(Debug)]
pub struct GoogleReverseGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: TtlCache<NamedPlace>,
}

impl GoogleReverseGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            cache: TtlCache::new(),
        })
    }

    /// Best place name for the coordinates. Never fails: lookup errors fall
    /// back to a coordinate label with `Coordinates` accuracy.
    #[instrument(skip(self))]
    pub async fn name_for(&self, coordinates: Coordinates) -> NamedPlace {
        let cache_key = format!("reverse_{:.6}_{:.6}", coordinates.lat, coordinates.lon);
        if let Some(place) = self
            .cache
            .get(&cache_key, Duration::from_secs(CACHE_SECONDS))
        {
            return place;
        }

        match self.lookup(coordinates).await {
            Ok(Some(place)) => {
                self.cache.set(cache_key, place.clone());
                place
            }
            Ok(None) => NamedPlace::fallback(coordinates),
            Err(e) => {
                tracing::error!("Reverse geocoding error: {}", e);
                NamedPlace::fallback(coordinates)
            }
        }
    }

    async fn lookup(&self, coordinates: Coordinates) -> Result<Option<NamedPlace>, WeatherError> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("No Google API key, using coordinate label");
            return Ok(None);
        };

        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latlng", format!("{},{}", coordinates.lat, coordinates.lon)),
                ("key", api_key.clone()),
                ("region", "za".to_string()),
                ("language", "en".to_string()),
                ("result_type", RESULT_TYPES.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Upstream {
                status: response.status().as_u16(),
            });
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        if body.status != "OK" || body.results.is_empty() {
            tracing::debug!("Google geocode status {}", body.status);
            return Ok(None);
        }

        Ok(Some(NamedPlace {
            name: extract_best_name(&body.results, coordinates),
            formatted_address: body.results[0].formatted_address.clone(),
            accuracy: determine_accuracy(&body.results),
            resolved: true,
        }))
    }
}
