//! Nominatim (OpenStreetMap) geocoding. Free, no API key required, but every
//! request must carry an identifying User-Agent.

use super::{GeocodeMatch, Geocoder, ReverseAddress};
use crate::types::{Coordinates, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "SADailyPortal/2026.2 (https://sadailyportal.co.za)";

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<ReverseParts>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseParts {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Option<GeocodeMatch>, WeatherError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Geocode search returned status {}", response.status());
            return Err(WeatherError::Upstream {
                status: response.status().as_u16(),
            });
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let Some(first) = results.into_iter().next() else {
            tracing::info!("No geocode match for {:?}", query);
            return Ok(None);
        };

        let lat = first
            .lat
            .parse::<f64>()
            .map_err(|e| WeatherError::Parse(format!("latitude {:?}: {}", first.lat, e)))?;
        let lon = first
            .lon
            .parse::<f64>()
            .map_err(|e| WeatherError::Parse(format!("longitude {:?}: {}", first.lon, e)))?;

        Ok(Some(GeocodeMatch {
            coordinates: Coordinates::new(lat, lon),
            display_name: first.display_name,
        }))
    }

    #[instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReverseAddress, WeatherError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return Err(WeatherError::Upstream {
                status: response.status().as_u16(),
            });
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;
        let parts = body.address.unwrap_or_default();

        let address = ReverseAddress {
            display_name: body.display_name,
            city: parts.city,
            town: parts.town,
            village: parts.village,
        };
        tracing::info!("Reverse geocoded to: {}", address.place_name());
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_parses_string_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Cape Town, South Africa"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "-33.92", "lon": "18.42", "display_name": "Cape Town, Western Cape, South Africa"}
            ])))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri()).unwrap();
        let found = geocoder.search("Cape Town, South Africa").await.unwrap().unwrap();
        assert_eq!(found.coordinates, Coordinates::new(-33.92, 18.42));
        assert!(found.display_name.starts_with("Cape Town"));
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri()).unwrap();
        assert!(geocoder.search("Nowhere, South Africa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_extracts_place_parts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("zoom", "18"))
            .and(query_param("addressdetails", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Hatfield, Pretoria, Gauteng, South Africa",
                "address": {"town": "Pretoria", "country": "South Africa"}
            })))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(format!("{}/", server.uri())).unwrap();
        let address = geocoder
            .reverse(Coordinates::new(-25.75, 28.23))
            .await
            .unwrap();
        assert_eq!(address.place_name(), "Pretoria");
        assert_eq!(
            address.display_name.as_deref(),
            Some("Hatfield, Pretoria, Gauteng, South Africa")
        );
    }

    #[tokio::test]
    async fn test_reverse_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let geocoder = NominatimGeocoder::new(server.uri()).unwrap();
        let err = geocoder
            .reverse(Coordinates::new(-25.75, 28.23))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { status: 503 }));
    }
}
