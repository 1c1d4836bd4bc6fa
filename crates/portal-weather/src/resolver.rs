//! Turns the three kinds of location input into one [`Location`]:
//! the device position, typed text, or a place picked from autocomplete.

use crate::geocode::Geocoder;
use crate::location::{locate, PositionOptions, PositionSource};
use crate::types::{Coordinates, Location, LocationError, WeatherError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// A place chosen from the autocomplete list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSelection {
    pub name: String,
    pub formatted_address: Option<String>,
    /// Missing when the picker returned a prediction without details
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("empty location query")]
    EmptyQuery,

    #[error("no match for {0:?}")]
    LocationNotFound(String),

    #[error("selected place has no coordinates")]
    MissingGeometry,

    #[error("device location failed: {0}")]
    Detection(#[from] LocationError),

    #[error("geocoder failed: {0}")]
    Geocoder(#[source] WeatherError),
}

impl ResolveError {
    pub fn user_message(&self) -> String {
        match self {
            ResolveError::EmptyQuery => "Please enter a valid South African location".to_string(),
            ResolveError::LocationNotFound(_) => "Location not found in South Africa".to_string(),
            ResolveError::MissingGeometry => {
                "Please choose a location from the suggestions".to_string()
            }
            ResolveError::Detection(e) => e.user_message(),
            ResolveError::Geocoder(_) => {
                "Location lookup failed. Please try again in a moment.".to_string()
            }
        }
    }

    /// True for failures of the automatic path, which get the manual-entry
    /// prompt instead of the error panel
    pub fn is_detection(&self) -> bool {
        matches!(self, ResolveError::Detection(_))
    }
}

pub struct LocationResolver<G, P> {
    geocoder: G,
    positions: P,
    country_hint: String,
    options: PositionOptions,
}

impl<G: Geocoder, P: PositionSource> LocationResolver<G, P> {
    pub fn new(geocoder: G, positions: P) -> Self {
        Self {
            geocoder,
            positions,
            country_hint: "South Africa".to_string(),
            options: PositionOptions::default(),
        }
    }

    pub fn with_country_hint(mut self, hint: impl Into<String>) -> Self {
        self.country_hint = hint.into();
        self
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Device position followed by a reverse lookup. Not retried.
    #[instrument(skip(self))]
    pub async fn resolve_automatic(&self) -> Result<Location, ResolveError> {
        let position = locate(&self.positions, self.options).await?;

        let address = self
            .geocoder
            .reverse(position.coordinates)
            .await
            .map_err(|e| {
                tracing::error!("Reverse geocode error: {}", e);
                LocationError::Unknown(e.to_string())
            })?;

        Ok(Location::new(address.place_name(), position.coordinates)
            .with_address(address.display_name))
    }

    /// Best match for the typed text within the country hint. The typed text
    /// becomes the display name.
    #[instrument(skip(self))]
    pub async fn resolve_search(&self, text: &str) -> Result<Location, ResolveError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let query = if self.country_hint.is_empty() {
            text.to_string()
        } else {
            format!("{}, {}", text, self.country_hint)
        };

        let found = self
            .geocoder
            .search(&query)
            .await
            .map_err(ResolveError::Geocoder)?
            .ok_or_else(|| ResolveError::LocationNotFound(text.to_string()))?;

        let address = Some(found.display_name).filter(|name| !name.is_empty());
        Ok(Location::new(text, found.coordinates).with_address(address))
    }

    /// Uses the picker's coordinates as-is; no geocoder round trip
    pub fn resolve_selection(&self, place: &PlaceSelection) -> Result<Location, ResolveError> {
        let coordinates = place.coordinates.ok_or(ResolveError::MissingGeometry)?;
        Ok(Location::new(place.name.clone(), coordinates)
            .with_address(place.formatted_address.clone()))
    }
}
