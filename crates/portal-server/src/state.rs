use std::sync::Arc;

use anyhow::{Context, Result};
use portal_core::Config;
use portal_services::FootballClient;
use portal_weather::{GoogleReverseGeocoder, NominatimGeocoder, WeatherProvider};

/// Services shared by every request
#[derive(Debug)]
pub struct State {
    pub weather: WeatherProvider,
    /// Names for coordinate requests
    pub names: GoogleReverseGeocoder,
    /// Coordinates for name requests
    pub geocoder: NominatimGeocoder,
    pub football: FootballClient,
    pub country_hint: String,
}

impl State {
    pub fn new(
        weather: WeatherProvider,
        names: GoogleReverseGeocoder,
        geocoder: NominatimGeocoder,
        football: FootballClient,
    ) -> Self {
        Self {
            weather,
            names,
            geocoder,
            football,
            country_hint: "South Africa".to_string(),
        }
    }

    pub fn with_country_hint(mut self, hint: impl Into<String>) -> Self {
        self.country_hint = hint.into();
        self
    }

    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let weather = &config.weather;
        let google_key = Some(weather.google_api_key.clone());

        let state = Self::new(
            WeatherProvider::from_config(weather).context("Failed to create weather provider")?,
            GoogleReverseGeocoder::new(&weather.reverse_geocoder_url, google_key)
                .context("Failed to create reverse geocoder")?,
            NominatimGeocoder::new(&weather.geocoder_url).context("Failed to create geocoder")?,
            FootballClient::from_config(&config.sports)?,
        )
        .with_country_hint(&weather.country_hint);

        if !state.weather.is_configured() {
            tracing::warn!("No OpenWeatherMap key configured, /api/weather will return 503");
        }
        if !state.football.is_configured() {
            tracing::warn!("No football-data token configured, sports endpoints return no matches");
        }

        Ok(Arc::new(state))
    }

    /// Free-text place name as sent to the geocoder
    pub fn search_query(&self, name: &str) -> String {
        if self.country_hint.is_empty() {
            name.to_string()
        } else {
            format!("{}, {}", name, self.country_hint)
        }
    }
}
