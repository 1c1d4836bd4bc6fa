//! Client for the portal's own `/api/weather` endpoint.

use crate::types::{Location, WeatherError, WeatherSnapshot};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use tracing::instrument;

/// Fetches a weather report for a resolved location
pub trait WeatherApi: Send + Sync {
    fn fetch(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<WeatherSnapshot, WeatherError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PortalWeatherClient {
    client: Client,
    base_url: String,
}

impl PortalWeatherClient {
    /// `base_url` is the portal origin, e.g. `https://sadailyportal.co.za`
    pub fn new(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Report for a place name, geocoded by the server
    #[instrument(skip(self))]
    pub async fn fetch_by_name(&self, name: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.get(&[("location", name.to_string())]).await
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/api/weather", self.base_url);
        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();

        let body: Value = response
            .json()
            .await
            .map_err(|e| WeatherError::FetchFailed(format!("unreadable body: {}", e)))?;

        if !status.is_success() {
            return Err(WeatherError::FetchFailed(format!(
                "status {}: {}",
                status,
                error_text(&body)
            )));
        }
        if body.get("error").is_some_and(|e| !e.is_null())
            || body.get("success").and_then(Value::as_bool) == Some(false)
        {
            return Err(WeatherError::FetchFailed(error_text(&body)));
        }

        serde_json::from_value(body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

fn error_text(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or("weather request failed")
        .to_string()
}

impl WeatherApi for PortalWeatherClient {
    #[instrument(skip(self, location), fields(location = %location.display_name))]
    async fn fetch(&self, location: &Location) -> Result<WeatherSnapshot, WeatherError> {
        self.get(&[
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
        ])
        .await
    }
}
