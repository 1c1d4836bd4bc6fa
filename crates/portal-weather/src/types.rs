use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair as sent on the wire (`{"lat": .., "lon": ..}`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Fallback label used when no place name is known
    pub fn label(&self) -> String {
        format!("Location ({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// A resolved place the weather is shown for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Full address from the geocoder, when there is one
    pub address: Option<String>,
}

impl Location {
    pub fn new(display_name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            display_name: display_name.into(),
            latitude: coordinates.lat,
            longitude: coordinates.lon,
            address: None,
        }
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Text for the "current location" line: the address if known, else the name
    pub fn heading(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.display_name)
    }

    /// Rough bounding box of South Africa. Informational only.
    pub fn is_in_south_africa(&self) -> bool {
        (-35.0..=-22.0).contains(&self.latitude) && (16.0..=33.0).contains(&self.longitude)
    }
}

/// How precise the location name attached to a weather report is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    StreetAddress,
    Route,
    Neighborhood,
    Sublocality,
    Locality,
    Municipality,
    General,
    Coordinates,
    Search,
    #[default]
    Unknown,
}

/// Current conditions, already converted to display units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// °C
    pub temp: f64,
    pub feels_like: f64,
    /// Percent
    pub humidity: u8,
    /// hPa
    pub pressure: u32,
    /// km/h
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: u16,
    pub description: String,
    pub icon: String,
    /// km
    pub visibility: f64,
    #[serde(default)]
    pub clouds: u8,
    /// `HH:MM`, South African time
    pub sunrise: String,
    #[serde(default)]
    pub sunset: String,
}

/// One 3-hour slot of the short-range forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// e.g. `3 PM`
    pub time: String,
    pub temp: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Chance of precipitation, percent
    pub pop: u8,
    #[serde(default)]
    pub clouds: u8,
}

/// One day of the multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    /// e.g. `Mon`
    pub day: String,
    /// e.g. `Mar 03`
    pub month_day: String,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub wind_speed: f64,
}

/// What the upstream provider returns for a pair of coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub forecast: Vec<DayForecast>,
    #[serde(default)]
    pub cached: bool,
}

/// Complete weather report for one location, as served by `/api/weather`.
/// Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    #[serde(default)]
    pub location_accuracy: LocationAccuracy,
    pub coordinates: Coordinates,
    pub current: CurrentConditions,
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default)]
    pub forecast: Vec<DayForecast>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub cached: bool,
}

impl WeatherSnapshot {
    pub fn new(
        location: impl Into<String>,
        location_accuracy: LocationAccuracy,
        coordinates: Coordinates,
        bundle: ForecastBundle,
    ) -> Self {
        Self {
            location: location.into(),
            location_accuracy,
            coordinates,
            current: bundle.current,
            hourly: bundle.hourly,
            forecast: bundle.forecast,
            timestamp: Utc::now(),
            cached: bundle.cached,
        }
    }
}

/// Rounds to the nearest whole degree, halves upwards, and appends the unit,
/// e.g. `23°C`. `-2.5` renders as `-2°C`.
pub fn format_temperature(temp: f64) -> String {
    // The cast turns -0.0 into 0
    format!("{}°C", (temp + 0.5).floor() as i64)
}

/// Capitalizes the first letter of every word, lowercasing the rest
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Device geolocation failures, classified like the browser's error codes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location information is unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation not supported")]
    Unsupported,
    #[error("Location error: {0}")]
    Unknown(String),
}

impl LocationError {
    /// Maps a W3C `GeolocationPositionError.code`
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Unknown(format!("error code {}", other)),
        }
    }

    /// Text for the manual-entry prompt
    pub fn user_message(&self) -> String {
        let reason = match self {
            Self::PermissionDenied => {
                "Please enable location permissions or enter your location manually."
            }
            Self::PositionUnavailable => "Location information is unavailable.",
            Self::Timeout => "Location request timed out.",
            Self::Unsupported => return "Geolocation not supported by your browser".to_string(),
            Self::Unknown(_) => "An unknown error occurred.",
        };
        format!("Could not detect your location. {}", reason)
    }
}

/// Weather provider, geocoder and portal client errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Upstream returned status {status}")]
    Upstream { status: u16 },
    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Weather API key not configured")]
    NotConfigured,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_format_temperature_rounds() {
        assert_eq!(format_temperature(22.6), "23°C");
        assert_eq!(format_temperature(22.4), "22°C");
        assert_eq!(format_temperature(-0.4), "0°C");
        assert_eq!(format_temperature(-3.6), "-4°C");
    }

    #[test]
    fn test_format_temperature_halves_round_up() {
        assert_eq!(format_temperature(22.5), "23°C");
        assert_eq!(format_temperature(-2.5), "-2°C");
        assert_eq!(format_temperature(-0.5), "0°C");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("scattered clouds"), "Scattered Clouds");
        assert_eq!(title_case("LIGHT rain"), "Light Rain");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_location_error_codes() {
        assert_eq!(LocationError::from_code(1), LocationError::PermissionDenied);
        assert_eq!(LocationError::from_code(2), LocationError::PositionUnavailable);
        assert_eq!(LocationError::from_code(3), LocationError::Timeout);
        assert!(matches!(LocationError::from_code(9), LocationError::Unknown(_)));
    }

    #[test]
    fn test_location_error_messages() {
        assert_eq!(
            LocationError::PermissionDenied.user_message(),
            "Could not detect your location. Please enable location permissions or enter your location manually."
        );
        assert_eq!(
            LocationError::Unknown("boom".into()).user_message(),
            "Could not detect your location. An unknown error occurred."
        );
        assert_eq!(
            LocationError::Unsupported.user_message(),
            "Geolocation not supported by your browser"
        );
    }

    #[test]
    fn test_location_helpers() {
        let cape_town = Location::new("Cape Town", Coordinates::new(-33.92, 18.42));
        assert!(cape_town.is_in_south_africa());
        assert_eq!(cape_town.heading(), "Cape Town");

        let london = Location::new("London", Coordinates::new(51.5, -0.12))
            .with_address(Some("London, England".into()));
        assert!(!london.is_in_south_africa());
        assert_eq!(london.heading(), "London, England");
    }

    #[test]
    fn test_coordinates_validity_and_label() {
        assert!(Coordinates::new(-26.2041, 28.0473).is_valid());
        assert!(!Coordinates::new(f64::NAN, 28.0).is_valid());
        assert!(!Coordinates::new(-91.0, 28.0).is_valid());
        assert_eq!(
            Coordinates::new(-26.2041, 28.0473).label(),
            "Location (-26.2041, 28.0473)"
        );
    }

    #[test]
    fn test_snapshot_accepts_minimal_payload() {
        let json = serde_json::json!({
            "success": true,
            "location": "Johannesburg",
            "coordinates": {"lat": -26.2041, "lon": 28.0473},
            "current": {
                "temp": 24.0, "feels_like": 23.0, "humidity": 40, "pressure": 1019,
                "wind_speed": 14.4, "description": "Clear Sky", "icon": "01d",
                "visibility": 10.0, "sunrise": "05:32"
            },
            "timestamp": "2026-03-01T10:00:00Z"
        });
        let snapshot: WeatherSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.location_accuracy, LocationAccuracy::Unknown);
        assert!(snapshot.forecast.is_empty());
        assert_eq!(snapshot.current.icon, "01d");
    }
}
