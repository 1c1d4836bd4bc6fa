//! OpenWeatherMap provider: current conditions plus the 5-day/3-hour
//! forecast, converted to display units and cached per coordinate pair.

use crate::types::{
    title_case, Coordinates, CurrentConditions, DayForecast, ForecastBundle, HourlyForecast,
    WeatherError,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Africa::Johannesburg;
use portal_core::{TtlCache, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::instrument;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const FORECAST_COUNT: &str = "40";
const HOURLY_SLOTS: usize = 8;
const DAILY_GROUPS: usize = 6;
const DAILY_DAYS: usize = 5;

#[derive(Debug, Deserialize)]
struct RawCurrent {
    main: RawMain,
    wind: RawWind,
    #[serde(default)]
    weather: Vec<RawCondition>,
    visibility: Option<f64>,
    clouds: Option<RawClouds>,
    sys: RawSys,
}

#[derive(Debug, Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct RawWind {
    /// m/s
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Clone, Deserialize)]
struct RawCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct RawClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct RawSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    #[serde(default)]
    list: Vec<RawSlot>,
}

#[derive(Debug, Deserialize)]
struct RawSlot {
    dt: i64,
    main: RawMain,
    #[serde(default)]
    weather: Vec<RawCondition>,
    wind: RawWind,
    #[serde(default)]
    pop: f64,
    clouds: Option<RawClouds>,
}

impl RawSlot {
    fn condition(&self) -> (String, String) {
        self.weather
            .first()
            .map(|c| (c.description.clone(), c.icon.clone()))
            .unwrap_or_default()
    }
}

fn ms_to_kmh(speed: f64) -> f64 {
    (speed * 3.6 * 10.0).round() / 10.0
}

fn local_time(timestamp: i64) -> Option<DateTime<chrono_tz::Tz>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.with_timezone(&Johannesburg))
}

fn clock(timestamp: i64) -> String {
    local_time(timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn convert_current(raw: RawCurrent) -> CurrentConditions {
    let condition = raw.weather.into_iter().next();
    CurrentConditions {
        temp: raw.main.temp.round(),
        feels_like: raw.main.feels_like.round(),
        humidity: raw.main.humidity,
        pressure: raw.main.pressure,
        wind_speed: ms_to_kmh(raw.wind.speed),
        wind_deg: raw.wind.deg,
        description: condition
            .as_ref()
            .map(|c| title_case(&c.description))
            .unwrap_or_default(),
        icon: condition.map(|c| c.icon).unwrap_or_default(),
        visibility: raw.visibility.unwrap_or(10_000.0) / 1000.0,
        clouds: raw.clouds.map(|c| c.all).unwrap_or(0),
        sunrise: clock(raw.sys.sunrise),
        sunset: clock(raw.sys.sunset),
    }
}

fn hourly_slots(slots: &[RawSlot]) -> Vec<HourlyForecast> {
    slots
        .iter()
        .take(HOURLY_SLOTS)
        .map(|slot| {
            let (description, icon) = slot.condition();
            let time = local_time(slot.dt)
                .map(|t| t.format("%I %p").to_string())
                .unwrap_or_default();
            HourlyForecast {
                time: time.trim_start_matches('0').to_string(),
                temp: slot.main.temp.round(),
                feels_like: slot.main.feels_like.round(),
                description: title_case(&description),
                icon,
                humidity: slot.main.humidity,
                wind_speed: ms_to_kmh(slot.wind.speed),
                pop: (slot.pop * 100.0).round().clamp(0.0, 100.0) as u8,
                clouds: slot.clouds.as_ref().map(|c| c.all).unwrap_or(0),
            }
        })
        .collect()
}

/// Most frequent value; ties go to the value seen first
fn most_common(values: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for value in values {
        let count = counts.get(value.as_str()).copied().unwrap_or(0);
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value.as_str(), count));
        }
    }
    best.map(|(v, _)| v.to_string()).unwrap_or_default()
}

#[derive(Default)]
struct DayAccumulator {
    temps: Vec<f64>,
    icons: Vec<String>,
    descriptions: Vec<String>,
    humidity: Vec<f64>,
    wind: Vec<f64>,
}

/// Groups the 3-hour slots by local date and summarizes each future day.
/// Only the first six dates are considered; today and earlier are skipped.
fn daily_summary(slots: &[RawSlot], today: NaiveDate) -> Vec<DayForecast> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for slot in slots {
        let Some(time) = local_time(slot.dt) else {
            continue;
        };
        let (description, icon) = slot.condition();
        let day = days.entry(time.date_naive()).or_default();
        day.temps.push(slot.main.temp);
        day.icons.push(icon);
        day.descriptions.push(description);
        day.humidity.push(f64::from(slot.main.humidity));
        day.wind.push(slot.wind.speed);
    }

    days.into_iter()
        .take(DAILY_GROUPS)
        .filter(|(date, _)| *date > today)
        .filter(|(_, day)| !day.temps.is_empty())
        .take(DAILY_DAYS)
        .map(|(date, day)| {
            let count = day.temps.len() as f64;
            let average = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
            let min = day.temps.iter().copied().fold(f64::INFINITY, f64::min);
            let max = day.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            DayForecast {
                date,
                day: date.format("%a").to_string(),
                month_day: date.format("%b %d").to_string(),
                temp: (day.temps.iter().sum::<f64>() / count).round(),
                temp_min: min.round(),
                temp_max: max.round(),
                description: title_case(&most_common(&day.descriptions)),
                icon: most_common(&day.icons),
                humidity: average(&day.humidity).round() as u8,
                wind_speed: ms_to_kmh(average(&day.wind)),
            }
        })
        .collect()
}

/// Today's date in South Africa
pub fn sa_today() -> NaiveDate {
    Utc::now().with_timezone(&Johannesburg).date_naive()
}

#[derive(Debug)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    cache_ttl: Duration,
    cache: TtlCache<ForecastBundle>,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            cache_ttl: Duration::from_secs(300),
            cache: TtlCache::new(),
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let mut provider = Self::new(&config.base_url, &config.api_key)?;
        provider.cache_ttl = Duration::from_secs(config.cache_seconds);
        Ok(provider)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Current conditions, 8 hourly slots and up to 5 future days.
    /// Served from cache (with `cached: true`) when fresh.
    #[instrument(skip(self))]
    pub async fn forecast(&self, coordinates: Coordinates) -> Result<ForecastBundle, WeatherError> {
        let cache_key = format!("weather_forecast_{}_{}", coordinates.lat, coordinates.lon);
        if let Some(mut bundle) = self.cache.get(&cache_key, self.cache_ttl) {
            bundle.cached = true;
            return Ok(bundle);
        }

        if !self.is_configured() {
            return Err(WeatherError::NotConfigured);
        }

        let (current, forecast) = tokio::join!(
            self.get_json::<RawCurrent>("/data/2.5/weather", coordinates, None),
            self.get_json::<RawForecast>("/data/2.5/forecast", coordinates, Some(FORECAST_COUNT)),
        );
        let current = current?;
        let forecast = forecast?;

        let bundle = ForecastBundle {
            current: convert_current(current),
            hourly: hourly_slots(&forecast.list),
            forecast: daily_summary(&forecast.list, sa_today()),
            cached: false,
        };
        self.cache.set(cache_key, bundle.clone());
        tracing::info!(
            "Fetched weather for {:.4}, {:.4}",
            coordinates.lat,
            coordinates.lon
        );
        Ok(bundle)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        coordinates: Coordinates,
        count: Option<&str>,
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut params = vec![
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
            ("lang", "en".to_string()),
        ];
        if let Some(count) = count {
            params.push(("cnt", count.to_string()));
        }

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!("Weather API {} returned {}", endpoint, status);
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn slot(dt: i64, temp: f64, icon: &str, description: &str) -> RawSlot {
        serde_json::from_value(json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp, "humidity": 50},
            "weather": [{"description": description, "icon": icon}],
            "wind": {"speed": 5.0},
            "pop": 0.25
        }))
        .unwrap()
    }

    // 2026-03-02 00:00 SAST
    const MARCH_2_MIDNIGHT_SAST: i64 = 1_772_402_400;
    const HOUR: i64 = 3600;

    #[test]
    fn test_wind_conversion() {
        assert_eq!(ms_to_kmh(4.0), 14.4);
        assert_eq!(ms_to_kmh(3.33), 12.0);
    }

    #[test]
    fn test_current_conversion() {
        let raw: RawCurrent = serde_json::from_value(json!({
            "main": {"temp": 22.6, "feels_like": 21.4, "humidity": 40, "pressure": 1018},
            "wind": {"speed": 4.0},
            "weather": [{"description": "few clouds", "icon": "02d"}],
            "sys": {"sunrise": 1_772_425_200, "sunset": 1_772_470_800}
        }))
        .unwrap();
        let current = convert_current(raw);
        assert_eq!(current.temp, 23.0);
        assert_eq!(current.feels_like, 21.0);
        assert_eq!(current.wind_speed, 14.4);
        assert_eq!(current.wind_deg, 0);
        assert_eq!(current.visibility, 10.0);
        assert_eq!(current.description, "Few Clouds");
        // 06:20 and 19:00 SAST
        assert_eq!(current.sunrise, "06:20");
        assert_eq!(current.sunset, "19:00");
    }

    #[test]
    fn test_hourly_labels_and_limit() {
        let slots: Vec<RawSlot> = (0..12)
            .map(|i| slot(MARCH_2_MIDNIGHT_SAST + i * 3 * HOUR, 20.0, "01d", "clear sky"))
            .collect();
        let hourly = hourly_slots(&slots);
        assert_eq!(hourly.len(), 8);
        assert_eq!(hourly[0].time, "12 AM");
        assert_eq!(hourly[1].time, "3 AM");
        assert_eq!(hourly[5].time, "3 PM");
        assert_eq!(hourly[0].pop, 25);
        assert_eq!(hourly[0].wind_speed, 18.0);
    }

    #[test]
    fn test_daily_skips_today_and_summarizes() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut slots = vec![slot(MARCH_2_MIDNIGHT_SAST + 12 * HOUR, 30.0, "01d", "clear sky")];
        let next_day = MARCH_2_MIDNIGHT_SAST + 24 * HOUR;
        slots.push(slot(next_day + 3 * HOUR, 14.4, "10d", "light rain"));
        slots.push(slot(next_day + 6 * HOUR, 18.0, "04d", "broken clouds"));
        slots.push(slot(next_day + 9 * HOUR, 21.6, "10d", "light rain"));

        let days = daily_summary(&slots, today);
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(day.day, "Tue");
        assert_eq!(day.month_day, "Mar 03");
        assert_eq!(day.temp, 18.0);
        assert_eq!(day.temp_min, 14.0);
        assert_eq!(day.temp_max, 22.0);
        assert_eq!(day.icon, "10d");
        assert_eq!(day.description, "Light Rain");
    }

    #[test]
    fn test_daily_caps_at_five_days() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let slots: Vec<RawSlot> = (0..8)
            .map(|d| slot(MARCH_2_MIDNIGHT_SAST + d * 24 * HOUR + HOUR, 20.0, "01d", "clear sky"))
            .collect();
        let days = daily_summary(&slots, today);
        assert_eq!(days.len(), 5);
        assert_eq!(days[0].month_day, "Mar 02");
    }

    #[test]
    fn test_most_common_prefers_first_on_tie() {
        let values: Vec<String> = ["02d", "10d", "10d", "02d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(most_common(&values), "02d");
        assert_eq!(most_common(&[]), "");
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let provider = WeatherProvider::new("http://127.0.0.1:9", "").unwrap();
        assert!(!provider.is_configured());
        let err = provider
            .forecast(Coordinates::new(-26.2, 28.0))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NotConfigured));
    }
}
