//! Weather page against mock geocoder and portal endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use portal_weather::{
    Coordinates, Location, LocationResolver, NoPositionSource, NominatimGeocoder,
    PortalWeatherClient, WeatherApi, WeatherController, WeatherError,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_body(location: &str, temp: f64) -> serde_json::Value {
    json!({
        "success": true,
        "location": location,
        "location_accuracy": "locality",
        "coordinates": {"lat": -33.92, "lon": 18.42},
        "current": {
            "temp": temp, "feels_like": 19.0, "humidity": 72, "pressure": 1016,
            "wind_speed": 25.2, "wind_deg": 160, "description": "Broken Clouds",
            "icon": "04d", "visibility": 10.0, "clouds": 75,
            "sunrise": "06:48", "sunset": "19:38"
        },
        "hourly": [],
        "forecast": [{
            "date": "2026-03-03", "day": "Tue", "month_day": "Mar 03",
            "temp": 21.0, "temp_min": 16.0, "temp_max": 25.0,
            "description": "Clear Sky", "icon": "01d"
        }],
        "timestamp": "2026-03-02T08:00:00Z",
        "cached": false
    })
}

#[tokio::test]
async fn test_cape_town_search_end_to_end() {
    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Cape Town, South Africa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "-33.92", "lon": "18.42", "display_name": "Cape Town, Western Cape, South Africa"}
        ])))
        .expect(1)
        .mount(&geocoder)
        .await;

    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("lat", "-33.92"))
        .and(query_param("lon", "18.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Cape Town", 19.6)))
        .expect(1)
        .mount(&portal)
        .await;

    let resolver = LocationResolver::new(
        NominatimGeocoder::new(geocoder.uri()).unwrap(),
        NoPositionSource,
    );
    let mut controller =
        WeatherController::new(resolver, PortalWeatherClient::new(portal.uri()).unwrap());

    assert!(controller.search("Cape Town").await);

    let state = controller.state();
    assert!(state.weather_visible);
    assert!(state.error.is_none());
    assert_eq!(
        state.location.as_ref().unwrap().coordinates(),
        Coordinates::new(-33.92, 18.42)
    );
    assert_eq!(controller.temperature_label().as_deref(), Some("20°C"));
    assert_eq!(state.snapshot.as_ref().unwrap().forecast.len(), 1);
}

#[tokio::test]
async fn test_payload_error_is_fetch_failure() {
    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Weather service temporarily unavailable"
        })))
        .mount(&portal)
        .await;

    let client = PortalWeatherClient::new(portal.uri()).unwrap();
    let err = client
        .fetch(&Location::new("Soweto", Coordinates::new(-26.27, 27.86)))
        .await
        .unwrap_err();
    match err {
        WeatherError::FetchFailed(message) => {
            assert_eq!(message, "Weather service temporarily unavailable")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_status_is_fetch_failure() {
    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "success": false,
            "error": "Weather service temporarily unavailable"
        })))
        .mount(&portal)
        .await;

    let client = PortalWeatherClient::new(portal.uri()).unwrap();
    let err = client
        .fetch(&Location::new("Soweto", Coordinates::new(-26.27, 27.86)))
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn test_failed_fetch_then_success_toggles_panels() {
    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&portal)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Cape Town", 18.2)))
        .mount(&portal)
        .await;

    let resolver = LocationResolver::new(
        NominatimGeocoder::new("http://127.0.0.1:9").unwrap(),
        NoPositionSource,
    );
    let mut controller =
        WeatherController::new(resolver, PortalWeatherClient::new(portal.uri()).unwrap());

    let place = portal_weather::PlaceSelection {
        name: "Cape Town".into(),
        formatted_address: None,
        coordinates: Some(Coordinates::new(-33.92, 18.42)),
    };
    controller.select_place(&place).await;
    assert!(controller.state().error.is_some());
    assert!(!controller.state().weather_visible);

    controller.retry().await;
    assert!(controller.state().error.is_none());
    assert!(controller.state().weather_visible);
    assert_eq!(controller.temperature_label().as_deref(), Some("18°C"));
}

#[tokio::test]
async fn test_fetch_by_name() {
    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .and(query_param("location", "Cape Town"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Cape Town", 21.0)))
        .mount(&portal)
        .await;

    let client = PortalWeatherClient::new(portal.uri()).unwrap();
    let snapshot = client.fetch_by_name("Cape Town").await.unwrap();
    assert_eq!(snapshot.location, "Cape Town");
    assert_eq!(snapshot.current.icon, "04d");
}
