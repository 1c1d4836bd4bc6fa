//! Portal API routes against mocked upstream services.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;
use std::sync::Arc;

use portal_server::{routes, State};
use portal_services::FootballClient;
use portal_weather::{GoogleReverseGeocoder, NominatimGeocoder, WeatherProvider};
use serde_json::{json, Value};
use warp::http::StatusCode;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(upstream: &MockServer) -> Arc<State> {
    Arc::new(State::new(
        WeatherProvider::new(upstream.uri(), "owm-key").unwrap(),
        GoogleReverseGeocoder::new(upstream.uri(), None).unwrap(),
        NominatimGeocoder::new(upstream.uri()).unwrap(),
        FootballClient::new(&upstream.uri(), "").unwrap(),
    ))
}

async fn mount_weather(upstream: &MockServer, lat: &str, lon: &str) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", lat))
        .and(query_param("lon", lon))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 20.3, "feels_like": 19.4, "humidity": 64, "pressure": 1016},
            "wind": {"speed": 6.2, "deg": 150},
            "weather": [{"description": "broken clouds", "icon": "04d"}],
            "visibility": 10000,
            "clouds": {"all": 75},
            "sys": {"sunrise": 1772425200, "sunset": 1772470800}
        })))
        .mount(upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .mount(upstream)
        .await;
}

async fn get(state: Arc<State>, uri: &str) -> (StatusCode, Value) {
    let response = warp::test::request()
        .method("GET")
        .path(uri)
        .reply(&routes(state, PathBuf::from("static")))
        .await;
    let body = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
    (response.status(), body)
}

#[tokio::test]
async fn test_weather_for_coordinates() {
    let upstream = MockServer::start().await;
    mount_weather(&upstream, "-25.75", "28.19").await;

    let (status, body) = get(state(&upstream), "/api/weather?lat=-25.75&lon=28.19").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["location"], "Location (-25.7500, 28.1900)");
    assert_eq!(body["location_accuracy"], "coordinates");
    assert_eq!(body["coordinates"]["lat"], -25.75);
    assert_eq!(body["current"]["temp"], 20.0);
    assert_eq!(body["cached"], false);
}

#[tokio::test]
async fn test_weather_for_place_name() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Cape Town, South Africa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "-33.92", "lon": "18.42", "display_name": "Cape Town, Western Cape, South Africa"}
        ])))
        .expect(1)
        .mount(&upstream)
        .await;
    mount_weather(&upstream, "-33.92", "18.42").await;

    let (status, body) = get(state(&upstream), "/api/weather?location=Cape%20Town").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Cape Town");
    assert_eq!(body["location_accuracy"], "search");
    assert_eq!(body["coordinates"]["lon"], 18.42);
}

#[tokio::test]
async fn test_unknown_place_is_not_found() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let (status, body) = get(state(&upstream), "/api/weather?location=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Location not found"}));
}

#[tokio::test]
async fn test_weather_bad_requests() {
    let upstream = MockServer::start().await;

    let (status, body) = get(state(&upstream), "/api/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location required");

    let (status, body) = get(state(&upstream), "/api/weather?lat=abc&lon=28.19").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid coordinates");

    let (status, body) = get(state(&upstream), "/api/weather?location=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location required");
}

#[tokio::test]
async fn test_weather_upstream_failure() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let (status, body) = get(state(&upstream), "/api/weather?lat=-29.86&lon=31.02").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Weather service temporarily unavailable");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_sports_without_token() {
    let upstream = MockServer::start().await;

    let (status, body) = get(state(&upstream), "/api/sports/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["matches"], json!([]));

    let (status, body) = get(state(&upstream), "/api/sports/standings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["standings"], json!([]));

    let (status, body) = get(state(&upstream), "/api/sports/transfers").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_submit() {
    let upstream = MockServer::start().await;
    let filter = routes(state(&upstream), PathBuf::from("static"));

    let response = warp::test::request()
        .method("POST")
        .path("/api/contact/submit")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Thabo&email=thabo%40example.co.za&subject=&message=Hello")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"], "Missing required field: subject");

    let response = warp::test::request()
        .method("POST")
        .path("/api/contact/submit")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Thabo&email=thabo%40example.co.za&subject=Hi&message=Hello")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["response_time"], "24-48 hours");
}

#[tokio::test]
async fn test_static_payloads() {
    let upstream = MockServer::start().await;

    let (status, body) = get(state(&upstream), "/api/sassa/payment-dates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_window"], "1st - 5th of each month");
    assert_eq!(body["official_contacts"]["helpline"], "0800 60 10 11");

    let (_, body) = get(state(&upstream), "/api/guides/list").await;
    assert_eq!(body["total"], 4);

    let (_, body) = get(state(&upstream), "/api/status").await;
    assert_eq!(body["status"], "online");
    assert_eq!(body["version"], "2026.2.0");
}

#[tokio::test]
async fn test_redirects() {
    let upstream = MockServer::start().await;
    let filter = routes(state(&upstream), PathBuf::from("static"));

    for (from, to) in [
        ("/home", "/"),
        ("/index.html", "/"),
        ("/soccer", "/sports"),
        ("/guides", "/howto"),
        ("/help", "/faq"),
        ("/about", "/contact"),
    ] {
        let response = warp::test::request().path(from).reply(&filter).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{}", from);
        assert_eq!(response.headers()["location"], to, "{}", from);
    }
}

#[tokio::test]
async fn test_static_files_and_cors() {
    let upstream = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.css"), "body { margin: 0; }").unwrap();
    let filter = routes(state(&upstream), dir.path().to_path_buf());

    let response = warp::test::request()
        .path("/static/app.css")
        .header("origin", "https://example.co.za")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"body { margin: 0; }");
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));

    let response = warp::test::request()
        .path("/static/missing.css")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
