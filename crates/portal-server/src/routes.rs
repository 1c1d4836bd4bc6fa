//! Portal API routes.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Africa::Johannesburg;
use portal_services::contact::{self, ContactForm};
use portal_services::guides::GuideList;
use portal_services::{payment_schedule, sa_date, sa_timestamp};
use portal_weather::{Coordinates, Geocoder, LocationAccuracy, WeatherSnapshot};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use warp::http::Uri;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

use crate::error::ApiError;
use crate::state::State;

pub const VERSION: &str = "2026.2.0";

/// Query of `/api/weather`: either coordinates or a place name
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub location: Option<String>,
}

#[derive(Serialize)]
struct WeatherResponse {
    success: bool,
    #[serde(flatten)]
    snapshot: WeatherSnapshot,
}

/// Old page paths and where they live now
pub fn redirect_target(segment: &str) -> Option<&'static str> {
    match segment {
        "home" | "index.html" => Some("/"),
        "soccer" | "football" => Some("/sports"),
        "guide" | "guides" => Some("/howto"),
        "help" | "questions" => Some("/faq"),
        "about" => Some("/contact"),
        _ => None,
    }
}

fn with_state(state: Arc<State>) -> impl Filter<Extract = (Arc<State>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn respond(result: Result<impl Reply, ApiError>) -> Response {
    match result {
        Ok(reply) => reply.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Every route of the portal, with CORS and request tracing
pub fn routes(
    state: Arc<State>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let weather = warp::path!("api" / "weather")
        .and(warp::get())
        .and(warp::query::<WeatherQuery>())
        .and(with_state(state.clone()))
        .and_then(weather_handler);

    let sports = warp::path!("api" / "sports" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(sports_handler);

    let sassa = warp::path!("api" / "sassa" / "payment-dates")
        .and(warp::get())
        .map(|| warp::reply::json(&payment_schedule(sa_date(Utc::now()))));

    let contact_form = warp::path!("api" / "contact" / "submit")
        .and(warp::post())
        .and(warp::body::form::<ContactForm>())
        .map(|form: ContactForm| {
            respond(
                contact::submit(&form, sa_timestamp(Utc::now()))
                    .map(|receipt| warp::reply::json(&receipt))
                    .map_err(ApiError::from),
            )
        });

    let guides = warp::path!("api" / "guides" / "list")
        .and(warp::get())
        .map(|| warp::reply::json(&GuideList::new(sa_timestamp(Utc::now()))));

    let status = warp::path!("api" / "status")
        .and(warp::get())
        .map(|| warp::reply::json(&status_body()));

    let redirects = warp::get()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and_then(|segment: String| async move {
            match redirect_target(&segment) {
                Some(to) => Ok(warp::redirect::found(Uri::from_static(to))),
                None => Err(warp::reject::not_found()),
            }
        });

    let statics = warp::path("static").and(warp::fs::dir(static_dir));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    weather
        .or(sports)
        .or(sassa)
        .or(contact_form)
        .or(guides)
        .or(status)
        .or(redirects)
        .or(statics)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::trace::request())
}

#[instrument(skip(state))]
async fn weather_handler(query: WeatherQuery, state: Arc<State>) -> Result<Response, Rejection> {
    Ok(respond(weather_report(&query, &state).await.map(|snapshot| {
        warp::reply::json(&WeatherResponse {
            success: true,
            snapshot,
        })
    })))
}

fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates, ApiError> {
    let lat = lat.trim().parse::<f64>();
    let lon = lon.trim().parse::<f64>();
    match (lat, lon) {
        (Ok(lat), Ok(lon)) => Some(Coordinates::new(lat, lon))
            .filter(Coordinates::is_valid)
            .ok_or(ApiError::InvalidCoordinates),
        _ => Err(ApiError::InvalidCoordinates),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Coordinates are named by reverse lookup; names are geocoded first
pub async fn weather_report(query: &WeatherQuery, state: &State) -> Result<WeatherSnapshot, ApiError> {
    let (name, accuracy, coordinates) =
        match (non_empty(&query.lat), non_empty(&query.lon), non_empty(&query.location)) {
            (Some(lat), Some(lon), _) => {
                let coordinates = parse_coordinates(lat, lon)?;
                let place = state.names.name_for(coordinates).await;
                (place.name, place.accuracy, coordinates)
            }
            (_, _, Some(name)) => {
                let found = state
                    .geocoder
                    .search(&state.search_query(name))
                    .await
                    .map_err(|e| {
                        tracing::error!("Geocoding {:?} failed: {}", name, e);
                        ApiError::WeatherUnavailable
                    })?
                    .ok_or(ApiError::LocationNotFound)?;
                (name.to_string(), LocationAccuracy::Search, found.coordinates)
            }
            _ => return Err(ApiError::LocationRequired),
        };

    let bundle = state.weather.forecast(coordinates).await.map_err(|e| {
        tracing::error!("Weather API error: {}", e);
        ApiError::WeatherUnavailable
    })?;

    Ok(WeatherSnapshot::new(name, accuracy, coordinates, bundle))
}

async fn sports_handler(feed: String, state: Arc<State>) -> Result<Response, Rejection> {
    let football = &state.football;
    let reply = match feed.as_str() {
        "matches" => warp::reply::json(&football.todays_matches().await),
        "live" => warp::reply::json(&football.live_matches().await),
        "fixtures" | "upcoming" => warp::reply::json(&football.upcoming_fixtures().await),
        "standings" => warp::reply::json(&football.standings().await),
        _ => return Err(warp::reject::not_found()),
    };
    Ok(reply.into_response())
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub timestamp: String,
    pub year: &'static str,
    pub services: BTreeMap<&'static str, &'static str>,
    pub version: &'static str,
    pub uptime: &'static str,
    pub last_updated: String,
}

pub fn status_body() -> StatusBody {
    let now = Utc::now();
    let services = [
        "weather",
        "football",
        "sassa_2026",
        "guides",
        "contact",
        "faq",
    ]
    .into_iter()
    .map(|name| (name, "active"))
    .collect();

    StatusBody {
        status: "online",
        timestamp: sa_timestamp(now),
        year: "2026",
        services,
        version: VERSION,
        uptime: "100%",
        last_updated: now
            .with_timezone(&Johannesburg)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let error = if rejection.is_not_found() {
        ApiError::NotFound
    } else if rejection
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
        || rejection.find::<warp::reject::InvalidQuery>().is_some()
        || rejection.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        ApiError::MalformedRequest
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::MethodNotAllowed
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        ApiError::Internal
    };
    Ok(error.into_response())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_redirect_targets() {
        assert_eq!(redirect_target("home"), Some("/"));
        assert_eq!(redirect_target("index.html"), Some("/"));
        assert_eq!(redirect_target("football"), Some("/sports"));
        assert_eq!(redirect_target("guides"), Some("/howto"));
        assert_eq!(redirect_target("questions"), Some("/faq"));
        assert_eq!(redirect_target("about"), Some("/contact"));
        assert_eq!(redirect_target("weather"), None);
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse_coordinates("-33.92", " 18.42").unwrap(),
            Coordinates::new(-33.92, 18.42)
        );
        assert!(matches!(
            parse_coordinates("abc", "18.42"),
            Err(ApiError::InvalidCoordinates)
        ));
        assert!(matches!(
            parse_coordinates("NaN", "18.42"),
            Err(ApiError::InvalidCoordinates)
        ));
        assert!(matches!(
            parse_coordinates("-133.0", "18.42"),
            Err(ApiError::InvalidCoordinates)
        ));
    }

    #[test]
    fn test_status_body() {
        let value = serde_json::to_value(status_body()).unwrap();
        assert_eq!(value["status"], "online");
        assert_eq!(value["version"], "2026.2.0");
        assert_eq!(value["services"]["sassa_2026"], "active");
        assert_eq!(value["services"].as_object().unwrap().len(), 6);
    }
}
