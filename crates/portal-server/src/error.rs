use chrono::Utc;
use portal_services::{sa_timestamp, ContactError};
use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid coordinates")]
    InvalidCoordinates,

    #[error("Location required")]
    LocationRequired,

    #[error("Location not found")]
    LocationNotFound,

    #[error("Weather service temporarily unavailable")]
    WeatherUnavailable,

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed request")]
    MalformedRequest,

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCoordinates
            | ApiError::LocationRequired
            | ApiError::Contact(_)
            | ApiError::MalformedRequest => StatusCode::BAD_REQUEST,
            ApiError::LocationNotFound | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::WeatherUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let timestamp = status
            .is_server_error()
            .then(|| sa_timestamp(Utc::now()));
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            timestamp,
        };
        warp::reply::with_status(warp::reply::json(&body), status).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidCoordinates.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::LocationNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::WeatherUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ContactError::MissingField("subject")).to_string(),
            "Missing required field: subject"
        );
    }

    #[test]
    fn test_body_shape() {
        let response = ApiError::LocationRequired.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
