//! Maps the errors the page controllers see to `portal_core::AppError`, so
//! banners and panels show the same user-facing text everywhere.

use portal_auth::{IdentityError, ProfileError, ValidationError};
use portal_core::{AppError, AuthError, NetworkError, ReqwestErrorExt, StorageError, WeatherError};
use portal_services::{ContactError, SassaError};
use portal_weather::{LocationError, ResolveError, WeatherError as FetchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Form(#[from] ValidationError),

    #[error(transparent)]
    Sassa(#[from] SassaError),

    #[error(transparent)]
    Contact(#[from] ContactError),
}

impl UiError {
    pub fn user_message(self) -> String {
        AppError::from(self).user_message()
    }
}

fn from_location(e: LocationError) -> AppError {
    match e {
        LocationError::PermissionDenied => AppError::Weather(WeatherError::PermissionDenied),
        LocationError::PositionUnavailable => AppError::Weather(WeatherError::PositionUnavailable),
        LocationError::Timeout => AppError::Weather(WeatherError::LocationTimeout),
        other => AppError::Validation(other.user_message()),
    }
}

impl From<UiError> for AppError {
    fn from(e: UiError) -> Self {
        match e {
            UiError::Fetch(FetchError::Network(e)) => AppError::Network(e.into_network_error()),
            UiError::Fetch(FetchError::Upstream { status }) => {
                AppError::Network(NetworkError::ServerError {
                    status,
                    message: "weather endpoint".to_string(),
                })
            }
            UiError::Fetch(FetchError::FetchFailed(msg)) => {
                AppError::Weather(WeatherError::ApiError(msg))
            }
            UiError::Fetch(FetchError::Parse(msg)) => {
                AppError::Network(NetworkError::InvalidResponse(msg))
            }
            UiError::Fetch(FetchError::NotConfigured) => {
                AppError::Weather(WeatherError::InvalidApiKey)
            }
            UiError::Resolve(ResolveError::LocationNotFound(query)) => {
                AppError::Weather(WeatherError::LocationNotFound(query))
            }
            UiError::Resolve(ResolveError::Detection(e)) => from_location(e),
            UiError::Resolve(other) => AppError::Validation(other.user_message()),
            UiError::Identity(
                e @ (IdentityError::InvalidCredentials
                | IdentityError::EmailExists
                | IdentityError::WeakPassword),
            ) => AppError::Auth(AuthError::from(e)),
            UiError::Identity(IdentityError::Network(msg)) => {
                AppError::Network(NetworkError::ConnectionFailed(msg))
            }
            UiError::Identity(other) => AppError::Validation(other.user_message().to_string()),
            UiError::Profile(ProfileError::Storage(e)) => AppError::Storage(e),
            UiError::Profile(ProfileError::NotFound(uid)) => {
                AppError::Storage(StorageError::QueryFailed(format!("no profile for {}", uid)))
            }
            UiError::Profile(ProfileError::Encoding(e)) => AppError::Other(e.into()),
            UiError::Form(e) => AppError::Validation(e.to_string()),
            UiError::Sassa(e) => AppError::Validation(e.to_string()),
            UiError::Contact(e) => AppError::Validation(e.to_string()),
        }
    }
}

/// User-facing text for any error a page controller can hit
pub fn user_message(err: impl Into<UiError>) -> String {
    err.into().user_message()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_errors() {
        assert_eq!(
            user_message(ResolveError::LocationNotFound("Atlantis".into())),
            "Location not found in South Africa"
        );
        assert_eq!(
            user_message(ResolveError::EmptyQuery),
            "Please enter a valid South African location"
        );
        assert!(matches!(
            AppError::from(UiError::from(ResolveError::Detection(
                LocationError::PermissionDenied
            ))),
            AppError::Weather(WeatherError::PermissionDenied)
        ));
    }

    #[test]
    fn test_form_errors_keep_their_text() {
        assert_eq!(
            user_message(ValidationError::PasswordMismatch),
            "Passwords do not match"
        );
        assert_eq!(
            user_message(SassaError::InvalidId),
            "Please enter a valid 13-digit South African ID number"
        );
        assert_eq!(
            user_message(ContactError::MissingField("email")),
            "Missing required field: email"
        );
    }

    #[test]
    fn test_identity_errors() {
        assert_eq!(
            user_message(IdentityError::InvalidCredentials),
            "Incorrect email or password."
        );
        assert!(matches!(
            AppError::from(UiError::from(IdentityError::EmailExists)),
            AppError::Auth(AuthError::EmailInUse)
        ));
        assert_eq!(
            user_message(IdentityError::InvalidEmail),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn test_profile_storage_error() {
        let err = ProfileError::Storage(StorageError::Unavailable("disk".into()));
        assert!(matches!(
            AppError::from(UiError::from(err)),
            AppError::Storage(StorageError::Unavailable(_))
        ));
    }
}
