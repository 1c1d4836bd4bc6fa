//! Device position seam.
//!
//! The browser's geolocation API (or any other position provider) sits behind
//! [`PositionSource`]. [`locate`] enforces the request timeout on top of
//! whatever the source does itself.

use crate::types::{Coordinates, LocationError};
use std::future::Future;
use std::time::Duration;

/// Options passed to the position source for every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest acceptable cached fix; zero means always take a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// A device fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub accuracy_meters: Option<f64>,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            coordinates: Coordinates::new(lat, lon),
            accuracy_meters: None,
        }
    }
}

pub trait PositionSource: Send + Sync {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<Position, LocationError>> + Send;
}

/// Used when the platform offers no geolocation at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPositionSource;

impl PositionSource for NoPositionSource {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Always answers with the same outcome. Handy for kiosks with a known
/// location and for tests.
#[derive(Debug, Clone)]
pub struct FixedPosition(pub Result<Position, LocationError>);

impl FixedPosition {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self(Ok(Position::new(lat, lon)))
    }

    pub fn failing(error: LocationError) -> Self {
        Self(Err(error))
    }
}

impl PositionSource for FixedPosition {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        self.0.clone()
    }
}

/// Requests one position, mapping an overrun of `options.timeout` to
/// [`LocationError::Timeout`]. Never retries.
pub async fn locate<P: PositionSource>(
    source: &P,
    options: PositionOptions,
) -> Result<Position, LocationError> {
    match tokio::time::timeout(options.timeout, source.current_position(options)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Position request exceeded {:?}", options.timeout);
            Err(LocationError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    struct NeverAnswers;

    impl PositionSource for NeverAnswers {
        async fn current_position(
            &self,
            _options: PositionOptions,
        ) -> Result<Position, LocationError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_default_options() {
        let options = PositionOptions::default();
        assert!(options.enable_high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_fixed_position() {
        let position = locate(&FixedPosition::at(-33.92, 18.42), PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(position.coordinates, Coordinates::new(-33.92, 18.42));
    }

    #[tokio::test]
    async fn test_unsupported_source() {
        let err = locate(&NoPositionSource, PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Unsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_enforced() {
        let err = locate(&NeverAnswers, PositionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }
}
