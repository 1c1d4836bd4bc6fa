pub mod cache;
pub mod config;
pub mod error;

pub use cache::TtlCache;
pub use config::{
    AuthConfig, Config, ServerConfig, SportsConfig, StorageConfig, ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, AuthError, ConfigError, NetworkError, ReqwestErrorExt, RusqliteErrorExt, SportsError,
    StorageError, WeatherError,
};

use anyhow::Result;

/// Initialize logging for the portal.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("SA Daily Portal core initialized");
    Ok(())
}
