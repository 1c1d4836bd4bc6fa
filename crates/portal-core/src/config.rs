use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub sports: SportsConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    #[serde(default)]
    pub api_key: String,

    /// OpenWeatherMap base URL (`/data/2.5/...` is appended)
    pub base_url: String,

    /// Nominatim base URL used for place search and reverse lookups
    pub geocoder_url: String,

    /// Google Geocoding base URL used for the server's location names
    pub reverse_geocoder_url: String,

    #[serde(default)]
    pub google_api_key: String,

    /// Appended to free-text searches
    pub country_hint: String,

    /// How long a weather response stays fresh, in seconds
    pub cache_seconds: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            reverse_geocoder_url: "https://maps.googleapis.com".to_string(),
            google_api_key: String::new(),
            country_hint: "South Africa".to_string(),
            cache_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportsConfig {
    /// football-data.org token
    #[serde(default)]
    pub api_token: String,

    pub base_url: String,

    /// Competition code used for standings
    pub competition: String,
}

impl Default for SportsConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: "https://api.football-data.org".to_string(),
            competition: "PL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Firebase Web API key
    #[serde(default)]
    pub api_key: String,

    /// Identity Toolkit base URL
    pub identity_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Holds profiles.db, session.json and settings.json
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("saportal"),
        }
    }
}

impl StorageConfig {
    pub fn profiles_db(&self) -> PathBuf {
        self.data_dir.join("profiles.db")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, writing defaults there on first run.
    /// API keys may be overridden from the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors; warnings
    /// are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("SAPORTAL_WEATHER_KEY", &mut self.weather.api_key),
            ("SAPORTAL_GOOGLE_KEY", &mut self.weather.google_api_key),
            ("SAPORTAL_FOOTBALL_TOKEN", &mut self.sports.api_token),
            ("SAPORTAL_FIREBASE_KEY", &mut self.auth.api_key),
        ];

        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    tracing::debug!("Using {} from environment", var);
                    *slot = value.trim().to_string();
                }
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(&self.weather.geocoder_url, "weather.geocoder_url", &mut result);
        validate_url(
            &self.weather.reverse_geocoder_url,
            "weather.reverse_geocoder_url",
            &mut result,
        );
        validate_url(&self.sports.base_url, "sports.base_url", &mut result);
        validate_url(&self.auth.identity_url, "auth.identity_url", &mut result);

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.weather.api_key.is_empty() {
            result.add_warning(
                "weather.api_key",
                "OpenWeatherMap key not configured - weather will be unavailable",
            );
        }
        if self.weather.google_api_key.is_empty() {
            result.add_warning(
                "weather.google_api_key",
                "Google key not configured - locations will be shown as coordinates",
            );
        }
        if self.sports.api_token.is_empty() {
            result.add_warning(
                "sports.api_token",
                "football-data token not configured - match lists will be empty",
            );
        }
        if self.auth.api_key.is_empty() {
            result.add_warning("auth.api_key", "Firebase key not configured - sign-in disabled");
        }

        if self.weather.cache_seconds == 0 {
            result.add_warning("weather.cache_seconds", "Weather caching disabled");
        } else if self.weather.cache_seconds > 86_400 {
            result.add_warning(
                "weather.cache_seconds",
                "Weather cache lifetime is more than 24 hours",
            );
        }

        if self.weather.country_hint.trim().is_empty() {
            result.add_warning(
                "weather.country_hint",
                "No country hint - searches may match places outside South Africa",
            );
        }

        if self.storage.data_dir.exists() && !self.storage.data_dir.is_dir() {
            result.add_error(
                "storage.data_dir",
                format!(
                    "Path is not a directory: {}",
                    self.storage.data_dir.display()
                ),
            );
        }

        result
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("saportal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
