//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Hazard pipeline settings.
    #[serde(default)]
    pub hazards: HazardsConfig,

    /// OpenWeather settings (weather endpoints, rain heuristic, risk
    /// predictor).
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Google Maps settings (route and places endpoints).
    #[serde(default)]
    pub maps: MapsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Hazard pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HazardsConfig {
    /// How long a merged event set stays fresh, in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Minimum seismic magnitude worth including.
    #[serde(default = "default_min_quake_magnitude")]
    pub min_quake_magnitude: f64,

    /// GDACS event-list endpoint.
    #[serde(default = "default_gdacs_url")]
    pub gdacs_url: String,

    /// USGS last-24h GeoJSON feed.
    #[serde(default = "default_usgs_url")]
    pub usgs_url: String,
}

/// OpenWeather configuration. An empty API key disables the weather-derived
/// hazard feed and the risk augmenter; the weather endpoints then answer
/// from sample data.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,

    /// API root, overridable for tests.
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Google Maps configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MapsConfig {
    #[serde(default)]
    pub api_key: String,

    /// API root, overridable for tests.
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "safar_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_ttl_seconds() -> u64 {
    120
}

fn default_min_quake_magnitude() -> f64 {
    1.0
}

fn default_gdacs_url() -> String {
    safar_hazards::gdacs::DEFAULT_URL.to_string()
}

fn default_usgs_url() -> String {
    safar_hazards::usgs::DEFAULT_URL.to_string()
}

fn default_weather_base_url() -> String {
    safar_travel::weather::DEFAULT_BASE_URL.to_string()
}

fn default_maps_base_url() -> String {
    safar_travel::maps::DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HazardsConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            min_quake_magnitude: default_min_quake_magnitude(),
            gdacs_url: default_gdacs_url(),
            usgs_url: default_usgs_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_maps_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SAFAR_HOST` overrides `server.host`
/// - `SAFAR_PORT` overrides `server.port`
/// - `SAFAR_TTL_SECONDS` overrides `hazards.ttl_seconds`
/// - `SAFAR_OPENWEATHER_KEY` overrides `weather.api_key`
/// - `SAFAR_MAPS_KEY` overrides `maps.api_key`
/// - `SAFAR_LOG_LEVEL` overrides `logging.level`
/// - `SAFAR_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("SAFAR_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("SAFAR_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(ttl) = std::env::var("SAFAR_TTL_SECONDS") {
        if let Ok(parsed) = ttl.parse() {
            config.hazards.ttl_seconds = parsed;
        }
    }
    if let Ok(key) = std::env::var("SAFAR_OPENWEATHER_KEY") {
        config.weather.api_key = key;
    }
    if let Ok(key) = std::env::var("SAFAR_MAPS_KEY") {
        config.maps.api_key = key;
    }
    if let Ok(level) = std::env::var("SAFAR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("SAFAR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.hazards.ttl_seconds, 120);
        assert_eq!(config.hazards.min_quake_magnitude, 1.0);
        assert!(config.weather.api_key.is_empty());
        assert!(!config.logging.json);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [hazards]
            ttl_seconds = 30

            [weather]
            api_key = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.hazards.ttl_seconds, 30);
        assert_eq!(config.weather.api_key, "k");
        assert_eq!(config.server.port, 8000);
        assert!(config.hazards.gdacs_url.contains("gdacs.org"));
    }
}
