//! Configuration management for the concierge service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ConciergeError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the concierge service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConciergeConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM completion service settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Currency-rate service settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Geocoding and forecast API settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with a pre-built front end, served for unknown paths
    #[serde(default)]
    pub static_dir: Option<String>,
    /// PEM certificate, enables TLS together with `tls_key`
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,
    #[serde(default)]
    pub tls_key: Option<PathBuf>,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// LLM completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; the itinerary endpoint reports 503 while this is unset
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    /// Timeout for establishing the streaming request, in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
}

/// Currency-rate service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Conversion endpoint; the static rate table is used while unset
    #[serde(default)]
    pub exchange_url: Option<String>,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_lookup_max_retries")]
    pub max_retries: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// City used for the itinerary prompt and the weather endpoint default
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_lookup_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; traces are exported only when set
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    4000
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_lookup_timeout() -> u32 {
    10
}

fn default_lookup_max_retries() -> u32 {
    2
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timezone() -> String {
    "Asia/Riyadh".to_string()
}

fn default_forecast_days() -> u32 {
    7
}

fn default_city() -> String {
    "Riyadh".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            tls_cert: None,
            tls_key: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            exchange_url: None,
            timeout_seconds: default_lookup_timeout(),
            max_retries: default_lookup_max_retries(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timezone: default_timezone(),
            forecast_days: default_forecast_days(),
            default_city: default_city(),
            timeout_seconds: default_lookup_timeout(),
            max_retries: default_lookup_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            currency: CurrencyConfig::default(),
            weather: WeatherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ConciergeConfig {
    /// Load configuration from a file (or the default location) and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // CONCIERGE__LLM__MODEL=... overrides llm.model
        builder = builder.add_source(
            Environment::with_prefix("CONCIERGE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ConciergeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_credentials();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("saudi-concierge").join("config.toml"))
    }

    /// Fill unset credentials from the conventional provider variables
    pub fn apply_env_credentials(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        if self.currency.exchange_url.is_none() {
            self.currency.exchange_url = std::env::var("EXCHANGE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.max_tokens == 0 {
            self.llm.max_tokens = default_llm_max_tokens();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.currency.timeout_seconds == 0 {
            self.currency.timeout_seconds = default_lookup_timeout();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_lookup_timeout();
        }
        if self.weather.forecast_days == 0 {
            self.weather.forecast_days = default_forecast_days();
        }
        if self.weather.default_city.trim().is_empty() {
            self.weather.default_city = default_city();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // A missing key is allowed; the itinerary endpoint answers 503 instead
        if let Some(api_key) = &self.llm.api_key {
            if api_key.trim().is_empty() {
                return Err(ConciergeError::config(
                    "LLM API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(ConciergeError::config(
                    "LLM API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConciergeError::config("LLM temperature must be between 0.0 and 2.0").into());
        }

        if self.llm.max_tokens > 32_768 {
            return Err(ConciergeError::config("LLM max tokens cannot exceed 32768").into());
        }

        if self.llm.timeout_seconds > 300 {
            return Err(ConciergeError::config("LLM timeout cannot exceed 300 seconds").into());
        }

        if self.currency.timeout_seconds > 120 || self.weather.timeout_seconds > 120 {
            return Err(ConciergeError::config("Lookup timeout cannot exceed 120 seconds").into());
        }

        if self.currency.max_retries > 10 || self.weather.max_retries > 10 {
            return Err(ConciergeError::config("Lookup max retries cannot exceed 10").into());
        }

        if !(5..=16).contains(&self.weather.forecast_days) {
            return Err(ConciergeError::config("Forecast days must be between 5 and 16").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ConciergeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ConciergeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("LLM base URL", Some(&self.llm.base_url)),
            ("Geocoding URL", Some(&self.weather.geocoding_url)),
            ("Forecast URL", Some(&self.weather.forecast_url)),
            ("Exchange URL", self.currency.exchange_url.as_ref()),
            ("OTLP endpoint", self.logging.otlp_endpoint.as_ref()),
        ];
        for (name, url) in urls {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConciergeError::config(format!(
                        "{name} must be a valid HTTP or HTTPS URL"
                    ))
                    .into());
                }
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(ConciergeError::config(
                "TLS requires both server.tls_cert and server.tls_key",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = ConciergeConfig::default();
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm.max_tokens, 4000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.weather.default_city, "Riyadh");
        assert_eq!(config.weather.timezone, "Asia/Riyadh");
        assert_eq!(config.logging.level, "info");
        assert!(config.llm.api_key.is_none());
        assert!(config.currency.exchange_url.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConciergeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = ConciergeConfig::default();
        config.llm.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = ConciergeConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_temperature_range() {
        let mut config = ConciergeConfig::default();
        config.llm.temperature = 3.5;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("temperature"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = ConciergeConfig::default();
        config.currency.exchange_url = Some("ftp://rates.example".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Exchange URL"));
    }

    #[test]
    fn test_config_validation_tls_pair() {
        let mut config = ConciergeConfig::default();
        config.server.tls_cert = Some(PathBuf::from("cert.pem"));
        assert!(config.validate().is_err());
        config.server.tls_key = Some(PathBuf::from("key.pem"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = ConciergeConfig::default();
        config.llm.model = String::new();
        config.weather.default_city = "  ".to_string();
        config.apply_defaults();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.weather.default_city, "Riyadh");
    }

    #[test]
    fn test_groq_key_from_environment() {
        // SAFETY: Test environment, setting test values only
        unsafe {
            env::set_var("GROQ_API_KEY", "gsk_test_key_from_env");
        }

        let mut config = ConciergeConfig::default();
        config.apply_env_credentials();

        // SAFETY: Test cleanup
        unsafe {
            env::remove_var("GROQ_API_KEY");
        }

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_test_key_from_env"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = ConciergeConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("saudi-concierge"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
