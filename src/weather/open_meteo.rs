//! `OpenMeteo` geocoding and forecast API client

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::ConciergeError;
use crate::config::WeatherConfig;
use crate::http_client::lookup_client;

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

/// Forecast response from `OpenMeteo` with `current_weather=true`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeather,
    pub daily: DailyData,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f32,
    #[serde(rename = "weathercode")]
    pub weather_code: u16,
}

/// Daily weather data from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<Option<f32>>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<Option<f32>>,
    #[serde(rename = "precipitation_probability_max", default)]
    pub precipitation_probability: Vec<Option<f32>>,
    #[serde(rename = "weathercode", default)]
    pub weather_code: Vec<Option<u16>>,
}

/// Thin client over the two `OpenMeteo` endpoints
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    geocoding_url: String,
    forecast_url: String,
    timezone: String,
    forecast_days: u32,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        Ok(Self {
            client: lookup_client(config.timeout_seconds, config.max_retries)?,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            timezone: config.timezone.clone(),
            forecast_days: config.forecast_days,
        })
    }

    /// Resolve a city name to its best geocoding match
    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> crate::Result<GeocodingResult> {
        let url = format!(
            "{}?name={}&count=1&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(city)
        );
        debug!("OpenMeteo geocoding request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ConciergeError::api(format!(
                "Geocoding API error: {}",
                response.status()
            )));
        }

        let geocoding: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| ConciergeError::api(format!("Failed to parse geocoding response: {e}")))?;

        geocoding
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ConciergeError::not_found(format!("City not found: {city}")))
    }

    /// Fetch current weather and the daily forecast for coordinates
    #[instrument(skip(self))]
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> crate::Result<ForecastResponse> {
        let url = format!(
            "{}?latitude={}&longitude={}&current_weather=true&daily=temperature_2m_max,temperature_2m_min,precipitation_probability_max,weathercode&timezone={}&forecast_days={}",
            self.forecast_url,
            latitude,
            longitude,
            urlencoding::encode(&self.timezone),
            self.forecast_days
        );
        debug!("OpenMeteo forecast request URL: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ConciergeError::api(format!(
                "Forecast API error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ConciergeError::api(format!("Failed to parse forecast response: {e}")))
    }
}
