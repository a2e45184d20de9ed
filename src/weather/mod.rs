//! Weather lookup for a destination city
//!
//! Resolves the city via geocoding, fetches a short forecast and turns it
//! into a [`WeatherSnapshot`]. Any failure along the way yields a fixed
//! illustrative forecast so callers always receive something usable.

use chrono::NaiveDate;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::ConciergeError;
use crate::config::WeatherConfig;
use crate::models::{CurrentConditions, DailyForecast, Lookup, WeatherCondition, WeatherSnapshot};

pub mod open_meteo;

use open_meteo::{ForecastResponse, OpenMeteoClient};

/// Number of forecast days kept in a snapshot
pub const SNAPSHOT_DAYS: usize = 5;

const CHART_BASE_URL: &str = "https://quickchart.io/chart";
const CHART_COLOR: &str = "#006C35";
const CHART_FILL: &str = "rgba(0, 108, 53, 0.1)";

pub struct WeatherService {
    client: OpenMeteoClient,
}

impl WeatherService {
    pub fn new(config: &WeatherConfig) -> crate::Result<Self> {
        Ok(Self {
            client: OpenMeteoClient::new(config)?,
        })
    }

    /// Current conditions and forecast for `city`; never fails
    #[instrument(skip(self))]
    pub async fn forecast(&self, city: &str) -> Lookup<WeatherSnapshot> {
        match self.fetch_live(city).await {
            Ok(snapshot) => {
                info!(
                    "Weather for {}: {} with {} forecast days",
                    city,
                    snapshot.format_current(),
                    snapshot.forecast.len()
                );
                Lookup::Live(snapshot)
            }
            Err(e) => {
                warn!("Weather fetch error for {}, using fallback forecast: {}", city, e);
                Lookup::Fallback(fallback_snapshot(city))
            }
        }
    }

    async fn fetch_live(&self, city: &str) -> crate::Result<WeatherSnapshot> {
        let location = self.client.geocode(city).await?;
        let response = self
            .client
            .forecast(location.latitude, location.longitude)
            .await?;
        build_snapshot(city, &response)
    }
}

/// Convert a forecast response into a snapshot of the first few days
pub fn build_snapshot(city: &str, response: &ForecastResponse) -> crate::Result<WeatherSnapshot> {
    let daily = &response.daily;
    let days = daily.time.len().min(SNAPSHOT_DAYS);
    if days == 0 {
        return Err(ConciergeError::api("Forecast response contains no days"));
    }

    let mut forecast = Vec::with_capacity(days);
    let mut chart_labels = Vec::with_capacity(days);
    for (i, raw_date) in daily.time.iter().take(days).enumerate() {
        let high = daily
            .temperature_max
            .get(i)
            .copied()
            .flatten()
            .ok_or_else(|| ConciergeError::api(format!("Missing daily high for {raw_date}")))?;
        let low = daily
            .temperature_min
            .get(i)
            .copied()
            .flatten()
            .ok_or_else(|| ConciergeError::api(format!("Missing daily low for {raw_date}")))?;
        let precipitation = daily
            .precipitation_probability
            .get(i)
            .copied()
            .flatten()
            .map_or(0, |p| p.clamp(0.0, 100.0).round() as u8);
        let condition = daily
            .weather_code
            .get(i)
            .copied()
            .flatten()
            .map_or(WeatherCondition::Sunny, WeatherCondition::from_code);

        let (label, chart_label) = match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
            Ok(date) => (
                date.format("%a, %b %-d").to_string(),
                date.format("%b %-d").to_string(),
            ),
            Err(_) => (raw_date.clone(), raw_date.clone()),
        };
        chart_labels.push(chart_label);

        forecast.push(DailyForecast {
            date: label,
            high,
            low,
            condition,
            precipitation,
        });
    }

    let highs: Vec<f32> = forecast.iter().map(|day| day.high).collect();
    Ok(WeatherSnapshot {
        current: CurrentConditions {
            temperature: response.current_weather.temperature,
            condition: WeatherCondition::from_code(response.current_weather.weather_code),
        },
        chart_url: chart_url(city, &chart_labels, &highs),
        forecast,
    })
}

/// Fixed illustrative forecast used whenever the live lookup fails
#[must_use]
pub fn fallback_snapshot(city: &str) -> WeatherSnapshot {
    let day = |date: &str, high: f32, low: f32, condition, precipitation| DailyForecast {
        date: date.to_string(),
        high,
        low,
        condition,
        precipitation,
    };
    let forecast = vec![
        day("Today", 32.0, 22.0, WeatherCondition::Sunny, 0),
        day("Tomorrow", 30.0, 20.0, WeatherCondition::PartlyCloudy, 10),
        day("Day 3", 33.0, 24.0, WeatherCondition::Sunny, 0),
        day("Day 4", 31.0, 21.0, WeatherCondition::Sunny, 5),
        day("Day 5", 29.0, 19.0, WeatherCondition::Cloudy, 20),
    ];

    let labels: Vec<String> = forecast.iter().map(|d| d.date.clone()).collect();
    let highs: Vec<f32> = forecast.iter().map(|d| d.high).collect();

    WeatherSnapshot {
        current: CurrentConditions {
            temperature: 28.0,
            condition: WeatherCondition::Sunny,
        },
        chart_url: chart_url(city, &labels, &highs),
        forecast,
    }
}

/// Quickchart line chart of daily highs
#[must_use]
pub fn chart_url(city: &str, labels: &[String], highs: &[f32]) -> String {
    let chart = json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Temperature (°C)",
                "data": highs,
                "borderColor": CHART_COLOR,
                "backgroundColor": CHART_FILL,
                "tension": 0.4
            }]
        },
        "options": {
            "responsive": true,
            "plugins": {
                "title": { "display": true, "text": format!("{city} Weather Forecast") }
            },
            "scales": {
                "y": {
                    "beginAtZero": false,
                    "title": { "display": true, "text": "Temperature (°C)" }
                }
            }
        }
    });

    format!(
        "{}?c={}&width=400&height=200",
        CHART_BASE_URL,
        urlencoding::encode(&chart.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::Value;

    fn service(server: &MockServer) -> WeatherService {
        WeatherService::new(&WeatherConfig {
            geocoding_url: server.url("/v1/search"),
            forecast_url: server.url("/v1/forecast"),
            timeout_seconds: 5,
            max_retries: 0,
            ..WeatherConfig::default()
        })
        .unwrap()
    }

    fn forecast_body() -> Value {
        json!({
            "current_weather": { "temperature": 31.4, "weathercode": 2 },
            "daily": {
                "time": ["2025-03-01", "2025-03-02", "2025-03-03", "2025-03-04", "2025-03-05", "2025-03-06", "2025-03-07"],
                "temperature_2m_max": [30.1, 31.0, 32.5, 29.9, 28.0, 27.0, 26.0],
                "temperature_2m_min": [18.0, 19.5, 20.0, 17.2, 16.0, 15.0, 14.0],
                "precipitation_probability_max": [0, 10, null, 40, 5, 0, 0],
                "weathercode": [0, 3, 61, null, 95, 0, 0]
            }
        })
    }

    fn chart_config(url: &str) -> Value {
        let encoded = url
            .strip_prefix("https://quickchart.io/chart?c=")
            .and_then(|rest| rest.split('&').next())
            .unwrap();
        serde_json::from_str(&urlencoding::decode(encoded).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_live_forecast() {
        let server = MockServer::start_async().await;
        let geocode = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/search").query_param("name", "Riyadh");
                then.status(200).json_body(json!({
                    "results": [{ "name": "Riyadh", "latitude": 24.6877, "longitude": 46.7219, "country": "Saudi Arabia" }]
                }));
            })
            .await;
        let forecast = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/forecast")
                    .query_param("latitude", "24.6877")
                    .query_param("longitude", "46.7219")
                    .query_param("current_weather", "true")
                    .query_param("timezone", "Asia/Riyadh");
                then.status(200).json_body(forecast_body());
            })
            .await;

        let snapshot = service(&server).forecast("Riyadh").await;

        geocode.assert_async().await;
        forecast.assert_async().await;
        assert!(!snapshot.is_fallback());

        let snapshot = snapshot.into_inner();
        assert_eq!(snapshot.current.temperature, 31.4);
        assert_eq!(snapshot.current.condition, WeatherCondition::PartlyCloudy);
        assert_eq!(snapshot.forecast.len(), SNAPSHOT_DAYS);
        assert_eq!(snapshot.forecast[0].date, "Sat, Mar 1");
        assert_eq!(snapshot.forecast[0].condition, WeatherCondition::Clear);
        assert_eq!(snapshot.forecast[2].condition, WeatherCondition::Rainy);
        assert_eq!(snapshot.forecast[2].precipitation, 0);
        assert_eq!(snapshot.forecast[3].condition, WeatherCondition::Sunny);
        assert_eq!(snapshot.forecast[3].precipitation, 40);
        assert_eq!(snapshot.forecast[4].condition, WeatherCondition::Stormy);

        let chart = chart_config(&snapshot.chart_url);
        assert_eq!(chart["data"]["labels"][0], "Mar 1");
        assert_eq!(chart["data"]["datasets"][0]["data"].as_array().unwrap().len(), 5);
        assert_eq!(chart["options"]["plugins"]["title"]["text"], "Riyadh Weather Forecast");
    }

    #[tokio::test]
    async fn test_unknown_city_returns_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/search");
                then.status(200).json_body(json!({ "generationtime_ms": 0.5 }));
            })
            .await;
        let forecast = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/forecast");
                then.status(200).json_body(forecast_body());
            })
            .await;

        let snapshot = service(&server).forecast("Atlantis").await;

        assert_eq!(forecast.hits_async().await, 0);
        assert!(snapshot.is_fallback());
        let snapshot = snapshot.into_inner();
        assert_eq!(snapshot.current.temperature, 28.0);
        assert_eq!(snapshot.current.condition, WeatherCondition::Sunny);
        assert_eq!(snapshot.forecast.len(), 5);
        assert_eq!(snapshot, fallback_snapshot("Atlantis"));
    }

    #[tokio::test]
    async fn test_forecast_error_returns_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/search");
                then.status(200).json_body(json!({
                    "results": [{ "name": "Jeddah", "latitude": 21.5, "longitude": 39.2 }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/forecast");
                then.status(503);
            })
            .await;

        let snapshot = service(&server).forecast("Jeddah").await;
        assert!(snapshot.is_fallback());
    }

    #[test]
    fn test_fallback_snapshot_contents() {
        let snapshot = fallback_snapshot("Riyadh");
        let dates: Vec<&str> = snapshot.forecast.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["Today", "Tomorrow", "Day 3", "Day 4", "Day 5"]);
        assert_eq!(snapshot.forecast[1].condition, WeatherCondition::PartlyCloudy);
        assert_eq!(snapshot.forecast[4].condition, WeatherCondition::Cloudy);
        assert_eq!(snapshot.forecast[4].precipitation, 20);

        let chart = chart_config(&snapshot.chart_url);
        assert_eq!(chart["data"]["datasets"][0]["data"], json!([32.0, 30.0, 33.0, 31.0, 29.0]));
    }

    #[test]
    fn test_snapshot_requires_days() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "current_weather": { "temperature": 20.0, "weathercode": 0 },
            "daily": { "time": [], "temperature_2m_max": [], "temperature_2m_min": [] }
        }))
        .unwrap();
        assert!(build_snapshot("Abha", &response).is_err());
    }
}
