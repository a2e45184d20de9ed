//! Weather snapshot model and condition classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable weather condition label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Sunny,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
}

impl WeatherCondition {
    /// Classify a WMO weather code by fixed numeric ranges
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::PartlyCloudy,
            4..=48 => WeatherCondition::Foggy,
            49..=67 => WeatherCondition::Rainy,
            68..=77 => WeatherCondition::Snowy,
            78..=82 => WeatherCondition::Rainy,
            83..=86 => WeatherCondition::Snowy,
            _ => WeatherCondition::Stormy,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Foggy => "Foggy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Stormy => "Stormy",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conditions right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature: f32,
    pub condition: WeatherCondition,
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Display label, e.g. "Sat, Mar 1" or "Tomorrow"
    pub date: String,
    /// Daily high in Celsius
    pub high: f32,
    /// Daily low in Celsius
    pub low: f32,
    pub condition: WeatherCondition,
    /// Maximum precipitation probability (0-100%)
    pub precipitation: u8,
}

/// Current condition plus a short multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecast>,
    /// Rendered temperature chart for the forecast highs
    pub chart_url: String,
}

impl WeatherSnapshot {
    /// Format current conditions for prompts, e.g. "28°C, Sunny"
    #[must_use]
    pub fn format_current(&self) -> String {
        format!("{}°C, {}", self.current.temperature, self.current.condition)
    }
}
