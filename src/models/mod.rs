//! Data models for the concierge service
//!
//! This module contains the core domain models organized by concern:
//! - Profile: traveler questionnaire input and its option tables
//! - Weather: current conditions and short forecasts
//! - Lookup: provenance of values that may come from a static fallback

pub mod lookup;
pub mod profile;
pub mod weather;

// Re-export all public types for convenient access
pub use lookup::Lookup;
pub use profile::{Country, FoodPreference, Mobility, TravelerProfile};
pub use weather::{CurrentConditions, DailyForecast, WeatherCondition, WeatherSnapshot};
