//! Saudi Concierge - AI travel itineraries for visitors to Saudi Arabia
//!
//! This library assembles a traveler's questionnaire, live side-data
//! (currency conversion, weather) and static local datasets into an LLM
//! prompt, and relays the streamed itinerary to HTTP clients.

pub mod api;
pub mod car_rental;
pub mod config;
pub mod currency;
pub mod dining;
pub mod error;
pub mod guidance;
pub mod http_client;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use car_rental::{CarRental, CarTier};
pub use config::ConciergeConfig;
pub use currency::CurrencyConverter;
pub use dining::{Cuisine, Restaurant};
pub use error::{ConciergeError, ErrorCode};
pub use llm::{CompletionProvider, CompletionRequest, StreamEvent};
pub use models::{Lookup, TravelerProfile, WeatherSnapshot};
pub use prompt::PromptPair;
pub use relay::{Relay, RelayError, RelayState, RelayStream};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ConciergeError>;
