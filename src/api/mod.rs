use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    ConciergeError, ErrorCode, VERSION,
    car_rental::{self, CAR_CATALOG, CarRental, CarTier},
    config::{ConciergeConfig, LlmConfig},
    currency::CurrencyConverter,
    dining::{RESTAURANTS, Restaurant, filter_restaurants},
    guidance::{TravelGuidance, travel_guidance},
    llm::{CompletionProvider, CompletionRequest, GroqClient},
    models::{
        FoodPreference, Mobility, TravelerProfile, WeatherSnapshot,
        profile::{COUNTRIES, Country, INTEREST_OPTIONS, MAX_PARTY_SIZE},
    },
    prompt::{self, PromptContext},
    relay::{Relay, RelayError},
    weather::WeatherService,
};

/// Response header naming where weather data came from
pub const DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

const MISSING_CREDENTIAL: &str = "GROQ_API_KEY is not configured";

/// Shared handler state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    /// Unset when no LLM credential is configured
    pub llm: Option<Arc<dyn CompletionProvider>>,
    pub llm_config: Arc<LlmConfig>,
    pub currency: Arc<CurrencyConverter>,
    pub weather: Arc<WeatherService>,
    pub default_city: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &ConciergeConfig) -> crate::Result<Self> {
        let llm = match &config.llm.api_key {
            Some(api_key) => {
                let client = GroqClient::new(api_key.clone(), &config.llm)
                    .map_err(|e| ConciergeError::config(e.to_string()))?;
                Some(Arc::new(client) as Arc<dyn CompletionProvider>)
            }
            None => None,
        };

        Ok(Self {
            llm,
            llm_config: Arc::new(config.llm.clone()),
            currency: Arc::new(CurrencyConverter::new(&config.currency)?),
            weather: Arc::new(WeatherService::new(&config.weather)?),
            default_city: Arc::from(config.weather.default_city.as_str()),
        })
    }
}

/// Error response body: `{"error": message, "code": code}`
pub struct ApiError(ConciergeError);

impl From<ConciergeError> for ApiError {
    fn from(err: ConciergeError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ConciergeError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ConciergeError::validation(rejection.body_text()))
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(ConciergeError::api(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = match code {
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::UpstreamFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ConfigInvalid | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(json!({ "error": self.0.user_message(), "code": code })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/compile", post(compile_itinerary))
        .route("/weather", get(get_weather))
        .route("/options", get(get_options))
        .route("/restaurants", get(get_restaurants))
        .route("/cars", get(get_cars))
        .route("/cars/recommendation", get(get_car_recommendation))
        .route("/guidance", get(get_guidance))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "llmConfigured": state.llm.is_some(),
    }))
}

/// Stream a generated itinerary for the submitted profile
#[instrument(skip_all)]
async fn compile_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<TravelerProfile>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Checked first so an unconfigured service makes no outbound calls
    let provider = state
        .llm
        .clone()
        .ok_or_else(|| ConciergeError::service_unavailable(MISSING_CREDENTIAL))?;

    let Json(profile) = payload?;
    profile.validate()?;
    info!(
        "Compiling itinerary: origin={} party={} dates={}..{}",
        profile.origin_country,
        profile.party_size,
        profile.start_date(),
        profile.end_date()
    );

    let (budget, weather) = tokio::join!(
        state
            .currency
            .convert_to_sar(profile.budget, profile.currency()),
        state.weather.forecast(&state.default_city)
    );
    info!(
        "Side data ready: budget {} SAR ({}), weather ({})",
        budget.value(),
        budget.source(),
        weather.source()
    );

    let budget_sar = *budget.value();
    let car = profile.want_car.then(|| {
        car_rental::recommend(profile.party_size, budget_sar, profile.trip_days()).rental()
    });
    let restaurants = filter_restaurants(profile.food_pref, RESTAURANTS);

    let prompts = prompt::assemble(
        &profile,
        &PromptContext {
            city: &state.default_city,
            budget_sar,
            weather: Some(weather.value()),
            car,
            restaurants: &restaurants,
        },
    );

    let stream = Relay::new(provider)
        .open(CompletionRequest::new(prompts, &state.llm_config))
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    city: Option<String>,
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ([(HeaderName, HeaderValue); 1], Json<WeatherSnapshot>) {
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .unwrap_or(state.default_city.as_ref());

    let lookup = state.weather.forecast(city).await;
    let source = HeaderValue::from_static(lookup.source());
    ([(DATA_SOURCE_HEADER, source)], Json(lookup.into_inner()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormOptions {
    countries: &'static [Country],
    interests: &'static [&'static str],
    food_preferences: [FoodPreference; 4],
    mobility: [Mobility; 3],
}

async fn get_options() -> Json<FormOptions> {
    Json(FormOptions {
        countries: COUNTRIES,
        interests: INTEREST_OPTIONS,
        food_preferences: FoodPreference::ALL,
        mobility: Mobility::ALL,
    })
}

#[derive(Debug, Deserialize)]
struct RestaurantQuery {
    food_pref: Option<FoodPreference>,
}

async fn get_restaurants(
    query: Result<Query<RestaurantQuery>, QueryRejection>,
) -> Result<Json<Vec<&'static Restaurant>>, ApiError> {
    let Query(query) = query?;
    let preference = query.food_pref.unwrap_or(FoodPreference::NoRestrictions);
    Ok(Json(filter_restaurants(preference, RESTAURANTS)))
}

async fn get_cars() -> Json<&'static [CarRental]> {
    Json(CAR_CATALOG)
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    party_size: u8,
    /// Total budget in SAR
    budget: f64,
    days: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Recommendation {
    tier: CarTier,
    car: &'static CarRental,
    days: i64,
    total_cost: u64,
}

async fn get_car_recommendation(
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<Recommendation>, ApiError> {
    let Query(query) = query?;
    if !(1..=MAX_PARTY_SIZE).contains(&query.party_size) {
        return Err(ConciergeError::validation(format!(
            "Party size must be between 1 and {MAX_PARTY_SIZE}"
        ))
        .into());
    }
    if !query.budget.is_finite() || query.budget < 0.0 {
        return Err(ConciergeError::validation("Budget must be a non-negative amount").into());
    }
    if query.days < 1 {
        return Err(ConciergeError::validation("Trip must last at least one day").into());
    }

    let tier = car_rental::recommend(query.party_size, query.budget, query.days);
    Ok(Json(Recommendation {
        tier,
        car: tier.rental(),
        days: query.days,
        total_cost: car_rental::rental_cost(tier, query.days),
    }))
}

async fn get_guidance() -> Json<TravelGuidance> {
    Json(travel_guidance())
}
