//! Prompt assembly for the itinerary request

use chrono::NaiveDate;

use crate::car_rental::CarRental;
use crate::currency::format_sar;
use crate::dining::Restaurant;
use crate::models::{TravelerProfile, WeatherSnapshot};

/// Restaurants named in the user prompt at most
pub const MAX_PROMPT_RESTAURANTS: usize = 5;

const SYSTEM_PROMPT: &str = "You are an elite Saudi travel planner with deep knowledge of Saudi Arabia's culture, attractions, logistics, and current tourism offerings. Create a detailed, day-by-day itinerary that showcases the best of Saudi Arabia while respecting cultural norms and the user's specific preferences.

Key Requirements:
- Provide specific, actionable recommendations with real locations and activities
- Include cultural context and respectful travel advice
- Suggest optimal timing for activities considering prayer times and local customs
- Balance must-see attractions with hidden gems
- Consider seasonal weather and regional differences
- Provide practical logistics information (transportation, booking tips, etc.)
- Include cost estimates in Saudi Riyals (SAR)
- Respect dietary restrictions and accessibility needs
- Highlight unique Saudi experiences that showcase Vision 2030 developments

Format your response as a detailed itinerary with:
1. Day-by-day schedule with specific activities and timings
2. Detailed descriptions of attractions and experiences
3. Practical tips for each activity
4. Cost estimates where relevant
5. Transportation recommendations
6. Cultural insights and etiquette reminders";

const DEFAULT_WEATHER: &str = "Mild and sunny";
const NO_CAR: &str = "Public transport and ride-sharing";

/// System and user messages for one completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Side-data gathered for a profile before prompting
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// City the weather refers to
    pub city: &'a str,
    pub budget_sar: f64,
    pub weather: Option<&'a WeatherSnapshot>,
    pub car: Option<&'a CarRental>,
    pub restaurants: &'a [&'a Restaurant],
}

#[must_use]
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Build both prompts from the profile and its side-data
#[must_use]
pub fn assemble(profile: &TravelerProfile, context: &PromptContext<'_>) -> PromptPair {
    PromptPair {
        system: SYSTEM_PROMPT.to_string(),
        user: user_prompt(profile, context),
    }
}

fn user_prompt(profile: &TravelerProfile, context: &PromptContext<'_>) -> String {
    let origin = profile.country().map_or("Unknown", |c| c.name);
    let weather = context
        .weather
        .map_or_else(|| DEFAULT_WEATHER.to_string(), WeatherSnapshot::format_current);
    let restaurants = context
        .restaurants
        .iter()
        .take(MAX_PROMPT_RESTAURANTS)
        .map(|r| r.name)
        .collect::<Vec<_>>()
        .join(", ");
    let car = context.car.map_or_else(
        || NO_CAR.to_string(),
        |car| format!("{} at {} SAR/day", car.name, car.daily_rate),
    );

    format!(
        "Create a personalized Saudi Arabia itinerary with these details:

TRAVELER PROFILE:
- Origin: {origin} ({party} travelers)
- Travel Dates: {start} to {end} ({days} days)
- Budget: {budget} total
- Interests: {interests}
- Food Preference: {food}
- Car Rental: {want_car}
- Mobility: {mobility}

ADDITIONAL CONTEXT:
- Current weather in {city}: {weather}
- Recommended restaurants available: {restaurants}
- Car rental option: {car}

Please create a comprehensive itinerary that maximizes their experience while staying within budget and respecting all cultural considerations.",
        party = profile.party_size,
        start = format_date(profile.start_date()),
        end = format_date(profile.end_date()),
        days = profile.trip_days(),
        budget = format_sar(context.budget_sar),
        city = context.city,
        interests = profile.interests.join(", "),
        food = profile.food_pref,
        want_car = if profile.want_car { "Yes" } else { "No" },
        mobility = profile.mobility,
    )
}

/// Long-form date, e.g. "March 1, 2025"
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car_rental::CarTier;
    use crate::dining::{RESTAURANTS, filter_restaurants};
    use crate::models::profile::tests::sample_profile;
    use crate::models::FoodPreference;
    use crate::weather::fallback_snapshot;

    #[test]
    fn test_full_context() {
        let profile = sample_profile();
        let weather = fallback_snapshot("Riyadh");
        let restaurants = filter_restaurants(FoodPreference::Halal, RESTAURANTS);
        let context = PromptContext {
            city: "Riyadh",
            budget_sar: 7500.0,
            weather: Some(&weather),
            car: Some(CarTier::Compact.rental()),
            restaurants: &restaurants,
        };

        let prompts = assemble(&profile, &context);
        assert_eq!(prompts.system, system_prompt());
        assert!(prompts.system.starts_with("You are an elite Saudi travel planner"));

        let user = &prompts.user;
        assert!(user.contains("- Origin: United States (2 travelers)"));
        assert!(user.contains("- Travel Dates: March 1, 2025 to March 6, 2025 (5 days)"));
        assert!(user.contains("- Budget: 7,500 SAR total"));
        assert!(user.contains("- Interests: Historical Sites, Food & Dining"));
        assert!(user.contains("- Food Preference: halal"));
        assert!(user.contains("- Car Rental: Yes"));
        assert!(user.contains("- Mobility: full"));
        assert!(user.contains("- Current weather in Riyadh: 28°C, Sunny"));
        assert!(user.contains(
            "- Recommended restaurants available: Najd Village, Al Romansiah, Em Sherif, The Globe, Al Baik\n"
        ));
        assert!(user.contains("- Car rental option: Compact Car at 189 SAR/day"));
    }

    #[test]
    fn test_missing_side_data_defaults() {
        let mut profile = sample_profile();
        profile.want_car = false;
        profile.origin_country = "BR".to_string();
        let context = PromptContext {
            city: "Jeddah",
            budget_sar: 375.0,
            weather: None,
            car: None,
            restaurants: &[],
        };

        let user = assemble(&profile, &context).user;
        assert!(user.contains("- Origin: Unknown (2 travelers)"));
        assert!(user.contains("- Car Rental: No"));
        assert!(user.contains("- Current weather in Jeddah: Mild and sunny"));
        assert!(user.contains("- Budget: 375 SAR total"));
        assert!(user.contains("- Car rental option: Public transport and ride-sharing"));
        assert!(user.contains("- Recommended restaurants available: \n"));
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        assert_eq!(format_date(date), "December 25, 2025");
    }
}
