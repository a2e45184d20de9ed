//! Traveler profile submitted by the questionnaire form

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::ConciergeError;

/// Smallest accepted budget, in origin currency
pub const MIN_BUDGET: f64 = 100.0;
/// Largest accepted party
pub const MAX_PARTY_SIZE: u8 = 10;

/// Dietary preference selected on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodPreference {
    Halal,
    Vegetarian,
    Vegan,
    NoRestrictions,
}

impl FoodPreference {
    pub const ALL: [FoodPreference; 4] = [
        FoodPreference::Halal,
        FoodPreference::Vegetarian,
        FoodPreference::Vegan,
        FoodPreference::NoRestrictions,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FoodPreference::Halal => "halal",
            FoodPreference::Vegetarian => "vegetarian",
            FoodPreference::Vegan => "vegan",
            FoodPreference::NoRestrictions => "no-restrictions",
        }
    }
}

impl fmt::Display for FoodPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mobility requirement selected on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mobility {
    Full,
    Limited,
    Wheelchair,
}

impl Mobility {
    pub const ALL: [Mobility; 3] = [Mobility::Full, Mobility::Limited, Mobility::Wheelchair];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mobility::Full => "full",
            Mobility::Limited => "limited",
            Mobility::Wheelchair => "wheelchair",
        }
    }
}

impl fmt::Display for Mobility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported origin country
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
}

pub const COUNTRIES: &[Country] = &[
    Country { code: "US", name: "United States", currency: "USD" },
    Country { code: "GB", name: "United Kingdom", currency: "GBP" },
    Country { code: "DE", name: "Germany", currency: "EUR" },
    Country { code: "FR", name: "France", currency: "EUR" },
    Country { code: "JP", name: "Japan", currency: "JPY" },
    Country { code: "CN", name: "China", currency: "CNY" },
    Country { code: "IN", name: "India", currency: "INR" },
    Country { code: "AE", name: "UAE", currency: "AED" },
    Country { code: "EG", name: "Egypt", currency: "EGP" },
    Country { code: "AU", name: "Australia", currency: "AUD" },
];

pub const INTEREST_OPTIONS: &[&str] = &[
    "Historical Sites",
    "Modern Architecture",
    "Desert Adventures",
    "Shopping",
    "Cultural Experiences",
    "Food & Dining",
    "Entertainment",
    "Religious Tourism",
    "Nature & Wildlife",
    "Adventure Sports",
];

impl Country {
    /// Look up a country by ISO alpha-2 code, case-insensitively
    #[must_use]
    pub fn find(code: &str) -> Option<&'static Country> {
        COUNTRIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }
}

/// One planning session's worth of traveler input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerProfile {
    /// ISO 3166-1 alpha-2 code of the origin country
    pub origin_country: String,
    /// Inclusive start and end of the trip
    #[serde(deserialize_with = "deserialize_travel_dates")]
    pub travel_dates: (NaiveDate, NaiveDate),
    pub party_size: u8,
    /// Total budget in the origin country's currency
    pub budget: f64,
    pub interests: Vec<String>,
    pub want_car: bool,
    pub food_pref: FoodPreference,
    pub mobility: Mobility,
}

impl TravelerProfile {
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.travel_dates.0
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.travel_dates.1
    }

    /// Trip length as `ceil((end - start) / 1 day)`
    #[must_use]
    pub fn trip_days(&self) -> i64 {
        (self.end_date() - self.start_date()).num_days()
    }

    #[must_use]
    pub fn country(&self) -> Option<&'static Country> {
        Country::find(&self.origin_country)
    }

    /// Currency the budget is expressed in; USD when the country is unknown
    #[must_use]
    pub fn currency(&self) -> &'static str {
        self.country().map_or("USD", |c| c.currency)
    }

    /// Reject input that the form should never have produced
    pub fn validate(&self) -> crate::Result<()> {
        if self.origin_country.len() != 2 || !self.origin_country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConciergeError::validation("Please select your country"));
        }
        if self.end_date() < self.start_date() {
            return Err(ConciergeError::validation("End date must not be before start date"));
        }
        if !(1..=MAX_PARTY_SIZE).contains(&self.party_size) {
            return Err(ConciergeError::validation(format!(
                "Party size must be between 1 and {MAX_PARTY_SIZE}"
            )));
        }
        if !self.budget.is_finite() || self.budget < MIN_BUDGET {
            return Err(ConciergeError::validation(format!(
                "Minimum budget is {MIN_BUDGET}"
            )));
        }
        if self.interests.iter().all(|i| i.trim().is_empty()) {
            return Err(ConciergeError::validation("Select at least one interest"));
        }
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp for each date
fn deserialize_travel_dates<'de, D>(deserializer: D) -> Result<(NaiveDate, NaiveDate), D::Error>
where
    D: Deserializer<'de>,
{
    let (start, end) = <(String, String)>::deserialize(deserializer)?;
    Ok((
        parse_travel_date(&start).map_err(serde::de::Error::custom)?,
        parse_travel_date(&end).map_err(serde::de::Error::custom)?,
    ))
}

fn parse_travel_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid travel date '{raw}'"))
}
