//! Car-rental tiers and the tier recommendation rule

use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the total budget assumed to go to ground transport
pub const TRANSPORT_BUDGET_SHARE: f64 = 0.30;

/// Largest party that fits a regular car
pub const REGULAR_CAR_CAPACITY: u8 = 4;

/// Rental category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarTier {
    Economy,
    Compact,
    Midsize,
    Suv,
    Luxury,
}

/// Catalog entry for a rental tier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRental {
    pub tier: CarTier,
    #[serde(rename = "type")]
    pub name: &'static str,
    /// Daily rate in SAR
    pub daily_rate: u32,
    pub features: &'static [&'static str],
    pub image: &'static str,
}

pub const CAR_CATALOG: &[CarRental] = &[
    CarRental {
        tier: CarTier::Economy,
        name: "Economy Car",
        daily_rate: 154,
        features: &["Air Conditioning", "Manual Transmission", "4 Passengers", "Fuel Efficient"],
        image: "https://i.ibb.co/qkqTQMP/economy-car.jpg",
    },
    CarRental {
        tier: CarTier::Compact,
        name: "Compact Car",
        daily_rate: 189,
        features: &["Air Conditioning", "Automatic Transmission", "4 Passengers", "Bluetooth"],
        image: "https://i.ibb.co/9bM8QdV/compact-car.jpg",
    },
    CarRental {
        tier: CarTier::Midsize,
        name: "Midsize Car",
        daily_rate: 247,
        features: &["Air Conditioning", "Automatic Transmission", "5 Passengers", "GPS Navigation"],
        image: "https://i.ibb.co/LNvL1Qz/midsize-car.jpg",
    },
    CarRental {
        tier: CarTier::Suv,
        name: "SUV",
        daily_rate: 350,
        features: &["Air Conditioning", "Automatic Transmission", "7 Passengers", "GPS Navigation", "4WD"],
        image: "https://i.ibb.co/h7YtQmc/suv-car.jpg",
    },
    CarRental {
        tier: CarTier::Luxury,
        name: "Luxury Car",
        daily_rate: 520,
        features: &["Premium Interior", "Automatic Transmission", "4 Passengers", "GPS Navigation", "Premium Sound"],
        image: "https://i.ibb.co/2Y8QHx4/luxury-car.jpg",
    },
];

impl CarTier {
    /// Catalog entry for this tier
    #[must_use]
    pub fn rental(self) -> &'static CarRental {
        // CAR_CATALOG is declared in enum order
        &CAR_CATALOG[self as usize]
    }

    #[must_use]
    pub fn daily_rate(self) -> u32 {
        self.rental().daily_rate
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CarTier::Economy => "economy",
            CarTier::Compact => "compact",
            CarTier::Midsize => "midsize",
            CarTier::Suv => "suv",
            CarTier::Luxury => "luxury",
        }
    }
}

impl fmt::Display for CarTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily amount available for transport: 30% of the budget spread over the trip
#[must_use]
pub fn daily_transport_budget(total_budget: f64, trip_days: i64) -> f64 {
    total_budget * TRANSPORT_BUDGET_SHARE / trip_days.max(1) as f64
}

/// Pick a rental tier for a party, total budget (SAR) and trip length.
///
/// Small parties get the most expensive regular tier the daily transport
/// budget covers; larger parties get an SUV when affordable, else a midsize.
#[must_use]
pub fn recommend(party_size: u8, total_budget: f64, trip_days: i64) -> CarTier {
    tier_for_daily_budget(party_size, daily_transport_budget(total_budget, trip_days))
}

/// Tier decision on an already computed daily transport budget
#[must_use]
pub fn tier_for_daily_budget(party_size: u8, daily_budget: f64) -> CarTier {
    let affordable = |tier: CarTier| daily_budget >= f64::from(tier.daily_rate());

    if party_size <= REGULAR_CAR_CAPACITY {
        [CarTier::Luxury, CarTier::Midsize, CarTier::Compact]
            .into_iter()
            .find(|tier| affordable(*tier))
            .unwrap_or(CarTier::Economy)
    } else if affordable(CarTier::Suv) {
        CarTier::Suv
    } else {
        CarTier::Midsize
    }
}

/// Total rental cost in SAR for a number of days
#[must_use]
pub fn rental_cost(tier: CarTier, days: i64) -> u64 {
    u64::from(tier.daily_rate()) * days.max(0).unsigned_abs()
}
