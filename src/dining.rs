//! Restaurant catalog and dietary filtering

use serde::Serialize;
use std::fmt;

use crate::models::FoodPreference;

/// Cuisine tag of a catalog restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cuisine {
    #[serde(rename = "Traditional Saudi")]
    TraditionalSaudi,
    Lebanese,
    International,
    Seafood,
    Indian,
    Italian,
    Japanese,
}

impl Cuisine {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Cuisine::TraditionalSaudi => "Traditional Saudi",
            Cuisine::Lebanese => "Lebanese",
            Cuisine::International => "International",
            Cuisine::Seafood => "Seafood",
            Cuisine::Indian => "Indian",
            Cuisine::Italian => "Italian",
            Cuisine::Japanese => "Japanese",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: u32,
    pub name: &'static str,
    pub city: &'static str,
    pub cuisine: Cuisine,
    pub rating: f32,
    /// Average spend per person in SAR
    pub price_per_person: u32,
    /// Signature dish
    pub signature: &'static str,
}

pub const RESTAURANTS: &[Restaurant] = &[
    Restaurant {
        id: 1,
        name: "Najd Village",
        city: "Riyadh",
        cuisine: Cuisine::TraditionalSaudi,
        rating: 4.6,
        price_per_person: 120,
        signature: "Lamb kabsa served in a traditional majlis",
    },
    Restaurant {
        id: 2,
        name: "Al Romansiah",
        city: "Riyadh",
        cuisine: Cuisine::TraditionalSaudi,
        rating: 4.4,
        price_per_person: 60,
        signature: "Mandi chicken with saffron rice",
    },
    Restaurant {
        id: 3,
        name: "Em Sherif",
        city: "Riyadh",
        cuisine: Cuisine::Lebanese,
        rating: 4.7,
        price_per_person: 250,
        signature: "Mezze tasting with fattoush and muhammara",
    },
    Restaurant {
        id: 4,
        name: "The Globe",
        city: "Riyadh",
        cuisine: Cuisine::International,
        rating: 4.5,
        price_per_person: 400,
        signature: "Tasting menu with skyline views from Al Faisaliah",
    },
    Restaurant {
        id: 5,
        name: "Al Baik",
        city: "Jeddah",
        cuisine: Cuisine::TraditionalSaudi,
        rating: 4.8,
        price_per_person: 30,
        signature: "Broasted chicken with garlic sauce",
    },
    Restaurant {
        id: 6,
        name: "Byblos Sur Mer",
        city: "Jeddah",
        cuisine: Cuisine::Lebanese,
        rating: 4.3,
        price_per_person: 180,
        signature: "Grilled halloumi and mixed grill platter",
    },
    Restaurant {
        id: 7,
        name: "Al Nakheel Seafood",
        city: "Jeddah",
        cuisine: Cuisine::Seafood,
        rating: 4.5,
        price_per_person: 200,
        signature: "Red Sea hamour grilled over charcoal",
    },
    Restaurant {
        id: 8,
        name: "Spice Route",
        city: "Riyadh",
        cuisine: Cuisine::Indian,
        rating: 4.2,
        price_per_person: 90,
        signature: "Vegetable biryani and dal makhani",
    },
    Restaurant {
        id: 9,
        name: "Saffron Terrace",
        city: "AlUla",
        cuisine: Cuisine::International,
        rating: 4.6,
        price_per_person: 320,
        signature: "Desert garden menu under the stars",
    },
    Restaurant {
        id: 10,
        name: "Il Forno",
        city: "Jeddah",
        cuisine: Cuisine::Italian,
        rating: 4.1,
        price_per_person: 150,
        signature: "Wood-fired margherita pizza",
    },
    Restaurant {
        id: 11,
        name: "Sakura House",
        city: "Riyadh",
        cuisine: Cuisine::Japanese,
        rating: 4.3,
        price_per_person: 220,
        signature: "Omakase sushi selection",
    },
];

/// Cuisines that can reliably serve a vegetarian menu
const VEGETARIAN_CUISINES: [Cuisine; 2] = [Cuisine::Lebanese, Cuisine::International];

/// Whether a restaurant suits a dietary preference
#[must_use]
pub fn is_compatible(restaurant: &Restaurant, preference: FoodPreference) -> bool {
    match preference {
        FoodPreference::Vegetarian => VEGETARIAN_CUISINES.contains(&restaurant.cuisine),
        FoodPreference::Vegan => restaurant.cuisine != Cuisine::TraditionalSaudi,
        FoodPreference::Halal | FoodPreference::NoRestrictions => true,
    }
}

/// Restaurants compatible with `preference`, in catalog order
#[must_use]
pub fn filter_restaurants(preference: FoodPreference, catalog: &[Restaurant]) -> Vec<&Restaurant> {
    catalog
        .iter()
        .filter(|restaurant| is_compatible(restaurant, preference))
        .collect()
}
