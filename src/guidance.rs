//! Static cultural tips and visa guidance for visitors

use serde::Serialize;

pub const CULTURAL_TIPS: &[&str] = &[
    "🕌 Prayer times occur 5 times daily - businesses may close briefly during these times",
    "🍽️ No alcohol is served anywhere in Saudi Arabia - enjoy fresh juices and Arabic coffee instead",
    "👥 During Ramadan, eating/drinking in public during daytime hours is not permitted",
    "👔 Dress modestly - long pants and covered shoulders recommended for all visitors",
    "🤝 Use your right hand for greetings, eating, and passing items",
    "📱 Free WiFi is widely available in malls, hotels, and cafes",
    "🚗 Uber and Careem ride-sharing services operate throughout major cities",
    "💳 Most places accept credit cards, but carry some cash for small vendors",
    "🗣️ Arabic and English are widely spoken in tourist areas",
    "📸 Ask permission before photographing people, especially women",
    "🕰️ Weekend is Friday-Saturday, most businesses close Friday morning",
    "🎵 Public entertainment and music venues are increasingly common",
    "🏪 Malls and restaurants typically open late morning and close late evening",
    "🚭 Smoking is prohibited in most indoor public spaces",
    "🎭 Cultural events and festivals happen year-round - check local calendars",
];

/// One way of entering the country
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaOption {
    pub title: &'static str,
    pub duration: &'static str,
    pub stay_period: &'static str,
    pub cost: &'static str,
    pub eligibility: &'static str,
    pub process: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisaGuidance {
    pub e_visa: VisaOption,
    pub visa_on_arrival: VisaOption,
    pub gcc_residents: VisaOption,
}

pub static VISA_GUIDANCE: VisaGuidance = VisaGuidance {
    e_visa: VisaOption {
        title: "eVisa (Most Popular)",
        duration: "1 Year Multiple Entry",
        stay_period: "90 days per visit",
        cost: "300 SAR (~$80)",
        eligibility: "Citizens of 63 countries including US, UK, EU, Japan, Australia",
        process: "Apply online at visa.visitsaudi.com - typically approved within 24 hours",
    },
    visa_on_arrival: VisaOption {
        title: "Visa on Arrival",
        duration: "30 days",
        stay_period: "30 days single entry",
        cost: "480 SAR (~$128)",
        eligibility: "Citizens of US, UK, and select EU countries",
        process: "Available at airports - longer processing time",
    },
    gcc_residents: VisaOption {
        title: "GCC Residents",
        duration: "Multiple Entry",
        stay_period: "3 months",
        cost: "Free",
        eligibility: "Residents of GCC countries with valid residence permit",
        process: "Entry with passport and residence permit",
    },
};

/// Tips and visa table served together to the itinerary page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelGuidance {
    pub cultural_tips: &'static [&'static str],
    pub visa_guidance: &'static VisaGuidance,
}

#[must_use]
pub fn travel_guidance() -> TravelGuidance {
    TravelGuidance {
        cultural_tips: CULTURAL_TIPS,
        visa_guidance: &VISA_GUIDANCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_serialization() {
        let json = serde_json::to_value(travel_guidance()).unwrap();
        assert_eq!(json["culturalTips"].as_array().unwrap().len(), 15);
        assert_eq!(json["visaGuidance"]["eVisa"]["stayPeriod"], "90 days per visit");
        assert_eq!(json["visaGuidance"]["gccResidents"]["cost"], "Free");
    }
}
