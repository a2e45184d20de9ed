//! Budget conversion into Saudi Riyals
//!
//! A live conversion service is tried first; any failure falls back to a
//! static table of approximate SAR-per-unit multipliers.

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::CurrencyConfig;
use crate::http_client::lookup_client;
use crate::models::Lookup;
use crate::ConciergeError;

/// Currency every budget is converted into
pub const TARGET_CURRENCY: &str = "SAR";

/// Multiplier used for codes missing from the table (USD peg)
pub const BASE_RATE: f64 = 3.75;

/// Approximate SAR per unit of each supported currency
pub const FALLBACK_RATES: &[(&str, f64)] = &[
    ("USD", 3.75),
    ("EUR", 4.1),
    ("GBP", 4.8),
    ("JPY", 0.025),
    ("AED", 1.02),
    ("CNY", 0.52),
    ("INR", 0.045),
    ("EGP", 0.12),
    ("AUD", 2.5),
];

#[derive(Debug, Deserialize)]
struct ConversionResponse {
    result: f64,
}

/// Converts amounts into SAR
pub struct CurrencyConverter {
    client: ClientWithMiddleware,
    exchange_url: Option<String>,
}

impl CurrencyConverter {
    pub fn new(config: &CurrencyConfig) -> crate::Result<Self> {
        Ok(Self {
            client: lookup_client(config.timeout_seconds, config.max_retries)?,
            exchange_url: config.exchange_url.clone(),
        })
    }

    /// Convert `amount` of `from_currency` into SAR, rounded to 2 decimals.
    ///
    /// Never fails: a broken or unconfigured rate service yields
    /// [`Lookup::Fallback`] computed from [`FALLBACK_RATES`].
    #[instrument(skip(self))]
    pub async fn convert_to_sar(&self, amount: f64, from_currency: &str) -> Lookup<f64> {
        match self.fetch_live(amount, from_currency).await {
            Ok(converted) => {
                debug!("Live conversion {} {} = {} SAR", amount, from_currency, converted);
                Lookup::Live(round_to_cents(converted))
            }
            Err(e) => {
                warn!("Currency conversion error, using fallback rate: {}", e);
                Lookup::Fallback(fallback_convert(amount, from_currency))
            }
        }
    }

    async fn fetch_live(&self, amount: f64, from_currency: &str) -> crate::Result<f64> {
        let base_url = self
            .exchange_url
            .as_deref()
            .ok_or_else(|| ConciergeError::config("No exchange URL configured"))?;

        let url = format!(
            "{}?from={}&to={}&amount={}",
            base_url,
            urlencoding::encode(from_currency),
            TARGET_CURRENCY,
            amount
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ConciergeError::api(format!(
                "Failed to fetch exchange rate: {}",
                response.status()
            )));
        }

        let payload: ConversionResponse = response
            .json()
            .await
            .map_err(|e| ConciergeError::api(format!("Malformed exchange payload: {e}")))?;

        if !payload.result.is_finite() {
            return Err(ConciergeError::api("Exchange service returned a non-finite amount"));
        }
        Ok(payload.result)
    }
}

/// SAR-per-unit multiplier for a currency code, [`BASE_RATE`] if unknown
#[must_use]
pub fn fallback_rate(currency: &str) -> f64 {
    FALLBACK_RATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map_or(BASE_RATE, |(_, rate)| *rate)
}

/// Convert using the static table only
#[must_use]
pub fn fallback_convert(amount: f64, currency: &str) -> f64 {
    round_to_cents(amount * fallback_rate(currency))
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an amount with thousands separators, e.g. `7,500.5 SAR`
#[must_use]
pub fn format_sar(amount: f64) -> String {
    format!("{} {}", group_thousands(amount), TARGET_CURRENCY)
}

/// Group the integer part in threes and keep at most two significant decimals
#[must_use]
pub fn group_thousands(amount: f64) -> String {
    let rounded = round_to_cents(amount.abs());
    let fixed = format!("{rounded:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if amount < 0.0 && rounded > 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn converter(exchange_url: Option<String>) -> CurrencyConverter {
        CurrencyConverter::new(&CurrencyConfig {
            exchange_url,
            timeout_seconds: 5,
            max_retries: 0,
        })
        .unwrap()
    }

    #[rstest]
    #[case("USD", 3.75)]
    #[case("EUR", 4.1)]
    #[case("GBP", 4.8)]
    #[case("JPY", 0.025)]
    #[case("AED", 1.02)]
    #[case("CNY", 0.52)]
    #[case("INR", 0.045)]
    #[case("EGP", 0.12)]
    #[case("AUD", 2.5)]
    fn test_fallback_matches_table(#[case] code: &str, #[case] rate: f64) {
        let amount = 1234.567;
        let expected = (amount * rate * 100.0_f64).round() / 100.0;
        assert_eq!(fallback_convert(amount, code), expected);
    }

    #[test]
    fn test_unknown_currency_uses_base_rate() {
        assert_eq!(fallback_rate("BRL"), BASE_RATE);
        assert_eq!(fallback_convert(100.0, "BRL"), 375.0);
    }

    #[rstest]
    #[case(0.0, "0")]
    #[case(999.0, "999")]
    #[case(7500.0, "7,500")]
    #[case(7500.5, "7,500.5")]
    #[case(1234567.891, "1,234,567.89")]
    #[case(-1500.0, "-1,500")]
    fn test_group_thousands(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(group_thousands(amount), expected);
    }

    #[test]
    fn test_format_sar() {
        assert_eq!(format_sar(7500.0), "7,500 SAR");
    }

    #[tokio::test]
    async fn test_live_conversion() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/convert")
                    .query_param("from", "EUR")
                    .query_param("to", "SAR");
                then.status(200).json_body(json!({ "result": 4123.456 }));
            })
            .await;

        let converter = converter(Some(server.url("/convert")));
        let converted = converter.convert_to_sar(1000.0, "EUR").await;

        mock.assert_async().await;
        assert_eq!(converted, Lookup::Live(4123.46));
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/convert");
                then.status(500);
            })
            .await;

        let converter = converter(Some(server.url("/convert")));
        let converted = converter.convert_to_sar(1000.0, "GBP").await;
        assert_eq!(converted, Lookup::Fallback(4800.0));
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/convert");
                then.status(200).json_body(json!({ "rate": "oops" }));
            })
            .await;

        let converter = converter(Some(server.url("/convert")));
        let converted = converter.convert_to_sar(200.0, "USD").await;
        assert_eq!(converted, Lookup::Fallback(750.0));
    }

    #[tokio::test]
    async fn test_unconfigured_service_falls_back() {
        let converted = converter(None).convert_to_sar(200.0, "AED").await;
        assert_eq!(converted, Lookup::Fallback(204.0));
    }
}
