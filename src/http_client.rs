//! Outbound HTTP clients for side-data lookups

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::ConciergeError;

pub const USER_AGENT: &str = concat!("SaudiConcierge/", env!("CARGO_PKG_VERSION"));

/// Build a client that retries transient failures with exponential backoff
pub fn lookup_client(timeout_seconds: u32, max_retries: u32) -> crate::Result<ClientWithMiddleware> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ConciergeError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
