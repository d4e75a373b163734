//! HTTP client for an `open.er-api.com` style rate provider.
//!
//! `GET {base_url}/latest/{BASE}` answers with
//! `{ "rates": { "EUR": 0.91, "JPY": 149.2, ... }, ... }`.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use currex_core::rates::{FetchError, RateFetcher, RawRateMap};
use currex_shared::{CurrencyCode, RatesConfig};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::{debug, warn};

/// Rate fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRateFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateFetcher {
    /// Creates a fetcher sending `user_agent` on every call.
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Creates a fetcher from the `rates` configuration section.
    pub fn from_config(config: &RatesConfig) -> Result<Self, FetchError> {
        Self::new(config.provider_base_url.clone(), &config.user_agent)
    }

    fn latest_url(&self, base: CurrencyCode) -> String {
        format!("{}/latest/{base}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch(&self, base: CurrencyCode, timeout: Duration) -> Result<RawRateMap, FetchError> {
        let url = self.latest_url(base);
        debug!(url = %url, "Fetching exchange rates");

        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_secs())
            } else {
                FetchError::Transport(e.to_string())
            }
        };

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport)?;
        parse_rates(&body)
    }
}

/// Provider response; only `rates` matters.
#[derive(Deserialize)]
struct ProviderResponse<'a> {
    #[serde(borrow, default)]
    rates: Option<&'a RawValue>,
}

/// Extracts the `rates` object from a provider response.
///
/// Each rate is parsed from its raw JSON text, never through an `f64`.
/// Entries that are not numbers are skipped.
pub fn parse_rates(body: &str) -> Result<RawRateMap, FetchError> {
    let response: ProviderResponse<'_> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let rates: HashMap<String, &RawValue> = response
        .rates
        .and_then(|raw| serde_json::from_str(raw.get()).ok())
        .ok_or(FetchError::MissingRates)?;

    let mut parsed = RawRateMap::new();
    for (code, rate) in rates {
        match decimal_from_json(rate.get()) {
            Some(value) => {
                parsed.insert(code, value);
            }
            None => warn!(currency = %code, value = %rate, "Skipping non-numeric exchange rate"),
        }
    }

    Ok(parsed)
}

fn decimal_from_json(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
