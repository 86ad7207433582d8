//! Remote rate source over HTTP.
//!
//! `GET {endpoint}/{base}` must return a JSON object holding a table of
//! currency code to rate under `rates_field`, e.g.
//!
//! ```json
//! { "result": "success", "base_code": "EUR", "rates": { "USD": 1.08, "GBP": 0.86 } }
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use super::RateSource;
use crate::error::{InvError, Result};

/// Default endpoint; the base currency is appended as a path segment.
pub const DEFAULT_ENDPOINT: &str = "https://open.er-api.com/v6/latest";

/// Default name of the rate table in the response.
pub const DEFAULT_RATES_FIELD: &str = "rates";

/// Rate source backed by a JSON HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
    rates_field: String,
}

impl HttpRateSource {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, rates_field: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            rates_field: rates_field.into(),
        }
    }

    /// URL requested for `base`.
    #[must_use]
    pub fn url_for(&self, base: &str) -> String {
        format!("{}/{base}", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for HttpRateSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_RATES_FIELD)
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<Decimal> {
        let url = self.url_for(base);
        debug!(%url, "Requesting exchange rates");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| InvError::RateFetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvError::RateFetch(format!("{url} answered HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| InvError::RateFetch(format!("invalid JSON from {url}: {e}")))?;
        trace!("Rate response decoded");

        extract_rate(&body, &self.rates_field, target)
    }
}

/// Read `body[rates_field][target]` as a positive decimal.
pub fn extract_rate(body: &Value, rates_field: &str, target: &str) -> Result<Decimal> {
    let table = body
        .get(rates_field)
        .and_then(Value::as_object)
        .ok_or_else(|| InvError::RateFetch(format!("response has no '{rates_field}' table")))?;

    let entry = table.get(target).ok_or_else(|| InvError::RateMissing {
        currency: target.to_string(),
    })?;

    let value = entry
        .as_f64()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| InvError::RateFetch(format!("rate for {target} is not a positive number")))?;

    // Shortest round-trip text keeps 1.08 as 1.08 rather than its binary expansion.
    Decimal::from_str(&value.to_string())
        .map_err(|e| InvError::RateFetch(format!("rate for {target} out of range: {e}")))
}
