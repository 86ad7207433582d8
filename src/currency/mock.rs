//! Rate sources for tests.
//!
//! Both sources record every request so tests can assert on what was asked.
//!
//! ```rust,ignore
//! use inv::currency::mock::StaticRateSource;
//! use inv::currency::RateLookup;
//!
//! let source = StaticRateSource::new(dec!(1.08));
//! let lookup = RateLookup::new("EUR", "USD")?;
//! lookup.fetch(&source).await;
//! assert_eq!(source.requests().len(), 1);
//! ```

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::trace;

use super::RateSource;
use crate::error::{InvError, Result};

type Requests = Mutex<Vec<(String, String)>>;

fn record(requests: &Requests, base: &str, target: &str) {
    trace!(base, target, "Mock rate request");
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((base.to_string(), target.to_string()));
}

fn snapshot(requests: &Requests) -> Vec<(String, String)> {
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Always answers with the same rate, or never answers.
#[derive(Debug, Default)]
pub struct StaticRateSource {
    rate: Option<Decimal>,
    requests: Requests,
}

impl StaticRateSource {
    #[must_use]
    pub fn new(rate: Decimal) -> Self {
        Self {
            rate: Some(rate),
            requests: Mutex::default(),
        }
    }

    /// A source whose requests never complete.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// Requests seen so far, as `(base, target)`.
    #[must_use]
    pub fn requests(&self) -> Vec<(String, String)> {
        snapshot(&self.requests)
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<Decimal> {
        record(&self.requests, base, target);
        match self.rate {
            Some(rate) => Ok(rate),
            None => std::future::pending().await,
        }
    }
}

/// Always fails with the given reason.
#[derive(Debug)]
pub struct FailingRateSource {
    reason: String,
    requests: Requests,
}

impl FailingRateSource {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            requests: Mutex::default(),
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<(String, String)> {
        snapshot(&self.requests)
    }
}

#[async_trait]
impl RateSource for FailingRateSource {
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<Decimal> {
        record(&self.requests, base, target);
        Err(InvError::RateFetch(self.reason.clone()))
    }
}
