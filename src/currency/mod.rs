//! Currency conversion lookup.
//!
//! A [`RateLookup`] owns one base/target pair and at most one in-flight
//! fetch. Its state is one of idle, in flight, succeeded or failed; a failed
//! fetch never surfaces as an error, the total simply stays unconverted.
//!
//! Rates come from a [`RateSource`]: [`HttpRateSource`] in production,
//! [`mock::StaticRateSource`] and [`mock::FailingRateSource`] in tests.

mod http;
pub mod mock;

pub use http::{HttpRateSource, DEFAULT_ENDPOINT, DEFAULT_RATES_FIELD};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{InvError, Result};

/// Validate and normalise a three-letter currency code.
pub fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(InvError::InvalidCurrency {
            value: code.to_string(),
        })
    }
}

/// A fetched conversion multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRate {
    pub base: String,
    pub target: String,
    pub rate: Decimal,
}

impl ExchangeRate {
    #[must_use]
    pub fn new(base: impl Into<String>, target: impl Into<String>, rate: Decimal) -> Self {
        Self {
            base: base.into(),
            target: target.into(),
            rate,
        }
    }

    /// Convert an amount in the base currency. `None` when out of range.
    #[must_use]
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.rate)
    }
}

/// Something that can quote a rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the rate that converts `base` into `target`.
    async fn fetch_rate(&self, base: &str, target: &str) -> Result<Decimal>;
}

/// Lookup state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RateState {
    Idle,
    InFlight,
    Succeeded { rate: ExchangeRate },
    Failed { reason: String },
}

/// Single-flight rate lookup for a fixed currency pair.
#[derive(Debug)]
pub struct RateLookup {
    base: String,
    target: String,
    state: Mutex<RateState>,
}

impl RateLookup {
    /// Create an idle lookup. Codes are normalised to upper case.
    pub fn new(base: &str, target: &str) -> Result<Self> {
        Ok(Self {
            base: normalize_code(base)?,
            target: normalize_code(target)?,
            state: Mutex::new(RateState::Idle),
        })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    fn lock(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RateState {
        self.lock().clone()
    }

    /// The fetched rate, if any.
    #[must_use]
    pub fn rate(&self) -> Option<ExchangeRate> {
        match &*self.lock() {
            RateState::Succeeded { rate } => Some(rate.clone()),
            _ => None,
        }
    }

    /// Claim the single fetch slot.
    ///
    /// Refused while a fetch is in flight or once a rate is present.
    pub fn begin(&self) -> bool {
        let mut state = self.lock();
        match *state {
            RateState::InFlight | RateState::Succeeded { .. } => {
                debug!(state = ?*state, "Rate fetch not started");
                false
            }
            RateState::Idle | RateState::Failed { .. } => {
                *state = RateState::InFlight;
                true
            }
        }
    }

    /// Record the result of a fetch started with [`begin`](Self::begin).
    ///
    /// A failure keeps a previously fetched rate.
    pub fn finish(&self, result: Result<Decimal>) {
        let mut state = self.lock();
        match result {
            Ok(rate) => {
                info!(base = %self.base, target = %self.target, %rate, "Exchange rate fetched");
                *state = RateState::Succeeded {
                    rate: ExchangeRate::new(self.base.clone(), self.target.clone(), rate),
                };
            }
            Err(e) => {
                warn!(base = %self.base, target = %self.target, error = %e, "Exchange rate unavailable");
                if !matches!(*state, RateState::Succeeded { .. }) {
                    *state = RateState::Failed {
                        reason: e.to_string(),
                    };
                }
            }
        }
    }

    /// Return an in-flight lookup to idle.
    pub fn cancel(&self) {
        let mut state = self.lock();
        if *state == RateState::InFlight {
            debug!("Rate fetch cancelled");
            *state = RateState::Idle;
        }
    }

    /// Fetch on the current task. Returns the rate when one is available
    /// afterwards, including one fetched earlier.
    pub async fn fetch(&self, source: &dyn RateSource) -> Option<ExchangeRate> {
        if self.begin() {
            let result = source.fetch_rate(&self.base, &self.target).await;
            self.finish(result);
        }
        self.rate()
    }

    /// Fetch on a background task. Returns `None` if no fetch was started.
    pub fn spawn(self: &Arc<Self>, source: Arc<dyn RateSource>) -> Option<RateTask> {
        if !self.begin() {
            return None;
        }
        let lookup = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = source.fetch_rate(&lookup.base, &lookup.target).await;
            lookup.finish(result);
        });
        Some(RateTask {
            lookup: Arc::clone(self),
            handle: Some(handle),
        })
    }
}

/// Handle to a background fetch. Dropping it cancels the fetch.
#[derive(Debug)]
pub struct RateTask {
    lookup: Arc<RateLookup>,
    handle: Option<JoinHandle<()>>,
}

impl RateTask {
    /// Wait for the fetch to finish.
    ///
    /// Dropping the returned future before it completes cancels the fetch.
    pub async fn join(mut self) -> Option<ExchangeRate> {
        if let Some(handle) = self.handle.as_mut() {
            let outcome = handle.await;
            self.handle = None;
            if let Err(e) = outcome {
                warn!(error = %e, "Rate fetch task ended abnormally");
                self.lookup.cancel();
            }
        }
        self.lookup.rate()
    }

    /// Abort the fetch; an in-flight lookup returns to idle.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.lookup.cancel();
        }
    }
}

impl Drop for RateTask {
    fn drop(&mut self) {
        self.abort();
    }
}
