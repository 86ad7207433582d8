//! Aggregate purchase cost.
//!
//! Prices are free text on each record. Anything that does not parse as a
//! decimal counts as zero; the record keeps its text unchanged. Sums use
//! checked arithmetic: a price that would overflow the running total is left
//! out and counted instead.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, trace};

use crate::currency::ExchangeRate;
use crate::record::{DeviceCategory, DeviceRecord};

/// Parse a price, accepting `.` or a single `,` as the decimal separator.
///
/// Digit group separators (`_`, or `,` next to a `.`) are rejected.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() || text.contains('_') {
        return None;
    }
    Decimal::from_str(text).ok().or_else(|| {
        if text.matches(',').count() == 1 && !text.contains('.') {
            Decimal::from_str(&text.replace(',', ".")).ok()
        } else {
            None
        }
    })
}

/// Sum of all parseable prices. Prices that would overflow are skipped.
#[must_use]
pub fn total_cost<'a>(records: impl IntoIterator<Item = &'a DeviceRecord>) -> Decimal {
    records
        .into_iter()
        .filter_map(|r| parse_price(&r.purchase_price))
        .fold(Decimal::ZERO, |total, price| {
            total.checked_add(price).unwrap_or(total)
        })
}

/// Total converted into another currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedCost {
    pub currency: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Per-category subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCost {
    pub category: DeviceCategory,
    pub count: usize,
    pub total: Decimal,
}

/// Aggregate cost of a collection, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostSummary {
    pub device_count: usize,
    /// Records whose price text did not parse (and counted as zero).
    pub unparsed_prices: usize,
    /// Records left out because adding their price would overflow.
    #[serde(skip_serializing_if = "is_zero")]
    pub overflowed_prices: usize,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted: Option<ConvertedCost>,
    pub by_category: Vec<CategoryCost>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl CostSummary {
    /// Summarise `records`, converting the total when a rate is available.
    #[must_use]
    pub fn compute(records: &[DeviceRecord], rate: Option<&ExchangeRate>) -> Self {
        let mut unparsed = 0;
        let mut overflowed = 0;
        let mut total = Decimal::ZERO;
        let mut by_category: Vec<CategoryCost> = Vec::new();

        for record in records {
            let price = parse_price(&record.purchase_price).unwrap_or_else(|| {
                unparsed += 1;
                Decimal::ZERO
            });
            let entry = by_category
                .iter()
                .position(|c| c.category == record.device_category);
            let subtotal = entry.map_or(Decimal::ZERO, |i| by_category[i].total);

            let (Some(new_total), Some(new_subtotal)) =
                (total.checked_add(price), subtotal.checked_add(price))
            else {
                debug!(id = %record.id, price = %record.purchase_price, "Price overflows total");
                overflowed += 1;
                continue;
            };
            total = new_total;

            match entry {
                Some(i) => {
                    by_category[i].count += 1;
                    by_category[i].total = new_subtotal;
                }
                None => by_category.push(CategoryCost {
                    category: record.device_category,
                    count: 1,
                    total: price,
                }),
            }
        }
        by_category.sort_by_key(|c| {
            DeviceCategory::ALL
                .iter()
                .position(|&cat| cat == c.category)
                .unwrap_or(usize::MAX)
        });

        let converted = rate.and_then(|r| {
            Some(ConvertedCost {
                currency: r.target.clone(),
                rate: r.rate,
                amount: r.convert(total)?,
            })
        });
        trace!(%total, unparsed, overflowed, converted = converted.is_some(), "Computed cost summary");

        Self {
            device_count: records.len(),
            unparsed_prices: unparsed,
            overflowed_prices: overflowed,
            total,
            currency: rate.map(|r| r.base.clone()),
            converted,
            by_category,
        }
    }
}
