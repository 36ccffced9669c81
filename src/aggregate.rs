//! Pure, stateless reporting functions over in-memory collections.
//!
//! Nothing here touches the store: callers fetch collections through the
//! repositories and hand them in as slices. Results are recomputed from
//! scratch on every call - collections are small (single-tenant,
//! demo-grade scale) and memoization would only add invalidation
//! questions this layer does not need to answer.
//!
//! Revenue figures use the event's *effective total* (`total_with_tax`
//! when tax is applied, else the base cost) and only count events whose
//! status is `Paid`. Collected figures sum raw payment amounts. The two
//! are accumulated independently on purpose: a payment recorded in a
//! different month than its event contributes to that month's
//! `collected`, reflecting actual cash timing versus booking timing.
//!
//! Every function treats empty input as a zeroed/empty result, never an
//! error.

use crate::model::{Customer, Event, EventStatus, Payment};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket label for events without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// An inclusive date range, `[start, end]` on both bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange { start, end }
    }

    /// Whether `at` falls inside the range, bounds included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// One customer's paid-revenue ranking entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRevenue {
    pub name: String,
    pub revenue: f64,
    pub event_count: usize,
}

/// Count of events in one category bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Scheduled vs collected amounts for one calendar month.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    /// Σ effective event totals for events dated in this month.
    pub scheduled: f64,
    /// Σ payment amounts for payments dated in this month.
    pub collected: f64,
}

/// Overall collected vs still-pending amounts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub collected: f64,
    /// Clamped at zero: overpayment never produces a negative bucket.
    pub pending: f64,
}

/// Total paid revenue: Σ effective total over events with status `Paid`.
pub fn revenue_total(events: &[Event]) -> f64 {
    events
        .iter()
        .filter(|e| e.status == EventStatus::Paid)
        .map(|e| e.effective_total())
        .sum()
}

/// Rank customers by paid revenue, descending, keeping the top `n`.
///
/// Customers with zero paid revenue are dropped. The sort is stable, so
/// customers with equal revenue keep their input order - which order
/// that is for ties is deliberately unspecified.
pub fn top_customers(customers: &[Customer], events: &[Event], n: usize) -> Vec<CustomerRevenue> {
    let mut ranking: Vec<CustomerRevenue> = customers
        .iter()
        .map(|customer| {
            let mut revenue = 0.0;
            let mut event_count = 0;
            for event in events
                .iter()
                .filter(|e| e.customer_id == customer.id && e.status == EventStatus::Paid)
            {
                revenue += event.effective_total();
                event_count += 1;
            }
            CustomerRevenue {
                name: customer.name.clone(),
                revenue,
                event_count,
            }
        })
        .filter(|entry| entry.revenue > 0.0)
        .collect();

    ranking.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking.truncate(n);
    ranking
}

/// Count events per category; events without a category land in the
/// [`UNCATEGORIZED`] bucket. Only non-zero buckets are returned, in
/// first-appearance order.
pub fn category_distribution(events: &[Event]) -> Vec<CategoryCount> {
    let mut buckets: Vec<CategoryCount> = Vec::new();

    for event in events {
        let label = event
            .category
            .map(|c| c.as_str())
            .unwrap_or(UNCATEGORIZED);

        match buckets.iter_mut().find(|b| b.category == label) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(CategoryCount {
                category: label.to_string(),
                count: 1,
            }),
        }
    }

    buckets
}

/// Scheduled-vs-collected series keyed by calendar month, ascending.
///
/// `scheduled` accumulates effective event totals by the event's date;
/// `collected` accumulates payment amounts by the payment's date. The
/// two sides are independent: an event booked in March and paid in May
/// contributes to March's `scheduled` and May's `collected`.
///
/// With `range`, only events and payments dated inside it (inclusive)
/// are counted.
pub fn monthly_series(
    events: &[Event],
    payments: &[Payment],
    range: Option<&DateRange>,
) -> Vec<MonthlyBucket> {
    let in_range = |at: DateTime<Utc>| range.map_or(true, |r| r.contains(at));

    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

    for event in events.iter().filter(|e| in_range(e.date)) {
        let slot = months
            .entry((event.date.year(), event.date.month()))
            .or_insert((0.0, 0.0));
        slot.0 += event.effective_total();
    }

    for payment in payments.iter().filter(|p| in_range(p.payment_date)) {
        let slot = months
            .entry((payment.payment_date.year(), payment.payment_date.month()))
            .or_insert((0.0, 0.0));
        slot.1 += payment.amount;
    }

    months
        .into_iter()
        .map(|((year, month), (scheduled, collected))| MonthlyBucket {
            year,
            month,
            scheduled,
            collected,
        })
        .collect()
}

/// Collected vs pending across the given events and payments.
///
/// `collected` sums every payment amount; `pending` is the paid revenue
/// not yet covered by payments, clamped at zero when overpayment (or
/// payments against unpaid events) would push it negative.
pub fn pending_vs_collected(events: &[Event], payments: &[Payment]) -> CollectionSummary {
    let collected: f64 = payments.iter().map(|p| p.amount).sum();
    let pending = (revenue_total(events) - collected).max(0.0);

    CollectionSummary { collected, pending }
}
