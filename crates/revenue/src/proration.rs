//! Day-overlap proration between contract intervals and reporting windows.

use chrono::NaiveDate;
use pestops_core::types::{Customer, DateWindow};

/// Average-year divisor for daily rates. Fixed rather than calendar-exact so
/// that the same contract always yields the same daily rate.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Whole days shared by the contract `[start, end]` and `window`, counting
/// both boundary days. An absent `end` is open-ended. Returns 0 for disjoint
/// intervals and for inverted contracts (`start > end`).
pub fn overlap_days(start: NaiveDate, end: Option<NaiveDate>, window: &DateWindow) -> i64 {
    let end = end.unwrap_or(NaiveDate::MAX);
    if start > end {
        return 0;
    }
    let from = start.max(window.start);
    let to = end.min(window.end);
    if from > to {
        return 0;
    }
    (to - from).num_days() + 1
}

/// Daily revenue for an annual fee.
pub fn daily_rate(annual_premium: f64) -> f64 {
    annual_premium / DAYS_PER_YEAR
}

/// Revenue attributed to `days` days of a contract.
pub fn prorate(annual_premium: f64, days: i64) -> f64 {
    daily_rate(annual_premium) * days as f64
}

/// Revenue a customer's contract earns inside `window`. A customer without
/// a start date cannot be placed on the calendar and earns nothing.
pub fn prorated_revenue(customer: &Customer, window: &DateWindow) -> f64 {
    let premium = customer.premium();
    if premium == 0.0 {
        return 0.0;
    }
    match customer.contract_start_date {
        Some(start) => prorate(premium, overlap_days(start, customer.contract_end_date, window)),
        None => 0.0,
    }
}
