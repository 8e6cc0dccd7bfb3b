//! Cohort retention: churn, retention and net revenue retention over a
//! trailing period.
//!
//! There is no history table to consult, so "active at a past instant" is
//! reconstructed from the current record: a customer created before the
//! instant counts as active then unless it is inactive now *and* has no
//! contract end date after the instant. Customers who toggled status several
//! times inside the period are misclassified; reported numbers depend on
//! this exact rule, so it must not be refined.

use chrono::{DateTime, Duration, Utc};
use pestops_core::types::Customer;
use serde::{Deserialize, Serialize};

/// Retention figures for the cohort active at `period_start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionMetrics {
    pub period_days: u32,
    pub period_start: DateTime<Utc>,
    pub cohort_size: usize,
    pub churned_customers: usize,
    /// Percent of the cohort no longer active. 0.0 for an empty cohort.
    pub churn_rate: f64,
    pub retention_rate: f64,
    pub starting_revenue: f64,
    pub retained_revenue: f64,
    /// Percent of starting revenue still active. 100.0 when the cohort
    /// started with no revenue.
    pub net_revenue_retention: f64,
}

/// Whether `customer` is considered to have been active at `instant`.
pub fn was_active_at(customer: &Customer, instant: DateTime<Utc>) -> bool {
    if customer.created_at >= instant {
        return false;
    }
    let instant_date = instant.date_naive();
    customer.is_active
        || customer
            .contract_end_date
            .is_some_and(|end| end > instant_date)
}

/// Customers active at `instant`, in input order.
pub fn cohort_at(customers: &[Customer], instant: DateTime<Utc>) -> Vec<&Customer> {
    customers
        .iter()
        .filter(|c| was_active_at(c, instant))
        .collect()
}

pub fn churn_rate(cohort_size: usize, churned: usize) -> f64 {
    if cohort_size == 0 {
        0.0
    } else {
        churned as f64 / cohort_size as f64 * 100.0
    }
}

pub fn net_revenue_retention(starting_revenue: f64, retained_revenue: f64) -> f64 {
    if starting_revenue <= 0.0 {
        100.0
    } else {
        retained_revenue / starting_revenue * 100.0
    }
}

pub fn compute_retention(
    customers: &[Customer],
    now: DateTime<Utc>,
    period_days: u32,
) -> RetentionMetrics {
    let period_start = now
        .checked_sub_signed(Duration::days(i64::from(period_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let cohort = cohort_at(customers, period_start);

    let churned = cohort.iter().filter(|c| !c.is_active).count();
    let starting_revenue: f64 = cohort.iter().map(|c| c.premium()).sum();
    let retained_revenue: f64 = cohort
        .iter()
        .filter(|c| c.is_active)
        .map(|c| c.premium())
        .sum();
    let churn = churn_rate(cohort.len(), churned);

    RetentionMetrics {
        period_days,
        period_start,
        cohort_size: cohort.len(),
        churned_customers: churned,
        churn_rate: churn,
        retention_rate: 100.0 - churn,
        starting_revenue,
        retained_revenue,
        net_revenue_retention: net_revenue_retention(starting_revenue, retained_revenue),
    }
}
