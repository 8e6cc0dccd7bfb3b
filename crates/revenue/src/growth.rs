//! Month-over-month MRR movement.

use crate::arr::{contributes_to_arr, current_arr};
use crate::retention::was_active_at;
use chrono::{DateTime, Duration, Months, Utc};
use pestops_core::types::Customer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyGrowth {
    pub period_start: DateTime<Utc>,
    pub start_mrr: f64,
    pub new_mrr: f64,
    pub churned_mrr: f64,
    /// `end_mrr - start_mrr`.
    pub net_change_mrr: f64,
    pub end_mrr: f64,
    /// Percent; 0.0 when there was no starting MRR.
    pub growth_rate: f64,
}

/// Compare MRR one month before `now` with MRR at `now`.
///
/// The starting book is reconstructed with the cohort rule from
/// [`was_active_at`]; the ending book is live ARR. `start_mrr +
/// net_change_mrr == end_mrr` holds by construction.
pub fn monthly_growth(customers: &[Customer], now: DateTime<Utc>) -> MonthlyGrowth {
    let period_start = now
        .checked_sub_months(Months::new(1))
        .unwrap_or_else(|| now - Duration::days(30));
    let today = now.date_naive();

    let mut start_arr = 0.0;
    let mut churned_arr = 0.0;
    let mut new_arr = 0.0;
    for customer in customers {
        let premium = customer.premium();
        if was_active_at(customer, period_start) {
            start_arr += premium;
            if !customer.is_active {
                churned_arr += premium;
            }
        } else if customer.created_at >= period_start && contributes_to_arr(customer, today) {
            new_arr += premium;
        }
    }

    let start_mrr = start_arr / 12.0;
    let end_mrr = current_arr(customers, today) / 12.0;
    let net_change_mrr = end_mrr - start_mrr;

    MonthlyGrowth {
        period_start,
        start_mrr,
        new_mrr: new_arr / 12.0,
        churned_mrr: churned_arr / 12.0,
        net_change_mrr,
        end_mrr,
        growth_rate: if start_mrr > 0.0 {
            net_change_mrr / start_mrr * 100.0
        } else {
            0.0
        },
    }
}
