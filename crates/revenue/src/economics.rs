//! Unit economics for a calendar month: CAC, LTV, payback and ROI.

use pestops_core::types::{Customer, MonthlySpend, ReportMonth};
use serde::{Deserialize, Serialize};

/// Churn fraction used for LTV when the measured churn is zero.
pub const MIN_CHURN_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub month: ReportMonth,
    pub marketing_spend: f64,
    pub new_customers: usize,
    /// Premium of customers acquired in the month who are still active.
    pub new_arr: f64,
    /// 0.0 when there were no new customers.
    pub customer_acquisition_cost: f64,
    pub lifetime_value: f64,
    /// 0.0 when CAC is zero.
    pub ltv_to_cac: f64,
    /// 0.0 when average ARR is zero.
    pub payback_period_months: f64,
    /// Percent; 0.0 when there was no spend.
    pub roi: f64,
}

/// Spend booked against `month`. Every row dated inside the month is
/// summed; rows are never deduplicated.
pub fn marketing_spend_for(spend: &[MonthlySpend], month: ReportMonth) -> f64 {
    let window = month.window();
    spend
        .iter()
        .filter(|row| window.contains(row.month))
        .map(|row| row.spend)
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .sum()
}

/// `average_arr / churn_fraction`, with churn floored at 1%.
pub fn lifetime_value(average_arr_per_customer: f64, churn_rate_percent: f64) -> f64 {
    let fraction = churn_rate_percent / 100.0;
    let fraction = if fraction > 0.0 { fraction } else { MIN_CHURN_FRACTION };
    average_arr_per_customer / fraction
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Compute unit economics for `month`.
///
/// `average_arr_per_customer` and `churn_rate_percent` come from the ARR
/// summary and the retention engine for the same report.
pub fn compute_unit_economics(
    customers: &[Customer],
    spend: &[MonthlySpend],
    month: ReportMonth,
    average_arr_per_customer: f64,
    churn_rate_percent: f64,
) -> UnitEconomics {
    let window = month.window();
    let acquired: Vec<&Customer> = customers
        .iter()
        .filter(|c| window.contains(c.created_at.date_naive()))
        .collect();
    let new_arr: f64 = acquired
        .iter()
        .filter(|c| c.is_active)
        .map(|c| c.premium())
        .sum();

    let marketing_spend = marketing_spend_for(spend, month);
    let cac = ratio_or_zero(marketing_spend, acquired.len() as f64);
    let ltv = lifetime_value(average_arr_per_customer, churn_rate_percent);
    let roi = ratio_or_zero(new_arr - marketing_spend, marketing_spend) * 100.0;

    UnitEconomics {
        month,
        marketing_spend,
        new_customers: acquired.len(),
        new_arr,
        customer_acquisition_cost: cac,
        lifetime_value: ltv,
        ltv_to_cac: ratio_or_zero(ltv, cac),
        payback_period_months: ratio_or_zero(cac, average_arr_per_customer / 12.0),
        roi,
    }
}
