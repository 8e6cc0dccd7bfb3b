//! Upsell opportunity ranking.
//!
//! Customers who keep buying one-off treatments relative to the size of
//! their contract are the best candidates for a larger recurring plan.

use chrono::NaiveDate;
use pestops_core::types::{Case, Customer, DateWindow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsellCandidate {
    pub customer_id: Uuid,
    pub company_name: String,
    pub business_type: String,
    pub annual_premium: f64,
    pub case_revenue: f64,
    pub case_count: usize,
    /// `case_revenue / annual_premium`.
    pub ratio: f64,
}

/// Rank active customers by one-off revenue over the `lookback_months`
/// ending on `today`, relative to their annual premium. Customers with no
/// case revenue or no premium are skipped. Returns at most `top_k` rows;
/// equal ratios keep the order of `customers`.
pub fn rank_upsell_candidates(
    customers: &[Customer],
    cases: &[Case],
    today: NaiveDate,
    lookback_months: u32,
    top_k: usize,
) -> Vec<UpsellCandidate> {
    let window = DateWindow::trailing_months(today, lookback_months);

    let mut per_customer: HashMap<Uuid, (f64, usize)> = HashMap::new();
    for case in cases {
        let (Some(owner), Some(revenue)) = (case.customer_id, case.revenue_in(&window)) else {
            continue;
        };
        let entry = per_customer.entry(owner).or_insert((0.0, 0));
        entry.0 += revenue;
        entry.1 += 1;
    }

    let mut candidates: Vec<UpsellCandidate> = customers
        .iter()
        .filter(|c| c.is_active)
        .filter_map(|c| {
            let premium = c.premium();
            let &(case_revenue, case_count) = per_customer.get(&c.id)?;
            if premium == 0.0 || case_revenue <= 0.0 {
                return None;
            }
            Some(UpsellCandidate {
                customer_id: c.id,
                company_name: c.company_name.clone(),
                business_type: c.segment().to_string(),
                annual_premium: premium,
                case_revenue,
                case_count,
                ratio: case_revenue / premium,
            })
        })
        .collect();

    // `sort_by` is stable, so equal ratios stay in input order.
    candidates.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    candidates.truncate(top_k);
    candidates
}
