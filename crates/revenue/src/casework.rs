//! One-off case revenue grouped by technician and by pest type.

use pestops_core::types::{Case, DateWindow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UNASSIGNED_TECHNICIAN: &str = "Unassigned";
pub const UNKNOWN_PEST: &str = "Other";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRevenueRow {
    pub label: String,
    pub cases: usize,
    pub revenue: f64,
    /// 0.0 when `cases` is zero.
    pub average_price: f64,
}

pub fn revenue_by_technician(cases: &[Case], window: &DateWindow) -> Vec<CaseRevenueRow> {
    group_case_revenue(cases, window, |c| c.assigned_technician_name.as_deref(), UNASSIGNED_TECHNICIAN)
}

pub fn revenue_by_pest_type(cases: &[Case], window: &DateWindow) -> Vec<CaseRevenueRow> {
    group_case_revenue(cases, window, |c| c.pest_type.as_deref(), UNKNOWN_PEST)
}

/// Group priced cases completed in `window` by `key`, blank keys folded
/// into `fallback`. Rows are sorted by revenue descending, ties in
/// first-seen order.
fn group_case_revenue<'a, F>(
    cases: &'a [Case],
    window: &DateWindow,
    key: F,
    fallback: &str,
) -> Vec<CaseRevenueRow>
where
    F: Fn(&'a Case) -> Option<&'a str>,
{
    let mut rows: Vec<CaseRevenueRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for case in cases {
        let Some(revenue) = case.revenue_in(window) else {
            continue;
        };
        let label = match key(case).map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => fallback,
        };
        let slot = *index.entry(label).or_insert_with(|| {
            rows.push(CaseRevenueRow {
                label: label.to_string(),
                cases: 0,
                revenue: 0.0,
                average_price: 0.0,
            });
            rows.len() - 1
        });
        rows[slot].cases += 1;
        rows[slot].revenue += revenue;
    }

    for row in &mut rows {
        row.average_price = if row.cases == 0 {
            0.0
        } else {
            row.revenue / row.cases as f64
        };
    }
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows
}
