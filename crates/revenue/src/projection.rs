//! Forward ARR projection by calendar year, and revenue attribution per
//! business segment.

use crate::arr::{contributes_to_arr, current_arr};
use crate::proration::{overlap_days, prorate, prorated_revenue};
use chrono::{Datelike, NaiveDate};
use pestops_core::types::{Case, Customer, DateWindow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Projected recurring revenue for one calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: i32,
    pub projected_arr: f64,
    pub contributing_customers: usize,
    /// The current year mirrors live ARR rather than a proration.
    pub is_current_year: bool,
}

/// Recurring plus one-off revenue attributed to one business segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRevenue {
    pub business_type: String,
    pub customers: usize,
    pub active_customers: usize,
    pub recurring_revenue: f64,
    pub case_revenue: f64,
    pub total_revenue: f64,
}

/// Prorated revenue active contracts earn inside calendar `year`. Only
/// customers with a premium and both contract dates take part.
pub fn prorated_revenue_for_year(customers: &[Customer], year: i32) -> (f64, usize) {
    let Some(window) = DateWindow::calendar_year(year) else {
        return (0.0, 0);
    };
    let mut total = 0.0;
    let mut contributing = 0;
    for customer in customers.iter().filter(|c| c.is_active) {
        let premium = customer.premium();
        let (Some(start), Some(end)) = (customer.contract_start_date, customer.contract_end_date)
        else {
            continue;
        };
        if premium == 0.0 || end < window.start || start > window.end {
            continue;
        }
        let days = overlap_days(start, Some(end), &window);
        if days > 0 {
            total += prorate(premium, days);
            contributing += 1;
        }
    }
    (total, contributing)
}

/// Project ARR for `years` calendar years starting with the year of `today`.
/// The first row equals [`current_arr`] exactly; later rows are prorations.
pub fn project_arr(customers: &[Customer], today: NaiveDate, years: u32) -> Vec<YearProjection> {
    let first_year = today.year();
    (0..years as i32)
        .map(|offset| {
            let year = first_year + offset;
            if offset == 0 {
                YearProjection {
                    year,
                    projected_arr: current_arr(customers, today),
                    contributing_customers: customers
                        .iter()
                        .filter(|c| contributes_to_arr(c, today))
                        .count(),
                    is_current_year: true,
                }
            } else {
                let (projected_arr, contributing_customers) =
                    prorated_revenue_for_year(customers, year);
                YearProjection {
                    year,
                    projected_arr,
                    contributing_customers,
                    is_current_year: false,
                }
            }
        })
        .collect()
}

/// One row per business segment, sorted by total revenue descending. Ties
/// keep the order in which segments first appear among `customers`.
///
/// Recurring revenue is each active contract prorated over `window`
/// (open-ended contracts run to the end of the window). This differs from
/// [`prorated_revenue_for_year`], which needs an end date: the window is
/// already in the past or present, so an open contract has certainly earned
/// its days in it, whereas a future year cannot assume an open contract
/// renews. Case revenue is attributed through the case's customer;
/// unattributed cases are left out.
pub fn revenue_by_segment(
    customers: &[Customer],
    cases: &[Case],
    window: &DateWindow,
) -> Vec<SegmentRevenue> {
    let mut rows: Vec<SegmentRevenue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut owner_segment: HashMap<Uuid, usize> = HashMap::with_capacity(customers.len());

    for customer in customers {
        let segment = customer.segment();
        let slot = match index.get(segment) {
            Some(&slot) => slot,
            None => {
                rows.push(SegmentRevenue {
                    business_type: segment.to_string(),
                    customers: 0,
                    active_customers: 0,
                    recurring_revenue: 0.0,
                    case_revenue: 0.0,
                    total_revenue: 0.0,
                });
                index.insert(segment.to_string(), rows.len() - 1);
                rows.len() - 1
            }
        };
        owner_segment.insert(customer.id, slot);

        let row = &mut rows[slot];
        row.customers += 1;
        if customer.is_active {
            row.active_customers += 1;
            row.recurring_revenue += prorated_revenue(customer, window);
        }
    }

    for case in cases {
        let Some(slot) = case.customer_id.and_then(|id| owner_segment.get(&id)) else {
            continue;
        };
        if let Some(revenue) = case.revenue_in(window) {
            rows[*slot].case_revenue += revenue;
        }
    }

    for row in &mut rows {
        row.total_revenue = row.recurring_revenue + row.case_revenue;
    }
    rows.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{case, customer, date};
    use pestops_core::types::OTHER_SEGMENT;

    fn contract(start: NaiveDate, end: Option<NaiveDate>, premium: f64) -> Customer {
        Customer {
            contract_start_date: Some(start),
            contract_end_date: end,
            ..customer(premium)
        }
    }

    #[test]
    fn test_full_leap_year_containment() {
        let customers = vec![contract(date(2024, 1, 1), Some(date(2024, 12, 31)), 36_500.0)];
        let (revenue, contributing) = prorated_revenue_for_year(&customers, 2024);
        assert_eq!(contributing, 1);
        assert!((revenue - 36_500.0 / 365.25 * 366.0).abs() < 1e-6);
        assert!((revenue - 36_600.0).abs() < 30.0);
    }

    #[test]
    fn test_partial_year_overlap() {
        // Ends mid-2026: 181 days of 2026 (Jan 1 – Jun 30).
        let customers = vec![contract(date(2024, 7, 1), Some(date(2026, 6, 30)), 36_525.0)];
        let (revenue, _) = prorated_revenue_for_year(&customers, 2026);
        assert!((revenue - 100.0 * 181.0).abs() < 1e-6);
        let (outside, contributing) = prorated_revenue_for_year(&customers, 2027);
        assert_eq!(outside, 0.0);
        assert_eq!(contributing, 0);
    }

    #[test]
    fn test_projection_requires_both_dates() {
        let open_ended = contract(date(2024, 1, 1), None, 10_000.0);
        let no_start = Customer {
            contract_start_date: None,
            contract_end_date: Some(date(2030, 1, 1)),
            ..customer(10_000.0)
        };
        let (revenue, contributing) = prorated_revenue_for_year(&[open_ended, no_start], 2025);
        assert_eq!(revenue, 0.0);
        assert_eq!(contributing, 0);
    }

    #[test]
    fn test_current_year_matches_live_arr() {
        let today = date(2024, 8, 15);
        let customers = vec![
            contract(date(2024, 1, 1), Some(date(2024, 12, 31)), 36_500.0),
            contract(date(2023, 3, 1), None, 12_000.0),
            contract(date(2022, 1, 1), Some(date(2024, 2, 1)), 9_000.0),
            Customer {
                is_active: false,
                ..contract(date(2024, 1, 1), Some(date(2026, 1, 1)), 5_000.0)
            },
        ];
        let rows = project_arr(&customers, today, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].year, 2024);
        assert!(rows[0].is_current_year);
        assert_eq!(rows[0].projected_arr, current_arr(&customers, today));
        assert_eq!(rows[0].contributing_customers, 2);
        assert_eq!(rows[1].year, 2025);
        assert_eq!(rows[1].projected_arr, 0.0);
        assert_eq!(rows[2].year, 2026);
    }

    #[test]
    fn test_empty_projection_is_zero() {
        let rows = project_arr(&[], date(2024, 1, 1), 2);
        assert!(rows.iter().all(|r| r.projected_arr == 0.0));
    }

    #[test]
    fn test_segment_rows_sorted_with_case_revenue() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let diner = Customer {
            business_type: Some("restaurant".into()),
            ..contract(date(2023, 1, 1), None, 3_652.5)
        };
        let shop = Customer {
            business_type: Some("retail".into()),
            ..contract(date(2024, 7, 1), Some(date(2024, 7, 10)), 36_525.0)
        };
        let unlabeled = contract(date(2024, 1, 1), Some(date(2024, 1, 1)), 365.25);
        let customers = vec![diner.clone(), shop.clone(), unlabeled];
        let cases = vec![
            case(Some(shop.id), 50.0, date(2024, 3, 1)),
            case(Some(diner.id), 10_000.0, date(2024, 5, 1)),
            case(None, 99_999.0, date(2024, 5, 1)),
        ];

        let rows = revenue_by_segment(&customers, &cases, &window);
        let labels: Vec<&str> = rows.iter().map(|r| r.business_type.as_str()).collect();
        assert_eq!(labels, vec!["restaurant", "retail", OTHER_SEGMENT]);

        // 10 per day over 366 days of 2024.
        assert!((rows[0].recurring_revenue - 3_660.0).abs() < 1e-6);
        assert!((rows[0].total_revenue - 13_660.0).abs() < 1e-6);
        // 100 per day for 10 days.
        assert!((rows[1].recurring_revenue - 1_000.0).abs() < 1e-6);
        assert!((rows[1].case_revenue - 50.0).abs() < 1e-9);
        assert!((rows[2].total_revenue - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_ended_contract_counts_for_segment_not_future_year() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let open_ended = contract(date(2023, 1, 1), None, 36_525.0);

        let rows = revenue_by_segment(std::slice::from_ref(&open_ended), &[], &window);
        assert!((rows[0].recurring_revenue - 100.0 * 366.0).abs() < 1e-6);

        let (projected, contributing) = prorated_revenue_for_year(&[open_ended], 2025);
        assert_eq!(projected, 0.0);
        assert_eq!(contributing, 0);
    }

    #[test]
    fn test_segment_ties_keep_first_seen_order() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let customers = vec![
            Customer {
                business_type: Some("b".into()),
                is_active: false,
                ..customer(0.0)
            },
            Customer {
                business_type: Some("a".into()),
                is_active: false,
                ..customer(0.0)
            },
        ];
        let rows = revenue_by_segment(&customers, &[], &window);
        assert_eq!(rows[0].business_type, "b");
        assert_eq!(rows[1].business_type, "a");
        assert_eq!(rows[0].active_customers, 0);
        assert_eq!(rows[0].customers, 1);
    }
}
