//! Point-in-time recurring revenue and one-off case revenue.

use chrono::NaiveDate;
use pestops_core::types::{Case, Customer, DateWindow};
use serde::{Deserialize, Serialize};

/// Recurring and one-off revenue as of a single date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrSummary {
    pub as_of: NaiveDate,
    pub window: DateWindow,
    pub current_arr: f64,
    pub monthly_recurring_revenue: f64,
    /// Priced cases completed inside `window`.
    pub additional_case_revenue: f64,
    /// `current_arr + additional_case_revenue`.
    pub total_revenue: f64,
    /// Customers contributing to `current_arr`.
    pub active_customers: usize,
    /// 0.0 when there are no active customers.
    pub average_arr_per_customer: f64,
}

/// Whether a customer's premium counts toward ARR on `as_of`.
///
/// The manual `is_active` flag is an override: an inactive customer never
/// counts, whatever its dates say. An active customer counts while its
/// contract has no end date or ends strictly after `as_of`.
pub fn contributes_to_arr(customer: &Customer, as_of: NaiveDate) -> bool {
    customer.is_active && customer.contract_end_date.map_or(true, |end| end > as_of)
}

pub fn current_arr(customers: &[Customer], as_of: NaiveDate) -> f64 {
    customers
        .iter()
        .filter(|c| contributes_to_arr(c, as_of))
        .map(Customer::premium)
        .sum()
}

pub fn monthly_recurring_revenue(arr: f64) -> f64 {
    arr / 12.0
}

/// Sum of case prices completed within `window`. Unpriced and uncompleted
/// cases contribute nothing; unattributed cases still count.
pub fn additional_case_revenue(cases: &[Case], window: &DateWindow) -> f64 {
    cases.iter().filter_map(|c| c.revenue_in(window)).sum()
}

pub fn average_arr_per_customer(arr: f64, active_customers: usize) -> f64 {
    if active_customers == 0 {
        0.0
    } else {
        arr / active_customers as f64
    }
}

pub fn summarize(
    customers: &[Customer],
    cases: &[Case],
    as_of: NaiveDate,
    window: DateWindow,
) -> ArrSummary {
    let active_customers = customers
        .iter()
        .filter(|c| contributes_to_arr(c, as_of))
        .count();
    let current_arr = current_arr(customers, as_of);
    let case_revenue = additional_case_revenue(cases, &window);

    ArrSummary {
        as_of,
        window,
        current_arr,
        monthly_recurring_revenue: monthly_recurring_revenue(current_arr),
        additional_case_revenue: case_revenue,
        total_revenue: current_arr + case_revenue,
        active_customers,
        average_arr_per_customer: average_arr_per_customer(current_arr, active_customers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{case, customer, date};

    #[test]
    fn test_single_open_ended_customer() {
        let customers = vec![customer(12_000.0)];
        let arr = current_arr(&customers, date(2024, 6, 1));
        assert!((arr - 12_000.0).abs() < 1e-9);
        assert!((monthly_recurring_revenue(arr) - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_adding_customer_adds_exact_premium() {
        let as_of = date(2024, 6, 1);
        let mut customers = vec![customer(5_000.0), customer(7_250.5)];
        let before = current_arr(&customers, as_of);
        customers.push(customer(3_333.0));
        let after = current_arr(&customers, as_of);
        assert!((after - before - 3_333.0).abs() < 1e-9);
    }

    #[test]
    fn test_inactive_flag_overrides_dates() {
        let as_of = date(2024, 6, 1);
        let mut customers = vec![
            customer(5_000.0),
            Customer {
                contract_end_date: Some(date(2030, 1, 1)),
                ..customer(8_000.0)
            },
        ];
        let before = current_arr(&customers, as_of);
        customers[1].is_active = false;
        let after = current_arr(&customers, as_of);
        assert!((before - after - 8_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_contract_ending_on_as_of_is_excluded() {
        let as_of = date(2024, 6, 1);
        let ends_today = Customer {
            contract_end_date: Some(as_of),
            ..customer(4_000.0)
        };
        let ends_tomorrow = Customer {
            contract_end_date: Some(date(2024, 6, 2)),
            ..customer(1_000.0)
        };
        let arr = current_arr(&[ends_today, ends_tomorrow], as_of);
        assert!((arr - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_revenue_window_and_pricing() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let mut unpriced = case(None, 0.0, date(2024, 2, 1));
        unpriced.price = None;
        let mut open = case(None, 500.0, date(2024, 2, 1));
        open.completed_date = None;
        let cases = vec![
            case(None, 200.0, date(2024, 1, 1)),
            case(None, 300.0, date(2024, 3, 31)),
            case(None, 900.0, date(2024, 4, 1)),
            case(None, -50.0, date(2024, 2, 1)),
            unpriced,
            open,
        ];
        assert!((additional_case_revenue(&cases, &window) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_totals_and_average() {
        let as_of = date(2024, 6, 1);
        let window = DateWindow::new(date(2024, 1, 1), as_of).unwrap();
        let inactive = Customer {
            is_active: false,
            ..customer(9_999.0)
        };
        let customers = vec![customer(6_000.0), customer(4_000.0), inactive];
        let cases = vec![case(Some(customers[0].id), 250.0, date(2024, 5, 5))];

        let summary = summarize(&customers, &cases, as_of, window);
        assert_eq!(summary.active_customers, 2);
        assert!((summary.current_arr - 10_000.0).abs() < 1e-9);
        assert!((summary.total_revenue - 10_250.0).abs() < 1e-9);
        assert!((summary.average_arr_per_customer - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_active_customers_average_is_zero() {
        let as_of = date(2024, 6, 1);
        let window = DateWindow::new(date(2024, 1, 1), as_of).unwrap();
        let summary = summarize(&[], &[], as_of, window);
        assert_eq!(summary.active_customers, 0);
        assert_eq!(summary.average_arr_per_customer, 0.0);
        assert!(summary.average_arr_per_customer.is_finite());
    }
}
