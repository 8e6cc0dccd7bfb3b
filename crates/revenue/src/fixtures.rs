//! Record builders shared by the calculator tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pestops_core::types::{Case, Customer, MonthlySpend};
use uuid::Uuid;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Active, open-ended customer created at the start of 2020.
pub(crate) fn customer(premium: f64) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        company_name: format!("Customer {premium}"),
        is_active: true,
        annual_premium: premium,
        contract_start_date: Some(date(2020, 1, 1)),
        contract_end_date: None,
        business_type: None,
        created_at: at(2020, 1, 1),
    }
}

pub(crate) fn case(owner: Option<Uuid>, price: f64, completed: NaiveDate) -> Case {
    Case {
        id: Uuid::new_v4(),
        customer_id: owner,
        price: Some(price),
        completed_date: Some(completed),
        pest_type: None,
        assigned_technician_name: None,
    }
}

pub(crate) fn spend(month: NaiveDate, amount: f64) -> MonthlySpend {
    MonthlySpend {
        month,
        spend: amount,
        notes: None,
    }
}
