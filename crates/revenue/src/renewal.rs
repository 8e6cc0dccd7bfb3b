//! Renewal risk: active contracts bucketed by time to expiry.

use chrono::{Months, NaiveDate};
use pestops_core::types::Customer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryBucket {
    /// Ends within 3 months.
    Within3Months,
    /// Ends after 3 and within 6 months.
    Within6Months,
    /// Ends after 6 and within 12 months.
    Within12Months,
}

/// Contract counts and premium at stake per expiry bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenewalBuckets {
    pub expiring_3_months: usize,
    pub expiring_6_months: usize,
    pub expiring_12_months: usize,
    pub arr_expiring_3_months: f64,
    pub arr_expiring_6_months: f64,
    pub arr_expiring_12_months: f64,
    /// Customer ids per bucket, in input order.
    pub customers_3_months: Vec<Uuid>,
    pub customers_6_months: Vec<Uuid>,
    pub customers_12_months: Vec<Uuid>,
}

impl RenewalBuckets {
    pub fn total_expiring(&self) -> usize {
        self.expiring_3_months + self.expiring_6_months + self.expiring_12_months
    }
}

/// Which bucket, if any, an end date falls into relative to `today`.
/// Dates on or before `today` and beyond twelve months fall in none.
pub fn bucket_for(end: NaiveDate, today: NaiveDate) -> Option<ExpiryBucket> {
    if end <= today {
        return None;
    }
    let horizon = |months: u32| today.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX);
    if end <= horizon(3) {
        Some(ExpiryBucket::Within3Months)
    } else if end <= horizon(6) {
        Some(ExpiryBucket::Within6Months)
    } else if end <= horizon(12) {
        Some(ExpiryBucket::Within12Months)
    } else {
        None
    }
}

/// Bucket every active customer whose contract ends after `today`.
/// Open-ended contracts never expire and are left out.
pub fn bucket_renewals(customers: &[Customer], today: NaiveDate) -> RenewalBuckets {
    let mut buckets = RenewalBuckets::default();
    for customer in customers.iter().filter(|c| c.is_active) {
        let Some(end) = customer.contract_end_date else {
            continue;
        };
        let premium = customer.premium();
        match bucket_for(end, today) {
            Some(ExpiryBucket::Within3Months) => {
                buckets.expiring_3_months += 1;
                buckets.arr_expiring_3_months += premium;
                buckets.customers_3_months.push(customer.id);
            }
            Some(ExpiryBucket::Within6Months) => {
                buckets.expiring_6_months += 1;
                buckets.arr_expiring_6_months += premium;
                buckets.customers_6_months.push(customer.id);
            }
            Some(ExpiryBucket::Within12Months) => {
                buckets.expiring_12_months += 1;
                buckets.arr_expiring_12_months += premium;
                buckets.customers_12_months.push(customer.id);
            }
            None => {}
        }
    }
    buckets
}
