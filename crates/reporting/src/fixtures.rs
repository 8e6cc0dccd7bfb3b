//! A small report shared by the exporter tests.

use chrono::{NaiveDate, TimeZone, Utc};
use pestops_core::config::AnalyticsConfig;
use pestops_core::types::{Case, Customer, MonthlySpend};
use pestops_revenue::{build_report, ReportRequest, RevenueReport};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer(name: &str, segment: Option<&str>, premium: f64) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        company_name: name.to_string(),
        is_active: true,
        annual_premium: premium,
        contract_start_date: Some(date(2023, 1, 1)),
        contract_end_date: Some(date(2024, 10, 1)),
        business_type: segment.map(str::to_string),
        created_at: Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap(),
    }
}

/// Report as of 2024-06-15 over two customers, two cases and one spend row.
pub(crate) fn sample_report() -> RevenueReport {
    let bistro = customer("Joe's \"Best\" Bistro", Some("restaurant"), 12_000.0);
    let clinic = customer("Pinecrest Clinic", None, 6_000.0);
    let cases = vec![
        Case {
            id: Uuid::new_v4(),
            customer_id: Some(bistro.id),
            price: Some(850.0),
            completed_date: Some(date(2024, 6, 1)),
            pest_type: Some("rodents".into()),
            assigned_technician_name: Some("Dana Reyes".into()),
        },
        Case {
            id: Uuid::new_v4(),
            customer_id: None,
            price: Some(275.0),
            completed_date: Some(date(2024, 6, 7)),
            pest_type: None,
            assigned_technician_name: None,
        },
    ];
    let spend = vec![MonthlySpend {
        month: date(2024, 6, 1),
        spend: 1_500.0,
        notes: None,
    }];
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let request = ReportRequest::from_config(&AnalyticsConfig::default(), now);
    build_report(&[bistro, clinic], &cases, &spend, &request).unwrap()
}
