//! The combined revenue report handed to the dashboard and export layers.

use crate::arr::{self, ArrSummary};
use crate::casework::{self, CaseRevenueRow};
use crate::economics::{self, UnitEconomics};
use crate::growth::{self, MonthlyGrowth};
use crate::projection::{self, SegmentRevenue, YearProjection};
use crate::renewal::{self, RenewalBuckets};
use crate::retention::{self, RetentionMetrics};
use crate::upsell::{self, UpsellCandidate};
use chrono::{DateTime, NaiveDate, Utc};
use pestops_core::config::AnalyticsConfig;
use pestops_core::types::{Case, Customer, DateWindow, MonthlySpend, ReportMonth};
use pestops_core::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};

pub const MAX_PROJECTION_YEARS: u32 = 10;
/// A century of trailing days; anything longer is not a retention period.
pub const MAX_TRAILING_DAYS: u32 = 36_500;

/// Parameters for one report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub now: DateTime<Utc>,
    /// Window for one-off and prorated revenue. Defaults to the trailing
    /// `reporting_window_days` ending today.
    pub window: Option<DateWindow>,
    pub reporting_window_days: u32,
    pub trailing_period_days: u32,
    pub projection_years: u32,
    pub upsell_top_k: usize,
    pub upsell_lookback_months: u32,
    /// Month for unit economics. Defaults to the month containing `now`.
    pub economics_month: Option<ReportMonth>,
}

impl ReportRequest {
    pub fn from_config(config: &AnalyticsConfig, now: DateTime<Utc>) -> Self {
        Self {
            now,
            window: None,
            reporting_window_days: config.reporting_window_days,
            trailing_period_days: config.trailing_period_days,
            projection_years: config.projection_years,
            upsell_top_k: config.upsell_top_k,
            upsell_lookback_months: config.upsell_lookback_months,
            economics_month: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn resolved_window(&self) -> DateWindow {
        self.window
            .unwrap_or_else(|| DateWindow::trailing_days(self.today(), self.reporting_window_days))
    }

    pub fn resolved_month(&self) -> ReportMonth {
        self.economics_month
            .unwrap_or_else(|| ReportMonth::containing(self.today()))
    }

    pub fn validate(&self) -> PortalResult<()> {
        if let Some(window) = &self.window {
            if window.start > window.end {
                return Err(PortalError::Validation(format!(
                    "window start {} is after window end {}",
                    window.start, window.end
                )));
            }
        }
        if self.trailing_period_days == 0 || self.trailing_period_days > MAX_TRAILING_DAYS {
            return Err(PortalError::Validation(format!(
                "trailing period must be between 1 and {MAX_TRAILING_DAYS} days, got {}",
                self.trailing_period_days
            )));
        }
        if self.projection_years == 0 || self.projection_years > MAX_PROJECTION_YEARS {
            return Err(PortalError::Validation(format!(
                "projection years must be between 1 and {MAX_PROJECTION_YEARS}, got {}",
                self.projection_years
            )));
        }
        Ok(())
    }
}

/// Everything the dashboard renders for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueReport {
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub window: DateWindow,
    pub arr: ArrSummary,
    pub retention: RetentionMetrics,
    pub renewals: RenewalBuckets,
    pub segments: Vec<SegmentRevenue>,
    pub projections: Vec<YearProjection>,
    pub upsell: Vec<UpsellCandidate>,
    pub unit_economics: UnitEconomics,
    pub growth: MonthlyGrowth,
    pub technicians: Vec<CaseRevenueRow>,
    pub pest_types: Vec<CaseRevenueRow>,
}

/// Run every calculator over one snapshot of records.
pub fn build_report(
    customers: &[Customer],
    cases: &[Case],
    spend: &[MonthlySpend],
    request: &ReportRequest,
) -> PortalResult<RevenueReport> {
    request.validate()?;
    let today = request.today();
    let window = request.resolved_window();

    let arr = arr::summarize(customers, cases, today, window);
    let retention = retention::compute_retention(customers, request.now, request.trailing_period_days);
    let unit_economics = economics::compute_unit_economics(
        customers,
        spend,
        request.resolved_month(),
        arr.average_arr_per_customer,
        retention.churn_rate,
    );

    Ok(RevenueReport {
        generated_at: request.now,
        as_of: today,
        window,
        renewals: renewal::bucket_renewals(customers, today),
        segments: projection::revenue_by_segment(customers, cases, &window),
        projections: projection::project_arr(customers, today, request.projection_years),
        upsell: upsell::rank_upsell_candidates(
            customers,
            cases,
            today,
            request.upsell_lookback_months,
            request.upsell_top_k,
        ),
        growth: growth::monthly_growth(customers, request.now),
        technicians: casework::revenue_by_technician(cases, &window),
        pest_types: casework::revenue_by_pest_type(cases, &window),
        arr,
        retention,
        unit_economics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, case, customer, date, spend};

    fn request(now: DateTime<Utc>) -> ReportRequest {
        ReportRequest::from_config(&AnalyticsConfig::default(), now)
    }

    #[test]
    fn test_defaults_resolve_from_now() {
        let req = request(at(2024, 6, 15));
        assert_eq!(req.resolved_month(), ReportMonth::new(2024, 6).unwrap());
        let window = req.resolved_window();
        assert_eq!(window.end, date(2024, 6, 15));
        assert_eq!(window.len_days(), 365);
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        let mut req = request(at(2024, 6, 15));
        req.projection_years = 0;
        assert!(matches!(req.validate(), Err(PortalError::Validation(_))));

        let mut req = request(at(2024, 6, 15));
        req.trailing_period_days = 0;
        assert!(build_report(&[], &[], &[], &req).is_err());

        let mut req = request(at(2024, 6, 15));
        req.window = Some(DateWindow {
            start: date(2024, 6, 1),
            end: date(2024, 5, 1),
        });
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_oversized_trailing_period_is_rejected() {
        let mut req = request(at(2024, 6, 15));
        req.trailing_period_days = MAX_TRAILING_DAYS;
        assert!(req.validate().is_ok());

        req.trailing_period_days = 100_000_000;
        assert!(matches!(req.validate(), Err(PortalError::Validation(_))));
        assert!(matches!(
            build_report(&[customer(1.0)], &[], &[], &req),
            Err(PortalError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_snapshot_renders_zeros() {
        let report = build_report(&[], &[], &[], &request(at(2024, 6, 15))).unwrap();
        assert_eq!(report.arr.current_arr, 0.0);
        assert_eq!(report.retention.churn_rate, 0.0);
        assert_eq!(report.renewals.total_expiring(), 0);
        assert!(report.segments.is_empty());
        assert_eq!(report.projections.len(), 3);
        assert!(report.upsell.is_empty());
        assert_eq!(report.unit_economics.customer_acquisition_cost, 0.0);
        assert_eq!(report.growth.end_mrr, 0.0);
    }

    #[test]
    fn test_report_sections_agree() {
        let now = at(2024, 6, 15);
        let anchor = customer(12_000.0);
        let mut churned = customer(6_000.0);
        churned.is_active = false;
        churned.contract_end_date = Some(date(2024, 6, 1));
        let customers = vec![anchor.clone(), churned];
        let cases = vec![case(Some(anchor.id), 1_200.0, date(2024, 6, 1))];
        let rows = vec![spend(date(2024, 6, 1), 900.0)];

        let report = build_report(&customers, &cases, &rows, &request(now)).unwrap();
        assert_eq!(report.projections[0].projected_arr, report.arr.current_arr);
        assert!((report.arr.monthly_recurring_revenue - 1_000.0).abs() < 1e-9);
        assert!((report.retention.churn_rate - 50.0).abs() < 1e-9);
        // avg 12000 / 0.5 churn
        assert!((report.unit_economics.lifetime_value - 24_000.0).abs() < 1e-9);
        assert!((report.unit_economics.marketing_spend - 900.0).abs() < 1e-9);
        assert_eq!(report.upsell.len(), 1);
        assert!((report.upsell[0].ratio - 0.1).abs() < 1e-9);
        assert_eq!(report.technicians.len(), 1);
        assert!(
            (report.growth.start_mrr + report.growth.net_change_mrr - report.growth.end_mrr).abs()
                < 1e-9
        );
    }
}
