//! Report service: one fetch per record set, then pure computation.

use crate::report::{build_report, ReportRequest, RevenueReport};
use pestops_core::config::AnalyticsConfig;
use pestops_core::PortalResult;
use pestops_store::RecordRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Generates revenue reports from a record repository.
///
/// Holds no state between calls. Concurrent requests share nothing but the
/// repository handle.
#[derive(Clone)]
pub struct RevenueReportService {
    repository: Arc<dyn RecordRepository>,
    defaults: AnalyticsConfig,
}

impl RevenueReportService {
    pub fn new(repository: Arc<dyn RecordRepository>, defaults: AnalyticsConfig) -> Self {
        Self {
            repository,
            defaults,
        }
    }

    pub fn defaults(&self) -> &AnalyticsConfig {
        &self.defaults
    }

    /// A request populated from the configured defaults.
    pub fn default_request(&self, now: chrono::DateTime<chrono::Utc>) -> ReportRequest {
        ReportRequest::from_config(&self.defaults, now)
    }

    /// Fetch a fresh snapshot and build the report. Any fetch failure aborts
    /// the whole report; nothing partial is returned.
    pub async fn generate(&self, request: &ReportRequest) -> PortalResult<RevenueReport> {
        request.validate()?;
        let started = Instant::now();

        let customers = self.repository.fetch_customers().await.inspect_err(|e| {
            error!(error = %e, "Customer fetch failed");
            metrics::counter!("revenue.reports.fetch_failures").increment(1);
        })?;
        let cases = self.repository.fetch_priced_cases().await.inspect_err(|e| {
            error!(error = %e, "Case fetch failed");
            metrics::counter!("revenue.reports.fetch_failures").increment(1);
        })?;

        let month = request.resolved_month().window();
        let spend = self
            .repository
            .fetch_monthly_spend(month.start, month.end)
            .await
            .inspect_err(|e| {
                error!(error = %e, "Monthly spend fetch failed");
                metrics::counter!("revenue.reports.fetch_failures").increment(1);
            })?;

        debug!(
            customers = customers.len(),
            cases = cases.len(),
            spend_rows = spend.len(),
            "Fetched record snapshot"
        );

        let report = build_report(&customers, &cases, &spend, request)?;

        metrics::counter!("revenue.reports.generated").increment(1);
        metrics::histogram!("revenue.reports.duration_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            as_of = %report.as_of,
            current_arr = report.arr.current_arr,
            active_customers = report.arr.active_customers,
            churn_rate = report.retention.churn_rate,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Revenue report generated"
        );
        Ok(report)
    }
}
