//! REST API handlers for the revenue report and operational endpoints.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pestops_core::types::{DateWindow, ReportMonth};
use pestops_core::{PortalError, PortalResult};
use pestops_reporting::ExportFormat;
use pestops_revenue::{ReportRequest, RevenueReport, RevenueReportService};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: RevenueReportService,
    pub node_id: String,
    pub start_time: Instant,
    /// Flipped once the listener is bound.
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(service: RevenueReportService, node_id: impl Into<String>) -> Self {
        Self {
            service,
            node_id: node_id.into(),
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }
}

/// Query parameters accepted by the report endpoints. Anything left out falls
/// back to the configured analytics defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Report date; defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub trailing_days: Option<u32>,
    pub years: Option<u32>,
    pub top_k: Option<usize>,
    /// `YYYY-MM` month for unit economics.
    pub month: Option<String>,
}

impl ReportQuery {
    pub fn into_request(
        self,
        service: &RevenueReportService,
        clock: DateTime<Utc>,
    ) -> PortalResult<ReportRequest> {
        let now = match self.as_of {
            Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
            None => clock,
        };
        let mut request = service.default_request(now);

        request.window = match (self.window_start, self.window_end) {
            (Some(start), Some(end)) => Some(DateWindow::new(start, end)?),
            (None, None) => None,
            _ => {
                return Err(PortalError::Validation(
                    "window_start and window_end must be given together".into(),
                ))
            }
        };
        if let Some(days) = self.trailing_days {
            request.trailing_period_days = days;
        }
        if let Some(years) = self.years {
            request.projection_years = years;
        }
        if let Some(k) = self.top_k {
            request.upsell_top_k = k;
        }
        if let Some(month) = self.month.as_deref() {
            request.economics_month = Some(ReportMonth::parse(month)?);
        }
        request.validate()?;
        Ok(request)
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

/// Map a domain error onto a status code and a JSON body.
pub fn error_response(err: &PortalError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match err {
        PortalError::Validation(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
        e if e.is_fetch_failure() => (
            StatusCode::BAD_GATEWAY,
            "record_store_unavailable",
            "Record store unavailable".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "report_failed",
            "Internal processing error".to_string(),
        ),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message,
        }),
    )
}

async fn build(state: &AppState, query: ReportQuery) -> ApiResult<RevenueReport> {
    metrics::counter!("api.report_requests").increment(1);

    let request = query.into_request(&state.service, Utc::now()).map_err(|e| {
        warn!(error = %e, "Report request validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        error_response(&e)
    })?;

    state.service.generate(&request).await.map_err(|e| {
        error!(error = %e, node_id = %state.node_id, "Report generation failed");
        metrics::counter!("api.errors").increment(1);
        error_response(&e)
    })
}

/// GET /v1/revenue/report: full report as JSON.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<RevenueReport>> {
    build(&state, query).await.map(Json)
}

/// GET /v1/revenue/report.csv: headline rows plus breakdown tables.
pub async fn get_report_csv(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = build(&state, query).await?;
    let format = ExportFormat::Csv;
    let body = pestops_reporting::render(&report, format).map_err(|e| {
        error!(error = %e, "CSV export failed");
        error_response(&e)
    })?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body))
}

/// GET /health: Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready: 200 once the listener is bound, 503 before.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.ready.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live: always 200 while the process runs.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pestops_core::config::AnalyticsConfig;
    use pestops_store::InMemoryRepository;

    fn service() -> RevenueReportService {
        RevenueReportService::new(Arc::new(InMemoryRepository::new()), AnalyticsConfig::default())
    }

    fn clock() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let req = ReportQuery::default().into_request(&service(), clock()).unwrap();
        assert_eq!(req.now, clock());
        assert_eq!(req.projection_years, 3);
        assert_eq!(req.trailing_period_days, 30);
        assert!(req.window.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let query = ReportQuery {
            as_of: NaiveDate::from_ymd_opt(2024, 1, 31),
            window_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            window_end: NaiveDate::from_ymd_opt(2024, 1, 31),
            trailing_days: Some(90),
            years: Some(5),
            top_k: Some(3),
            month: Some("2023-12".into()),
        };
        let req = query.into_request(&service(), clock()).unwrap();
        assert_eq!(req.today(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(req.trailing_period_days, 90);
        assert_eq!(req.projection_years, 5);
        assert_eq!(req.upsell_top_k, 3);
        assert_eq!(req.economics_month, Some(ReportMonth::new(2023, 12).unwrap()));
        assert_eq!(req.resolved_window().len_days(), 31);
    }

    #[test]
    fn test_bad_queries_are_validation_errors() {
        let half_window = ReportQuery {
            window_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let too_many_years = ReportQuery {
            years: Some(11),
            ..Default::default()
        };
        let bad_month = ReportQuery {
            month: Some("2024-13".into()),
            ..Default::default()
        };
        for query in [half_window, too_many_years, bad_month] {
            let err = query.into_request(&service(), clock()).unwrap_err();
            assert!(matches!(err, PortalError::Validation(_)));
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = error_response(&PortalError::Validation("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.message, "bad");

        let (status, body) = error_response(&PortalError::Fetch("db down".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.0.error, "record_store_unavailable");

        let (status, _) = error_response(&PortalError::Config("bad file".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
