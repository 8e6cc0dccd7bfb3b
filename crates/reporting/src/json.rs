//! JSON export of the full report.

use pestops_core::PortalResult;
use pestops_revenue::RevenueReport;

pub fn to_json(report: &RevenueReport) -> PortalResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
