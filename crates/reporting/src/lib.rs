//! Revenue report export: CSV, JSON and plain-text tables.
//!
//! Every format is rendered from the same [`RevenueReport`]; the CSV and text
//! outputs share the row model in [`rows`].

pub mod csv;
pub mod json;
pub mod rows;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

use pestops_core::{PortalError, PortalResult};
use pestops_revenue::RevenueReport;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use rows::{MetricRow, MetricUnit, Table};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Table,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Table => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "table" | "text" => Ok(Self::Table),
            other => Err(PortalError::Validation(format!(
                "unknown export format '{other}', expected json, csv or table"
            ))),
        }
    }
}

/// Render `report` in `format`.
pub fn render(report: &RevenueReport, format: ExportFormat) -> PortalResult<String> {
    let out = match format {
        ExportFormat::Json => json::to_json(report)?,
        ExportFormat::Csv => csv::to_csv(report),
        ExportFormat::Table => table::to_text(report),
    };
    tracing::debug!(format = ?format, bytes = out.len(), "Rendered revenue report");
    Ok(out)
}
