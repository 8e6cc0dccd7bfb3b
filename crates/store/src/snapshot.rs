//! Record snapshots exported from the portal database as JSON files.
//!
//! Layout of the snapshot directory:
//!
//! - `customers.json`: array of customer records (required)
//! - `cases.json`: array of case records (required)
//! - `monthly_spend.json`: array of spend rows (optional, absent = no spend)

use crate::repository::{is_priced, sort_customers, RecordRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use pestops_core::types::{Case, Customer, MonthlySpend};
use pestops_core::{PortalError, PortalResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CUSTOMERS_FILE: &str = "customers.json";
pub const CASES_FILE: &str = "cases.json";
pub const MONTHLY_SPEND_FILE: &str = "monthly_spend.json";

/// Reads records from a snapshot directory on every fetch.
#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    dir: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_records<T: DeserializeOwned>(&self, file: &str) -> PortalResult<Vec<T>> {
        let path = self.dir.join(file);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PortalError::Fetch(format!("reading {}: {e}", path.display())))?;
        let records: Vec<T> = serde_json::from_str(&raw)
            .map_err(|e| PortalError::Fetch(format!("parsing {}: {e}", path.display())))?;
        debug!(file = %path.display(), records = records.len(), "Loaded snapshot file");
        Ok(records)
    }
}

#[async_trait]
impl RecordRepository for JsonSnapshotRepository {
    async fn fetch_customers(&self) -> PortalResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.read_records(CUSTOMERS_FILE).await?;
        sort_customers(&mut customers);
        Ok(customers)
    }

    async fn fetch_priced_cases(&self) -> PortalResult<Vec<Case>> {
        let cases: Vec<Case> = self.read_records(CASES_FILE).await?;
        Ok(cases.into_iter().filter(is_priced).collect())
    }

    async fn fetch_monthly_spend(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortalResult<Vec<MonthlySpend>> {
        if !tokio::fs::try_exists(self.dir.join(MONTHLY_SPEND_FILE))
            .await
            .unwrap_or(false)
        {
            debug!(dir = %self.dir.display(), "No spend ledger in snapshot");
            return Ok(Vec::new());
        }
        let rows: Vec<MonthlySpend> = self.read_records(MONTHLY_SPEND_FILE).await?;
        Ok(rows
            .into_iter()
            .filter(|r| from <= r.month && r.month <= to)
            .collect())
    }
}
