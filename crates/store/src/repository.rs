//! RecordRepository trait definition.

use async_trait::async_trait;
use chrono::NaiveDate;
use pestops_core::types::{Case, Customer, MonthlySpend};
use pestops_core::PortalResult;

/// Read-only interface to the contract record store.
///
/// Every call is a plain request/response fetch with no retry of its own; a
/// failure surfaces as [`PortalError::Fetch`](pestops_core::PortalError::Fetch)
/// and aborts the report that asked for it.
///
/// # Implementations
///
/// - `InMemoryRepository`: DashMap-backed store for development and tests
/// - `JsonSnapshotRepository`: reads exported JSON files from a directory
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// All customers, ordered by `created_at` then `id`.
    async fn fetch_customers(&self) -> PortalResult<Vec<Customer>>;

    /// Cases carrying a positive price. Unpriced cases never affect revenue,
    /// so stores are free to filter them out at query time.
    async fn fetch_priced_cases(&self) -> PortalResult<Vec<Case>>;

    /// Spend ledger rows whose `month` falls in `[from, to]`.
    async fn fetch_monthly_spend(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortalResult<Vec<MonthlySpend>>;
}

/// Shared ordering for customer snapshots so ranking ties are reproducible
/// no matter how the backing store iterates.
pub(crate) fn sort_customers(customers: &mut [Customer]) {
    customers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

pub(crate) fn is_priced(case: &Case) -> bool {
    case.price.is_some_and(|p| p.is_finite() && p > 0.0)
}
