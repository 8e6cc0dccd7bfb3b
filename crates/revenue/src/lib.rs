//! Subscription revenue analytics: ARR/MRR, cohort retention, renewal
//! buckets, multi-year projections, upsell ranking and unit economics.
//!
//! Every calculation is a pure function over record snapshots. The
//! [`RevenueReportService`] is the only piece that touches a
//! [`RecordRepository`](pestops_store::RecordRepository), and it does so once
//! per record set before handing plain slices to the calculators.

pub mod arr;
pub mod casework;
pub mod economics;
pub mod growth;
pub mod projection;
pub mod proration;
pub mod renewal;
pub mod report;
pub mod retention;
pub mod service;
pub mod upsell;

#[cfg(test)]
pub(crate) mod fixtures;

pub use arr::ArrSummary;
pub use report::{build_report, ReportRequest, RevenueReport};
pub use service::RevenueReportService;
