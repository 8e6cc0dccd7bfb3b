//! Read-only access to the contract record store.
//!
//! The analytics engine never talks to a database directly; it is handed a
//! [`RecordRepository`] and pulls one snapshot of each record set per report.
//! Two implementations ship here: a DashMap-backed in-memory store for
//! development and tests, and a JSON snapshot directory reader for offline
//! reports.

pub mod memory;
pub mod repository;
pub mod snapshot;

pub use memory::InMemoryRepository;
pub use repository::RecordRepository;
pub use snapshot::JsonSnapshotRepository;
