//! In-memory record store backed by DashMap.
//!
//! Production: the portal's relational store sits behind the same trait.
//! This provides the same API surface for development and testing.

use crate::repository::{is_priced, sort_customers, RecordRepository};
use async_trait::async_trait;
use chrono::{Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use dashmap::DashMap;
use pestops_core::types::{Case, Customer, MonthlySpend};
use pestops_core::{PortalError, PortalResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

/// Thread-safe in-memory store for customers, cases and the spend ledger.
pub struct InMemoryRepository {
    customers: DashMap<Uuid, Customer>,
    cases: DashMap<Uuid, Case>,
    /// Keyed by the row's `month`; a second write for the same month replaces the first.
    spend: DashMap<NaiveDate, MonthlySpend>,
    offline: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            cases: DashMap::new(),
            spend: DashMap::new(),
            offline: AtomicBool::new(false),
        }
    }

    /// Build a store pre-populated with demo data relative to `today`.
    pub fn with_demo_data(today: NaiveDate) -> Self {
        let store = Self::new();
        store.seed_demo_data(today);
        store
    }

    // ─── Customers ─────────────────────────────────────────────────────────

    pub fn upsert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn get_customer(&self, id: Uuid) -> Option<Customer> {
        self.customers.get(&id).map(|r| r.value().clone())
    }

    /// Flip the manual active flag. Returns the updated record.
    pub fn set_customer_active(&self, id: Uuid, is_active: bool) -> Option<Customer> {
        self.customers.get_mut(&id).map(|mut entry| {
            entry.value_mut().is_active = is_active;
            entry.value().clone()
        })
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    // ─── Cases ─────────────────────────────────────────────────────────────

    pub fn upsert_case(&self, case: Case) {
        self.cases.insert(case.id, case);
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    // ─── Spend ledger ──────────────────────────────────────────────────────

    /// Insert or update the spend row for `month`.
    pub fn upsert_monthly_spend(&self, month: NaiveDate, spend: f64, notes: Option<String>) -> MonthlySpend {
        let row = MonthlySpend { month, spend, notes };
        self.spend.insert(month, row.clone());
        row
    }

    pub fn spend_row_count(&self) -> usize {
        self.spend.len()
    }

    // ─── Availability ──────────────────────────────────────────────────────

    /// Make every fetch fail until switched back, mimicking an unreachable store.
    pub fn set_offline(&self, offline: bool) {
        if offline {
            warn!("In-memory record store switched offline");
        }
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self, what: &str) -> PortalResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            metrics::counter!("store.fetch_failures").increment(1);
            return Err(PortalError::Fetch(format!(
                "record store unavailable while fetching {what}"
            )));
        }
        Ok(())
    }

    // ─── Demo data ─────────────────────────────────────────────────────────

    /// Seed a small book of business: eight contracts across four segments,
    /// a spread of one-off cases, and three months of marketing spend.
    pub fn seed_demo_data(&self, today: NaiveDate) {
        let months_ago = |n: u32| today.checked_sub_months(Months::new(n)).unwrap_or(today);
        let months_ahead = |n: u32| today.checked_add_months(Months::new(n)).unwrap_or(today);
        let created = |d: NaiveDate| {
            Utc.with_ymd_and_hms(d.year(), d.month(), d.day(), 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now)
        };

        let book = [
            ("Harbor Bistro", "restaurant", 14_400.0, 26, Some(2), true),
            ("Main Street Grocers", "retail", 9_600.0, 18, Some(5), true),
            ("Oakridge Apartments", "residential", 21_000.0, 30, None, true),
            ("Sunrise Bakery", "restaurant", 6_000.0, 14, Some(10), true),
            ("Pinecrest Clinic", "healthcare", 18_000.0, 9, Some(15), true),
            ("Lakeside Diner", "restaurant", 7_200.0, 20, Some(1), false),
            ("Corner Hardware", "retail", 4_800.0, 0, None, true),
            ("Valley Warehouse", "", 12_000.0, 40, Some(8), true),
        ];

        let mut ids = Vec::with_capacity(book.len());
        for (name, segment, premium, start_months_ago, end_months_ahead, active) in book {
            let start = months_ago(start_months_ago);
            let customer = Customer {
                id: Uuid::new_v4(),
                company_name: name.to_string(),
                is_active: active,
                annual_premium: premium,
                contract_start_date: Some(start),
                contract_end_date: end_months_ahead.map(months_ahead),
                business_type: (!segment.is_empty()).then(|| segment.to_string()),
                created_at: created(start),
            };
            ids.push(customer.id);
            self.upsert_customer(customer);
        }

        let work = [
            (0, "rodents", "Dana Reyes", 850.0, 12),
            (0, "cockroaches", "Dana Reyes", 420.0, 40),
            (1, "ants", "Sam Patel", 300.0, 25),
            (3, "rodents", "Sam Patel", 1_250.0, 70),
            (4, "bed bugs", "Lee Morgan", 2_400.0, 5),
            (6, "termites", "Lee Morgan", 3_100.0, 3),
            (2, "wasps", "Dana Reyes", 180.0, 200),
        ];
        for (owner, pest, tech, price, days_ago) in work {
            self.upsert_case(Case {
                id: Uuid::new_v4(),
                customer_id: ids.get(owner).copied(),
                price: Some(price),
                completed_date: today.checked_sub_signed(Duration::days(days_ago)),
                pest_type: Some(pest.to_string()),
                assigned_technician_name: Some(tech.to_string()),
            });
        }
        // Unattributed emergency call-out; counts toward totals only.
        self.upsert_case(Case {
            id: Uuid::new_v4(),
            customer_id: None,
            price: Some(275.0),
            completed_date: today.checked_sub_signed(Duration::days(8)),
            pest_type: None,
            assigned_technician_name: None,
        });

        for (back, spend) in [(0, 3_500.0), (1, 2_800.0), (2, 4_100.0)] {
            if let Some(first) = months_ago(back).with_day0(0) {
                self.upsert_monthly_spend(first, spend, Some("paid search + mailers".into()));
            }
        }

        info!(
            customers = self.customers.len(),
            cases = self.cases.len(),
            spend_rows = self.spend.len(),
            "Seeded demo record store"
        );
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRepository {
    async fn fetch_customers(&self) -> PortalResult<Vec<Customer>> {
        self.ensure_online("customers")?;
        let mut customers: Vec<Customer> = self.customers.iter().map(|r| r.value().clone()).collect();
        sort_customers(&mut customers);
        Ok(customers)
    }

    async fn fetch_priced_cases(&self) -> PortalResult<Vec<Case>> {
        self.ensure_online("cases")?;
        let mut cases: Vec<Case> = self
            .cases
            .iter()
            .filter(|r| is_priced(r.value()))
            .map(|r| r.value().clone())
            .collect();
        cases.sort_by(|a, b| a.completed_date.cmp(&b.completed_date).then(a.id.cmp(&b.id)));
        Ok(cases)
    }

    async fn fetch_monthly_spend(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> PortalResult<Vec<MonthlySpend>> {
        self.ensure_online("monthly spend")?;
        let mut rows: Vec<MonthlySpend> = self
            .spend
            .iter()
            .filter(|r| from <= *r.key() && *r.key() <= to)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.month);
        Ok(rows)
    }
}
