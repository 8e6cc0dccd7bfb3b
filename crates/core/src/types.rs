//! Record types supplied by the contract record store, plus the date
//! window types every revenue calculation is parameterised on.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PortalError, PortalResult};

/// Segment label used when a customer has no business type.
pub const OTHER_SEGMENT: &str = "Other";

/// A subscription contract holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    #[serde(default)]
    pub company_name: String,
    /// Authoritative "currently subscribed" flag. Can be toggled by hand and
    /// overrides anything derived from the contract dates.
    pub is_active: bool,
    #[serde(default)]
    pub annual_premium: f64,
    #[serde(default)]
    pub contract_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub contract_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub business_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Business segment with blank or missing labels folded into "Other".
    pub fn segment(&self) -> &str {
        match self.business_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => OTHER_SEGMENT,
        }
    }

    /// Premium clamped to zero; negative or non-finite values count as nothing.
    pub fn premium(&self) -> f64 {
        if self.annual_premium.is_finite() && self.annual_premium > 0.0 {
            self.annual_premium
        } else {
            0.0
        }
    }
}

/// A one-off priced work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub pest_type: Option<String>,
    #[serde(default)]
    pub assigned_technician_name: Option<String>,
}

impl Case {
    /// Revenue the case contributes to `window`, if it is priced and was
    /// completed inside it.
    pub fn revenue_in(&self, window: &DateWindow) -> Option<f64> {
        let completed = self.completed_date?;
        let price = self.price.filter(|p| p.is_finite() && *p > 0.0)?;
        window.contains(completed).then_some(price)
    }
}

/// One row of the marketing cost ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySpend {
    /// First day of the month the spend belongs to.
    pub month: NaiveDate,
    pub spend: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> PortalResult<Self> {
        if start > end {
            return Err(PortalError::Validation(format!(
                "window start {start} is after window end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// January 1st through December 31st of `year`.
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// The `days`-long window ending on (and including) `end`.
    pub fn trailing_days(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        let start = end
            .checked_sub_signed(chrono::Duration::days(span))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// The window from `months` calendar months before `end` through `end`.
    pub fn trailing_months(end: NaiveDate, months: u32) -> Self {
        let start = end
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// A calendar month, used to key spend and acquisition figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportMonth {
    pub year: i32,
    pub month: u32,
}

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> PortalResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PortalError::Validation(format!(
                "invalid report month {year}-{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(value: &str) -> PortalResult<Self> {
        let invalid = || PortalError::Validation(format!("expected YYYY-MM, got {value:?}"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// The whole month as an inclusive window.
    pub fn window(&self) -> DateWindow {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        DateWindow { start, end }
    }
}

impl std::fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}
