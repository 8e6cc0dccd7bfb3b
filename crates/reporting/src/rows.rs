//! Flat row model shared by the CSV and text exporters.

use pestops_revenue::RevenueReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Usd,
    Percent,
    Count,
    Months,
    Ratio,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Percent => "%",
            Self::Count => "count",
            Self::Months => "months",
            Self::Ratio => "ratio",
        }
    }

    /// Render `value` at the precision the unit calls for.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Count => format!("{value:.0}"),
            _ => format!("{value:.2}"),
        }
    }
}

/// One `label,value,unit` line of the headline block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub label: String,
    pub value: f64,
    pub unit: MetricUnit,
}

impl MetricRow {
    fn new(label: &str, value: f64, unit: MetricUnit) -> Self {
        Self {
            label: label.to_string(),
            value,
            unit,
        }
    }
}

/// A titled grid of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    fn new(title: &str, columns: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Cell text without any CSV quoting. Floats get two decimals.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => format!("{:.2}", n.as_f64().unwrap_or_default()),
        other => other.to_string(),
    }
}

pub fn summary_rows(report: &RevenueReport) -> Vec<MetricRow> {
    use MetricUnit::*;

    let arr = &report.arr;
    let ret = &report.retention;
    let ren = &report.renewals;
    let econ = &report.unit_economics;
    let growth = &report.growth;

    vec![
        MetricRow::new("Current ARR", arr.current_arr, Usd),
        MetricRow::new("MRR", arr.monthly_recurring_revenue, Usd),
        MetricRow::new("Additional case revenue", arr.additional_case_revenue, Usd),
        MetricRow::new("Total revenue", arr.total_revenue, Usd),
        MetricRow::new("Active customers", arr.active_customers as f64, Count),
        MetricRow::new("Average ARR per customer", arr.average_arr_per_customer, Usd),
        MetricRow::new("Cohort size", ret.cohort_size as f64, Count),
        MetricRow::new("Churned customers", ret.churned_customers as f64, Count),
        MetricRow::new("Churn rate", ret.churn_rate, Percent),
        MetricRow::new("Retention rate", ret.retention_rate, Percent),
        MetricRow::new("Net revenue retention", ret.net_revenue_retention, Percent),
        MetricRow::new("Expiring within 3 months", ren.expiring_3_months as f64, Count),
        MetricRow::new("Expiring within 6 months", ren.expiring_6_months as f64, Count),
        MetricRow::new("Expiring within 12 months", ren.expiring_12_months as f64, Count),
        MetricRow::new("ARR expiring within 3 months", ren.arr_expiring_3_months, Usd),
        MetricRow::new("ARR expiring within 6 months", ren.arr_expiring_6_months, Usd),
        MetricRow::new("ARR expiring within 12 months", ren.arr_expiring_12_months, Usd),
        MetricRow::new("Marketing spend", econ.marketing_spend, Usd),
        MetricRow::new("New customers", econ.new_customers as f64, Count),
        MetricRow::new("New ARR", econ.new_arr, Usd),
        MetricRow::new("Customer acquisition cost", econ.customer_acquisition_cost, Usd),
        MetricRow::new("Lifetime value", econ.lifetime_value, Usd),
        MetricRow::new("LTV to CAC", econ.ltv_to_cac, Ratio),
        MetricRow::new("Payback period", econ.payback_period_months, Months),
        MetricRow::new("Marketing ROI", econ.roi, Percent),
        MetricRow::new("Starting MRR", growth.start_mrr, Usd),
        MetricRow::new("New MRR", growth.new_mrr, Usd),
        MetricRow::new("Churned MRR", growth.churned_mrr, Usd),
        MetricRow::new("Net MRR change", growth.net_change_mrr, Usd),
        MetricRow::new("Ending MRR", growth.end_mrr, Usd),
        MetricRow::new("MRR growth rate", growth.growth_rate, Percent),
    ]
}

/// The headline block as a three-column table.
pub fn summary_table(report: &RevenueReport) -> Table {
    let mut table = Table::new("Summary", &["label", "value", "unit"]);
    table.rows = summary_rows(report)
        .into_iter()
        .map(|row| {
            vec![
                json!(row.label),
                json!(row.unit.format(row.value)),
                json!(row.unit.as_str()),
            ]
        })
        .collect();
    table
}

pub fn segment_table(report: &RevenueReport) -> Table {
    let mut table = Table::new(
        "Revenue by segment",
        &[
            "business_type",
            "customers",
            "active_customers",
            "recurring_revenue",
            "case_revenue",
            "total_revenue",
        ],
    );
    table.rows = report
        .segments
        .iter()
        .map(|s| {
            vec![
                json!(s.business_type),
                json!(s.customers),
                json!(s.active_customers),
                json!(s.recurring_revenue),
                json!(s.case_revenue),
                json!(s.total_revenue),
            ]
        })
        .collect();
    table
}

fn case_table(title: &str, label: &str, rows: &[pestops_revenue::casework::CaseRevenueRow]) -> Table {
    let mut table = Table::new(title, &[label, "cases", "revenue", "average_price"]);
    table.rows = rows
        .iter()
        .map(|r| {
            vec![
                json!(r.label),
                json!(r.cases),
                json!(r.revenue),
                json!(r.average_price),
            ]
        })
        .collect();
    table
}

pub fn technician_table(report: &RevenueReport) -> Table {
    case_table("Revenue by technician", "technician", &report.technicians)
}

pub fn pest_type_table(report: &RevenueReport) -> Table {
    case_table("Revenue by pest type", "pest_type", &report.pest_types)
}

pub fn projection_table(report: &RevenueReport) -> Table {
    let mut table = Table::new(
        "ARR projection",
        &["year", "projected_arr", "contributing_customers", "basis"],
    );
    table.rows = report
        .projections
        .iter()
        .map(|p| {
            let basis = if p.is_current_year { "live" } else { "prorated" };
            vec![
                json!(p.year),
                json!(p.projected_arr),
                json!(p.contributing_customers),
                json!(basis),
            ]
        })
        .collect();
    table
}

pub fn upsell_table(report: &RevenueReport) -> Table {
    let mut table = Table::new(
        "Upsell candidates",
        &[
            "company_name",
            "business_type",
            "annual_premium",
            "case_revenue",
            "case_count",
            "ratio",
        ],
    );
    table.rows = report
        .upsell
        .iter()
        .map(|u| {
            vec![
                json!(u.company_name),
                json!(u.business_type),
                json!(u.annual_premium),
                json!(u.case_revenue),
                json!(u.case_count),
                json!(u.ratio),
            ]
        })
        .collect();
    table
}

/// Every breakdown table, in export order. The summary block is separate.
pub fn detail_tables(report: &RevenueReport) -> Vec<Table> {
    vec![
        segment_table(report),
        technician_table(report),
        pest_type_table(report),
        projection_table(report),
        upsell_table(report),
    ]
}
