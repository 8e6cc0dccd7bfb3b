//! CSV export: the `label,value,unit` headline block followed by one section
//! per breakdown table. Sections are separated by a blank line and introduced
//! by a `# Title` line.

use crate::rows::{cell_text, detail_tables, summary_rows, Table};
use pestops_revenue::RevenueReport;
use serde_json::Value;

/// Quote string cells, doubling embedded quotes. Other cells are bare.
fn escape(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => cell_text(other),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn push_table(csv: &mut String, table: &Table) {
    csv.push_str("# ");
    csv.push_str(&table.title);
    csv.push('\n');
    csv.push_str(&table.columns.join(","));
    csv.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(escape).collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
}

pub fn to_csv(report: &RevenueReport) -> String {
    let mut csv = String::from("label,value,unit\n");
    for row in summary_rows(report) {
        csv.push_str(&format!(
            "{},{},{}\n",
            quote(&row.label),
            row.unit.format(row.value),
            row.unit.as_str()
        ));
    }
    for table in detail_tables(report) {
        csv.push('\n');
        push_table(&mut csv, &table);
    }
    csv
}
