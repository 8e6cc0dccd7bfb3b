//! Fixed-width text rendering for terminals.

use crate::rows::{cell_text, detail_tables, summary_table, Table};
use pestops_revenue::RevenueReport;
use serde_json::Value;

/// Render one table with a title, a header row and a rule.
/// Text columns are left aligned, numeric columns right aligned.
pub fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let numeric: Vec<bool> = (0..widths.len())
        .map(|i| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .all(|v| matches!(v, Value::Number(_)))
                && !table.rows.is_empty()
        })
        .collect();

    let mut out = format!("{}\n", table.title);
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{c:<w$}"))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    if cells.is_empty() {
        out.push_str("(none)\n");
        return out;
    }
    for row in &cells {
        let padded: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                if numeric.get(i).copied().unwrap_or(false) {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn to_text(report: &RevenueReport) -> String {
    let mut out = format!(
        "Revenue report as of {} (window {} to {})\n\n",
        report.as_of, report.window.start, report.window.end
    );
    out.push_str(&render_table(&summary_table(report)));
    for table in detail_tables(report) {
        out.push('\n');
        out.push_str(&render_table(&table));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_report;
    use serde_json::json;

    #[test]
    fn test_columns_align() {
        let table = Table {
            title: "Techs".into(),
            columns: vec!["technician".into(), "revenue".into()],
            rows: vec![
                vec![json!("Dana"), json!(1_250.0)],
                vec![json!("Unassigned"), json!(75.5)],
            ],
        };
        let text = render_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Techs");
        assert_eq!(lines[1], "technician  revenue");
        assert_eq!(lines[2], "----------  -------");
        assert_eq!(lines[3], "Dana        1250.00");
        assert_eq!(lines[4], "Unassigned    75.50");
    }

    #[test]
    fn test_empty_table_marked() {
        let table = Table {
            title: "Upsell candidates".into(),
            columns: vec!["company_name".into()],
            rows: vec![],
        };
        assert!(render_table(&table).ends_with("(none)\n"));
    }

    #[test]
    fn test_report_text_has_every_section() {
        let text = to_text(&sample_report());
        assert!(text.starts_with("Revenue report as of 2024-06-15"));
        for title in [
            "Summary",
            "Revenue by segment",
            "Revenue by technician",
            "Revenue by pest type",
            "ARR projection",
            "Upsell candidates",
        ] {
            assert!(text.contains(&format!("\n{title}\n")), "missing {title}");
        }
    }
}
