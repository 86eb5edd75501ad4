//! CSV export of the per-influencer ROAS table.
//!
//! Columns: `name,platform,category,revenue,payout,roas`. Amounts and ratios
//! are rounded to 2 decimals.

use std::path::Path;

use serde::Serialize;

use crate::error::{ExportError, ExportResult};
use crate::report::RoasRow;

/// Default download name for the export.
pub const ROAS_EXPORT_FILE: &str = "roas_summary.csv";

#[derive(Debug, Serialize)]
struct RoasExportRow<'a> {
    name: &'a str,
    platform: &'a str,
    category: &'a str,
    revenue: f64,
    payout: f64,
    roas: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl<'a> From<&'a RoasRow> for RoasExportRow<'a> {
    fn from(row: &'a RoasRow) -> Self {
        Self {
            name: &row.name,
            platform: &row.platform,
            category: &row.category,
            revenue: round2(row.revenue),
            payout: round2(row.payout),
            roas: round2(row.roas),
        }
    }
}

/// Render the ROAS table as CSV text.
pub fn roas_csv(rows: &[RoasRow]) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        writer.write_record(["name", "platform", "category", "revenue", "payout", "roas"])?;
    }
    for row in rows {
        writer.serialize(RoasExportRow::from(row))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write the ROAS table to `path`.
pub fn write_roas_csv(rows: &[RoasRow], path: &Path) -> ExportResult<()> {
    std::fs::write(path, roas_csv(rows)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, revenue: f64, payout: f64) -> RoasRow {
        RoasRow {
            influencer_id: name.to_lowercase(),
            name: name.into(),
            platform: "Instagram".into(),
            category: "Beauty".into(),
            revenue,
            payout,
            roas: if payout > 0.0 { revenue / payout } else { 0.0 },
        }
    }

    #[test]
    fn test_export_header_and_rounding() {
        let csv = roas_csv(&[row("Asha", 1000.0, 300.0)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,platform,category,revenue,payout,roas");
        assert_eq!(lines[1], "Asha,Instagram,Beauty,1000.0,300.0,3.33");
    }

    #[test]
    fn test_export_quotes_commas() {
        let csv = roas_csv(&[row("Doe, Jane", 10.0, 0.0)]).unwrap();
        assert!(csv.contains("\"Doe, Jane\""));
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let csv = roas_csv(&[]).unwrap();
        assert_eq!(csv.trim_end(), "name,platform,category,revenue,payout,roas");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ROAS_EXPORT_FILE);
        write_roas_csv(&[row("Asha", 1000.0, 500.0)], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Asha,Instagram,Beauty,1000.0,500.0,2.0"));
    }
}
