//! Table view and status line.
//!
//! The table view always shows every stored row; it is rebuilt from a full
//! `fetch_all` after each mutation rather than patched in place.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::{AssetRecord, Column, LabelSet};

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Tab-separated rows, no header
    Plain,
    /// Aligned grid with headers
    #[default]
    Table,
    /// JSON array of records
    Json,
}

/// The one-line status shown after each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status(String);

impl Status {
    /// Status before any operation has run.
    #[must_use]
    pub fn ready() -> Self {
        Self("Ready".to_string())
    }

    /// Replace the status text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.0 = text.into();
    }

    /// The current status text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ready()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render records in the requested format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn render(records: &[AssetRecord], labels: LabelSet, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => render_plain(records),
        OutputFormat::Table => render_table(records, labels),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
    })
}

fn cells(record: &AssetRecord) -> [String; 6] {
    [
        record.id.to_string(),
        record.asset_name.clone(),
        record.asset_type.clone(),
        record.quantity.to_string(),
        record.location.clone(),
        record.last_update.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

/// One tab-separated line per record.
#[must_use]
pub fn render_plain(records: &[AssetRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&cells(record).join("\t"));
        out.push('\n');
    }
    out
}

/// An aligned grid with a header row and one line per record.
///
/// Numeric columns are right-aligned. An empty ledger renders the header
/// and a `(no movements)` line.
#[must_use]
pub fn render_table(records: &[AssetRecord], labels: LabelSet) -> String {
    let headers = labels.labels(&Column::ALL);
    let rows: Vec<[String; 6]> = records.iter().map(cells).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let right_aligned = |i: usize| matches!(Column::ALL[i], Column::Id | Column::Quantity);
    let format_line = |values: &[&str]| {
        let line: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let pad = widths[i].saturating_sub(v.chars().count());
                if right_aligned(i) {
                    format!("{}{v}", " ".repeat(pad))
                } else {
                    format!("{v}{}", " ".repeat(pad))
                }
            })
            .collect();
        line.join("  ").trim_end().to_string()
    };

    let mut out = format_line(&headers);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    if rows.is_empty() {
        out.push_str("(no movements)\n");
    }
    for row in &rows {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_line(&values));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, name: &str, quantity: i64) -> AssetRecord {
        AssetRecord {
            id,
            asset_name: name.to_string(),
            asset_type: "Tool".to_string(),
            quantity,
            location: "A1".to_string(),
            last_update: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        }
    }

    #[test]
    fn test_status_default_ready() {
        assert_eq!(Status::default().text(), "Ready");
    }

    #[test]
    fn test_status_set() {
        let mut status = Status::ready();
        status.set("Inbound operation succeeded.");
        assert_eq!(status.to_string(), "Inbound operation succeeded.");
    }

    #[test]
    fn test_render_plain() {
        let out = render_plain(&[record(1, "Drill", 5)]);
        assert_eq!(out, "1\tDrill\tTool\t5\tA1\t2024-05-06 07:08:09\n");
    }

    #[test]
    fn test_render_table_headers_and_rows() {
        let out = render_table(&[record(1, "Drill", 5), record(12, "Tape", -30)], LabelSet::English);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].contains("Asset Name"));
        assert!(lines[0].contains("Last Update"));
        assert!(lines[1].starts_with("--"));
        assert!(lines[2].starts_with(" 1  Drill"));
        assert!(lines[3].starts_with("12  Tape"));
        assert!(lines[3].contains("-30"));
    }

    #[test]
    fn test_render_table_empty() {
        let out = render_table(&[], LabelSet::Chinese);
        assert!(out.contains("资产名称"));
        assert!(out.contains("(no movements)"));
    }

    #[test]
    fn test_render_json() {
        let out = render(&[record(3, "Saw", -1)], LabelSet::English, OutputFormat::Json).unwrap();
        let parsed: Vec<AssetRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec![record(3, "Saw", -1)]);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_output_format_serde() {
        let parsed: OutputFormat = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(parsed, OutputFormat::Plain);
    }
}
