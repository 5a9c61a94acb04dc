//! Bulk transfer between the ledger and spreadsheet files.
//!
//! Three operations are provided:
//!
//! - **Import** reads a sheet whose header row names the four input columns
//!   and appends one movement per data row, all in one transaction.
//! - **Export** writes every stored row, all six columns, plus a header row.
//! - **Template** writes a header-only sheet with the four input columns.
//!
//! Files are `.xlsx` workbooks or `.csv` text, chosen by extension. Both are
//! read into and written from the same in-memory [`Sheet`].

mod delimited;
mod workbook;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::record::{AssetRecord, Column, LabelSet, NewMovement};

/// Extension appended to output paths that have none.
pub const DEFAULT_EXTENSION: &str = "xlsx";

/// Spreadsheet file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Comma-separated values.
    Csv,
}

impl SheetFormat {
    /// Pick the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Append the default extension to a path that has none.
#[must_use]
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value.
    Empty,
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl Cell {
    /// Whether the cell holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Int(_) | Self::Float(_) => false,
        }
    }

    /// Render the cell as text.
    ///
    /// Whole floats print without a fractional part, so a name column that a
    /// spreadsheet stored as `12.0` reads back as `12`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => match whole_float(*v) {
                Some(i) => i.to_string(),
                None => v.to_string(),
            },
            Self::Text(s) => s.clone(),
        }
    }

    /// Coerce the cell to a whole number, if it represents one.
    #[must_use]
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => whole_float(*v),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_float))
            }
            Self::Empty => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_float(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e18 {
        Some(v as i64)
    } else {
        None
    }
}

/// A header row plus data rows, independent of file format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Header labels, trimmed.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter or longer than the header.
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// A header-only sheet.
    #[must_use]
    pub fn with_headers(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Read a sheet from disk in the format given by its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported or the file cannot be read.
    pub fn read(path: &Path) -> Result<Self> {
        match SheetFormat::from_path(path)? {
            SheetFormat::Xlsx => workbook::read(path),
            SheetFormat::Csv => delimited::read(path),
        }
    }

    /// Write the sheet to disk in the format given by its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported or the file cannot be written.
    pub fn write(&self, path: &Path, sheet_name: &str) -> Result<()> {
        match SheetFormat::from_path(path)? {
            SheetFormat::Xlsx => workbook::write(self, path, sheet_name),
            SheetFormat::Csv => delimited::write(self, path),
        }
    }
}

/// Positions of the four input columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputColumns {
    labels: LabelSet,
    asset_name: usize,
    asset_type: usize,
    quantity: usize,
    location: usize,
}

impl InputColumns {
    /// Locate the input columns, accepting either label set.
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |labels: LabelSet, column: Column| {
            let label = labels.label(column);
            headers.iter().position(|h| h == label)
        };

        let mut best: Option<(LabelSet, usize)> = None;
        for labels in LabelSet::ALL {
            let positions: Vec<Option<usize>> =
                Column::INPUT.iter().map(|&c| find(labels, c)).collect();

            if let [Some(asset_name), Some(asset_type), Some(quantity), Some(location)] =
                *positions.as_slice()
            {
                return Ok(Self {
                    labels,
                    asset_name,
                    asset_type,
                    quantity,
                    location,
                });
            }

            let found = positions.iter().filter(|p| p.is_some()).count();
            if best.map_or(true, |(_, n)| found > n) {
                best = Some((labels, found));
            }
        }

        let labels = best.map_or(LabelSet::default(), |(l, _)| l);
        let missing = Column::INPUT
            .iter()
            .copied()
            .find(|&c| find(labels, c).is_none())
            .unwrap_or(Column::AssetName);
        Err(Error::missing_column(labels.label(missing)))
    }
}

/// Turn the data rows of a sheet into movements stamped with `now`.
///
/// Blank rows are skipped. Quantities are taken as written; unlike the
/// movement form, no sign is imposed.
///
/// # Errors
///
/// Returns an error if an input column is missing or a quantity cell is not
/// a whole number.
pub fn movements_from_sheet(sheet: &Sheet, now: DateTime<Utc>) -> Result<Vec<NewMovement>> {
    let columns = InputColumns::locate(&sheet.headers)?;
    debug!("Matched {} header labels", columns.labels);

    let empty = Cell::Empty;
    let mut movements = Vec::with_capacity(sheet.rows.len());

    for (index, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let cell = |i: usize| row.get(i).unwrap_or(&empty);

        let quantity_cell = cell(columns.quantity);
        let quantity = quantity_cell.to_integer().ok_or_else(|| Error::InvalidCell {
            // Header is spreadsheet row 1.
            row: index + 2,
            column: columns.labels.label(Column::Quantity).to_string(),
            value: quantity_cell.to_text(),
        })?;

        movements.push(NewMovement {
            asset_name: cell(columns.asset_name).to_text(),
            asset_type: cell(columns.asset_type).to_text(),
            quantity,
            location: cell(columns.location).to_text(),
            timestamp: now,
        });
    }

    Ok(movements)
}

/// Build the export sheet for a set of stored rows.
#[must_use]
pub fn sheet_from_records(records: &[AssetRecord], labels: LabelSet) -> Sheet {
    let mut sheet = Sheet::with_headers(&labels.labels(&Column::ALL));
    sheet.rows = records
        .iter()
        .map(|r| {
            vec![
                Cell::Int(r.id),
                Cell::Text(r.asset_name.clone()),
                Cell::Text(r.asset_type.clone()),
                Cell::Int(r.quantity),
                Cell::Text(r.location.clone()),
                Cell::Text(r.last_update.to_rfc3339()),
            ]
        })
        .collect();
    sheet
}

/// Import every data row of a spreadsheet as a new movement.
///
/// All rows are written in a single transaction: if any row is rejected,
/// nothing is written. Returns the number of rows imported.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header is incomplete, a
/// quantity is not a whole number, or the insert fails.
pub fn import_file(ledger: &Ledger, path: &Path, now: DateTime<Utc>) -> Result<usize> {
    let sheet = Sheet::read(path)?;
    let movements = movements_from_sheet(&sheet, now)?;
    let written = ledger.insert_batch(&movements)?;

    info!("Imported {} movements from {}", written, path.display());
    Ok(written)
}

/// Export every stored row to a spreadsheet. Returns the path written.
///
/// # Errors
///
/// Returns an error if the ledger cannot be read or the file cannot be written.
pub fn export_file(
    ledger: &Ledger,
    path: &Path,
    labels: LabelSet,
    sheet_name: &str,
) -> Result<PathBuf> {
    let path = resolve_output_path(path);
    let records = ledger.fetch_all()?;
    sheet_from_records(&records, labels).write(&path, sheet_name)?;

    info!("Exported {} movements to {}", records.len(), path.display());
    Ok(path)
}

/// Write an empty import template. Returns the path written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_template(path: &Path, labels: LabelSet, sheet_name: &str) -> Result<PathBuf> {
    let path = resolve_output_path(path);
    Sheet::with_headers(&labels.labels(&Column::INPUT)).write(&path, sheet_name)?;

    info!("Wrote import template to {}", path.display());
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("assetledger_{}_{name}", std::process::id()))
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn input_sheet(labels: LabelSet, rows: Vec<Vec<Cell>>) -> Sheet {
        let mut sheet = Sheet::with_headers(&labels.labels(&Column::INPUT));
        sheet.rows = rows;
        sheet
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SheetFormat::from_path(Path::new("a.xlsx")).unwrap(),
            SheetFormat::Xlsx
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("a.CSV")).unwrap(),
            SheetFormat::Csv
        );
        assert!(SheetFormat::from_path(Path::new("a.xls")).is_err());
        assert!(SheetFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(
            resolve_output_path(Path::new("/tmp/out")),
            PathBuf::from("/tmp/out.xlsx")
        );
        assert_eq!(
            resolve_output_path(Path::new("/tmp/out.csv")),
            PathBuf::from("/tmp/out.csv")
        );
    }

    #[test]
    fn test_cell_to_integer() {
        assert_eq!(Cell::Int(4).to_integer(), Some(4));
        assert_eq!(Cell::Float(4.0).to_integer(), Some(4));
        assert_eq!(Cell::Float(-2.0).to_integer(), Some(-2));
        assert_eq!(Cell::Float(4.5).to_integer(), None);
        assert_eq!(text(" 12 ").to_integer(), Some(12));
        assert_eq!(text("3.0").to_integer(), Some(3));
        assert_eq!(text("three").to_integer(), None);
        assert_eq!(Cell::Empty.to_integer(), None);
        assert_eq!(Cell::Float(f64::NAN).to_integer(), None);
    }

    #[test]
    fn test_cell_to_text() {
        assert_eq!(Cell::Float(12.0).to_text(), "12");
        assert_eq!(Cell::Float(1.5).to_text(), "1.5");
        assert_eq!(Cell::Int(-3).to_text(), "-3");
        assert_eq!(Cell::Empty.to_text(), "");
    }

    #[test]
    fn test_movements_from_sheet() {
        let sheet = input_sheet(
            LabelSet::English,
            vec![
                vec![text("Drill"), text("Tool"), Cell::Float(3.0), text("A1")],
                vec![text("Tape"), text("Consumable"), Cell::Int(-2), text("B2")],
            ],
        );
        let now = Utc::now();

        let movements = movements_from_sheet(&sheet, now).unwrap();

        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].asset_name, "Drill");
        assert_eq!(movements[0].quantity, 3);
        assert_eq!(movements[1].quantity, -2);
        assert!(movements.iter().all(|m| m.timestamp == now));
    }

    #[test]
    fn test_movements_from_sheet_chinese_headers() {
        let sheet = input_sheet(
            LabelSet::Chinese,
            vec![vec![text("扳手"), text("工具"), Cell::Int(6), text("一号架")]],
        );

        let movements = movements_from_sheet(&sheet, Utc::now()).unwrap();
        assert_eq!(movements[0].asset_type, "工具");
        assert_eq!(movements[0].quantity, 6);
    }

    #[test]
    fn test_movements_from_sheet_reordered_and_extra_columns() {
        let sheet = Sheet {
            headers: ["ID", "Location", "Quantity", "Type", "Asset Name", "Last Update"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            rows: vec![vec![
                Cell::Int(9),
                text("Dock"),
                Cell::Int(1),
                text("Equipment"),
                text("Pallet jack"),
                text("2024-01-01T00:00:00+00:00"),
            ]],
        };

        let m = movements_from_sheet(&sheet, Utc::now()).unwrap().remove(0);
        assert_eq!(m.asset_name, "Pallet jack");
        assert_eq!(m.location, "Dock");
        assert_eq!(m.asset_type, "Equipment");
    }

    #[test]
    fn test_movements_from_sheet_missing_column() {
        let sheet = Sheet::with_headers(&["Asset Name", "Type", "Location"]);
        let err = movements_from_sheet(&sheet, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column } if column == "Quantity"));
    }

    #[test]
    fn test_movements_from_sheet_missing_column_reports_closest_labels() {
        let sheet = Sheet::with_headers(&["资产名称", "类型", "位置"]);
        let err = movements_from_sheet(&sheet, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column } if column == "数量"));
    }

    #[test]
    fn test_movements_from_sheet_invalid_quantity() {
        let sheet = input_sheet(
            LabelSet::English,
            vec![
                vec![text("Ok"), text("Tool"), Cell::Int(1), text("A")],
                vec![text("Bad"), text("Tool"), text("lots"), text("A")],
            ],
        );

        let err = movements_from_sheet(&sheet, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidCell { row: 3, ref value, .. } if value == "lots"));
    }

    #[test]
    fn test_movements_from_sheet_skips_blank_rows() {
        let sheet = input_sheet(
            LabelSet::English,
            vec![
                vec![text("Ok"), text("Tool"), Cell::Int(1), text("A")],
                vec![Cell::Empty, text("  "), Cell::Empty, Cell::Empty],
                vec![],
            ],
        );

        assert_eq!(movements_from_sheet(&sheet, Utc::now()).unwrap().len(), 1);
    }

    #[test]
    fn test_movements_from_sheet_short_row_missing_quantity() {
        let sheet = input_sheet(LabelSet::English, vec![vec![text("Short")]]);
        let err = movements_from_sheet(&sheet, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidCell { row: 2, .. }));
    }

    #[test]
    fn test_sheet_from_records() {
        let ledger = Ledger::open_in_memory().unwrap();
        ledger
            .insert_movement("Saw", "Tool", -1, "C3", Utc::now())
            .unwrap();

        let sheet = sheet_from_records(&ledger.fetch_all().unwrap(), LabelSet::English);

        assert_eq!(sheet.headers.len(), 6);
        assert_eq!(sheet.headers[0], "ID");
        assert_eq!(sheet.headers[5], "Last Update");
        assert_eq!(sheet.rows[0][1], text("Saw"));
        assert_eq!(sheet.rows[0][3], Cell::Int(-1));
    }

    #[test]
    fn test_import_file_all_or_nothing() {
        let path = temp_path("partial.csv");
        std::fs::write(
            &path,
            "Asset Name,Type,Quantity,Location\nA,Tool,1,X\nB,Tool,oops,X\n",
        )
        .unwrap();
        let ledger = Ledger::open_in_memory().unwrap();

        let result = import_file(&ledger, &path, Utc::now());

        assert!(result.is_err());
        assert_eq!(ledger.count().unwrap(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_missing_file() {
        let ledger = Ledger::open_in_memory().unwrap();
        let result = import_file(&ledger, Path::new("/nonexistent/in.xlsx"), Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn test_export_import_round_trip_xlsx() {
        let source = Ledger::open_in_memory().unwrap();
        source.insert_movement("Drill", "Tool", 5, "A1", Utc::now()).unwrap();
        source.insert_movement("Tape", "Consumable", -3, "B2", Utc::now()).unwrap();
        source.insert_movement("螺母", "耗材", 100, "", Utc::now()).unwrap();
        source
            .insert_movement("Rivet", "Consumable", 9_007_199_254_740_993, "D4", Utc::now())
            .unwrap();
        source.insert_movement("Washer", "Consumable", i64::MAX, "D5", Utc::now()).unwrap();
        let path = temp_path("round_trip.xlsx");

        export_file(&source, &path, LabelSet::English, "Sheet1").unwrap();
        let target = Ledger::open_in_memory().unwrap();
        let imported = import_file(&target, &path, Utc::now()).unwrap();

        assert_eq!(imported, 5);
        let tuples = |l: &Ledger| -> Vec<(String, String, i64, String)> {
            l.fetch_all()
                .unwrap()
                .into_iter()
                .map(|r| (r.asset_name, r.asset_type, r.quantity, r.location))
                .collect()
        };
        assert_eq!(tuples(&source), tuples(&target));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_import_round_trip_csv() {
        let source = Ledger::open_in_memory().unwrap();
        source.insert_movement("Rope, 10m", "Other", 2, "C\"3\"", Utc::now()).unwrap();
        let path = temp_path("round_trip.csv");

        export_file(&source, &path, LabelSet::Chinese, "Sheet1").unwrap();
        let target = Ledger::open_in_memory().unwrap();
        import_file(&target, &path, Utc::now()).unwrap();

        let record = target.fetch_all().unwrap().remove(0);
        assert_eq!(record.asset_name, "Rope, 10m");
        assert_eq!(record.location, "C\"3\"");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_sets_last_update_to_import_time() {
        let path = temp_path("stamp.csv");
        std::fs::write(
            &path,
            "Asset Name,Type,Quantity,Location,Last Update\nA,Tool,1,X,2001-01-01T00:00:00+00:00\n",
        )
        .unwrap();
        let ledger = Ledger::open_in_memory().unwrap();
        let start = Utc::now();

        import_file(&ledger, &path, Utc::now()).unwrap();

        let record = ledger.fetch_all().unwrap().remove(0);
        assert!(record.last_update >= start);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_template_has_headers_only() {
        let path = temp_path("template");

        let written = write_template(&path, LabelSet::English, "Sheet1").unwrap();

        assert_eq!(written.extension().unwrap(), "xlsx");
        let sheet = Sheet::read(&written).unwrap();
        assert_eq!(sheet.headers, vec!["Asset Name", "Type", "Quantity", "Location"]);
        assert!(sheet.rows.is_empty());
        let _ = std::fs::remove_file(&written);
    }

    #[test]
    fn test_template_imports_zero_rows() {
        let path = temp_path("template_import.xlsx");
        write_template(&path, LabelSet::Chinese, "模板").unwrap();
        let ledger = Ledger::open_in_memory().unwrap();

        assert_eq!(import_file(&ledger, &path, Utc::now()).unwrap(), 0);
        assert_eq!(ledger.count().unwrap(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_rejects_unsupported_extension() {
        let ledger = Ledger::open_in_memory().unwrap();
        let result = export_file(&ledger, Path::new("/tmp/out.ods"), LabelSet::English, "Sheet1");
        assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    }
}
