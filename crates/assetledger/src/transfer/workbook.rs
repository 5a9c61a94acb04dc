//! `.xlsx` workbook reading and writing.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use super::{Cell, Sheet};
use crate::error::{Error, Result};

/// Largest magnitude an `f64` holds without losing integer precision.
const MAX_EXACT_INT: u64 = 1 << 53;

/// Read the first worksheet of a workbook.
pub(super) fn read(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::EmptySheet {
            path: path.to_path_buf(),
        })??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| Error::EmptySheet {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(|c| data_to_cell(c).to_text().trim().to_string())
        .collect();

    let rows: Vec<Vec<Cell>> = rows.map(|r| r.iter().map(data_to_cell).collect()).collect();
    debug!("Read {} data rows from {}", rows.len(), path.display());

    Ok(Sheet { headers, rows })
}

/// Write a sheet as a single-worksheet workbook with a bold header row.
#[allow(clippy::cast_precision_loss)]
pub(super) fn write(sheet: &Sheet, path: &Path, sheet_name: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(col), header, &header_format)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let row_num = row_index(index + 1);
        for (col, cell) in row.iter().enumerate() {
            let col = col_index(col);
            match cell {
                Cell::Empty => {}
                Cell::Int(v) if v.unsigned_abs() <= MAX_EXACT_INT => {
                    worksheet.write_number(row_num, col, *v as f64)?;
                }
                // Stored as text so no digits are lost; import parses it back.
                Cell::Int(v) => {
                    worksheet.write_string(row_num, col, v.to_string())?;
                }
                Cell::Float(v) => {
                    worksheet.write_number(row_num, col, *v)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
            }
        }
    }

    workbook.save(path)?;
    debug!("Wrote {} data rows to {}", sheet.rows.len(), path.display());
    Ok(())
}

// Out-of-range indices saturate; the writer rejects them with a range error.
fn row_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn col_index(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::String(v) => Cell::Text(v.clone()),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => v.as_datetime().map_or_else(
            || Cell::Float(v.as_f64()),
            |dt| Cell::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.clone()),
        Data::Error(v) => Cell::Text(format!("{v:?}")),
    }
}
