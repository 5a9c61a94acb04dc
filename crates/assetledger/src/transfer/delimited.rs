//! `.csv` reading and writing.

use std::path::Path;

use csv::{ReaderBuilder, Writer};
use tracing::debug;

use super::{Cell, Sheet};
use crate::error::{Error, Result};

/// Read a CSV file whose first record is the header row.
///
/// Every field is read as text; numeric coercion happens per column later.
pub(super) fn read(path: &Path) -> Result<Sheet> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(Error::EmptySheet {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    debug!("Read {} data rows from {}", rows.len(), path.display());
    Ok(Sheet { headers, rows })
}

/// Write a sheet as CSV, header first.
pub(super) fn write(sheet: &Sheet, path: &Path) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row.iter().map(Cell::to_text))?;
    }
    writer.flush()?;

    debug!("Wrote {} data rows to {}", sheet.rows.len(), path.display());
    Ok(())
}
