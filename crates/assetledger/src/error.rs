//! Error types for assetledger.
//!
//! Every fallible operation in the crate returns [`Error`]. Callers at the
//! user-facing edge (the CLI and the interactive shell) render the message
//! and carry on; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for assetledger operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// The quantity field of a movement could not be parsed as an integer.
    #[error("invalid quantity '{input}': expected a whole number")]
    InvalidQuantity {
        /// The text that was entered.
        input: String,
    },

    // === Transfer Errors ===
    /// The file extension does not name a supported spreadsheet format.
    #[error("unsupported spreadsheet format: {path} (expected .xlsx or .csv)")]
    UnsupportedFormat {
        /// Path that was given.
        path: PathBuf,
    },

    /// The header row lacks one of the required input columns.
    #[error("missing column '{column}' in header row")]
    MissingColumn {
        /// Label of the missing column.
        column: String,
    },

    /// A data cell could not be coerced to the column's type.
    #[error("row {row}, column '{column}': cannot use '{value}' as a whole number")]
    InvalidCell {
        /// 1-based spreadsheet row number (the header is row 1).
        row: usize,
        /// Label of the offending column.
        column: String,
        /// The raw cell content.
        value: String,
    },

    /// The workbook has no worksheet or no header row.
    #[error("no header row found in {path}")]
    EmptySheet {
        /// Path of the file that was read.
        path: PathBuf,
    },

    /// Reading a workbook failed.
    #[error("failed to read spreadsheet: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    /// Writing a workbook failed.
    #[error("failed to write spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Reading or writing a CSV file failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for assetledger operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid quantity error for the given input text.
    #[must_use]
    pub fn invalid_quantity(input: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            input: input.into(),
        }
    }

    /// Create a missing column error.
    #[must_use]
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Check if this error was caused by what the user typed or supplied,
    /// as opposed to the store or the file system.
    #[must_use]
    pub fn is_user_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuantity { .. }
                | Self::InvalidCell { .. }
                | Self::MissingColumn { .. }
                | Self::UnsupportedFormat { .. }
        )
    }
}
