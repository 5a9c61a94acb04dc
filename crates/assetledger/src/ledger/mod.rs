//! Storage layer for the asset ledger.
//!
//! This module provides `SQLite`-based persistent storage for movement rows.
//! Rows are only ever appended and read back; there is no update or delete
//! path.

pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{AssetRecord, NewMovement};

use self::schema::{INSERT_MOVEMENT, SCHEMA_STATEMENTS, SELECT_COLUMNS};

/// The movement ledger.
///
/// Owns its database connection for its whole lifetime; the connection is
/// closed when the ledger is dropped.
#[derive(Debug)]
pub struct Ledger {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Ledger {
    /// Open or create a ledger database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then ensures the schema is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let ledger = Self { path, conn };
        ledger.initialize()?;

        info!("Ledger opened at {}", ledger.path.display());
        Ok(ledger)
    }

    /// Create an in-memory ledger for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let ledger = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        ledger.initialize()?;
        Ok(ledger)
    }

    /// Ensure the movement table exists. Safe to call any number of times.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails.
    pub fn initialize(&self) -> Result<()> {
        for statement in SCHEMA_STATEMENTS {
            self.conn.execute(statement, [])?;
        }
        Ok(())
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one movement row and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_movement(
        &self,
        asset_name: &str,
        asset_type: &str,
        quantity: i64,
        location: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            INSERT_MOVEMENT,
            params![
                asset_name,
                asset_type,
                quantity,
                location,
                timestamp.to_rfc3339()
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted movement {} ({:+}) as id {}", asset_name, quantity, id);
        Ok(id)
    }

    /// Append one movement row built by a caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, movement: &NewMovement) -> Result<i64> {
        self.insert_movement(
            &movement.asset_name,
            &movement.asset_type,
            movement.quantity,
            &movement.location,
            movement.timestamp,
        )
    }

    /// Append a batch of movements in a single transaction.
    ///
    /// Either every row is written or, if any insert fails, none are.
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started, any insert
    /// fails, or the commit fails.
    pub fn insert_batch(&self, movements: &[NewMovement]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_MOVEMENT)?;
            for movement in movements {
                stmt.execute(params![
                    movement.asset_name,
                    movement.asset_type,
                    movement.quantity,
                    movement.location,
                    movement.timestamp.to_rfc3339()
                ])?;
            }
        }
        tx.commit()?;

        debug!("Committed batch of {} movements", movements.len());
        Ok(movements.len())
    }

    /// Get a movement by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<AssetRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM assets WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, [id], Self::row_to_record)
            .optional()?;
        Ok(result)
    }

    /// Every movement, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fetch_all(&self) -> Result<Vec<AssetRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM assets ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count stored movements.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get ledger statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<LedgerStats> {
        let total_movements = self.count()?;

        let first: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT last_update FROM assets ORDER BY id ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let last: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT last_update FROM assets ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(LedgerStats {
            total_movements,
            first_update: first.flatten().as_deref().and_then(parse_timestamp),
            last_update: last.flatten().as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Convert a database row to an `AssetRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AssetRecord> {
        let id: i64 = row.get(0)?;
        let asset_name: String = row.get(1)?;
        let asset_type: Option<String> = row.get(2)?;
        let quantity: Option<i64> = row.get(3)?;
        let location: Option<String> = row.get(4)?;
        let last_update: Option<String> = row.get(5)?;

        let last_update = last_update
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(|| {
                warn!("Row {} has no readable last_update, using epoch", id);
                DateTime::<Utc>::UNIX_EPOCH
            });

        Ok(AssetRecord {
            id,
            asset_name,
            asset_type: asset_type.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            location: location.unwrap_or_default(),
            last_update,
        })
    }
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 as written by this crate, and the naive
/// `YYYY-MM-DD HH:MM:SS[.f]` form written by older tools against the same
/// table, read as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Statistics about the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Total number of movement rows.
    pub total_movements: i64,
    /// Timestamp of the first row written.
    pub first_update: Option<DateTime<Utc>>,
    /// Timestamp of the most recent row written.
    pub last_update: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
