//! `SQLite` schema definitions for the asset ledger.

/// SQL statement to create the movements table.
///
/// `AUTOINCREMENT` keeps ids strictly increasing and prevents reuse of the
/// ids of rows removed outside this program.
pub const CREATE_ASSETS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_name TEXT NOT NULL,
    asset_type TEXT,
    quantity INTEGER DEFAULT 0,
    location TEXT,
    last_update TIMESTAMP
)
";

/// Column list shared by every SELECT so rows map positionally.
pub const SELECT_COLUMNS: &str = "id, asset_name, asset_type, quantity, location, last_update";

/// SQL statement to append one movement.
pub const INSERT_MOVEMENT: &str = r"
INSERT INTO assets (asset_name, asset_type, quantity, location, last_update)
VALUES (?1, ?2, ?3, ?4, ?5)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_ASSETS_TABLE];
