//! Core ledger types for assetledger.
//!
//! The ledger stores *movements*: each row is one signed change in quantity
//! for an asset at a location. Positive quantities are inbound, negative
//! quantities are outbound. Rows are never updated, so the on-hand amount of an
//! asset is only implied by the sum of its rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored movement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Identifier assigned by the store. Strictly increasing, never reused.
    pub id: i64,
    /// Free-form asset name.
    pub asset_name: String,
    /// Asset category; any text is accepted.
    pub asset_type: String,
    /// Signed quantity of this movement.
    pub quantity: i64,
    /// Free-form storage location.
    pub location: String,
    /// When the row was written.
    pub last_update: DateTime<Utc>,
}

/// A movement that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    /// Free-form asset name.
    pub asset_name: String,
    /// Asset category.
    pub asset_type: String,
    /// Signed quantity, already normalised by the caller.
    pub quantity: i64,
    /// Storage location.
    pub location: String,
    /// Timestamp to record as `last_update`.
    pub timestamp: DateTime<Utc>,
}

/// A column of the ledger as it appears in spreadsheets and the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Row identifier.
    Id,
    /// Asset name.
    AssetName,
    /// Asset type.
    AssetType,
    /// Signed quantity.
    Quantity,
    /// Location.
    Location,
    /// Insertion timestamp.
    LastUpdate,
}

impl Column {
    /// Every stored column, in table order.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::AssetName,
        Self::AssetType,
        Self::Quantity,
        Self::Location,
        Self::LastUpdate,
    ];

    /// The four columns a user fills in; `id` and `last_update` are assigned.
    pub const INPUT: [Self; 4] = [
        Self::AssetName,
        Self::AssetType,
        Self::Quantity,
        Self::Location,
    ];
}

/// Language used for column headers and asset type suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    /// English headers.
    #[default]
    English,
    /// Simplified Chinese headers.
    Chinese,
}

impl LabelSet {
    /// Both label sets, in the order headers are matched on import.
    pub const ALL: [Self; 2] = [Self::English, Self::Chinese];

    /// Header label for a column.
    #[must_use]
    pub fn label(self, column: Column) -> &'static str {
        match (self, column) {
            (_, Column::Id) => "ID",
            (Self::English, Column::AssetName) => "Asset Name",
            (Self::English, Column::AssetType) => "Type",
            (Self::English, Column::Quantity) => "Quantity",
            (Self::English, Column::Location) => "Location",
            (Self::English, Column::LastUpdate) => "Last Update",
            (Self::Chinese, Column::AssetName) => "资产名称",
            (Self::Chinese, Column::AssetType) => "类型",
            (Self::Chinese, Column::Quantity) => "数量",
            (Self::Chinese, Column::Location) => "位置",
            (Self::Chinese, Column::LastUpdate) => "最后更新",
        }
    }

    /// Header labels for a list of columns.
    #[must_use]
    pub fn labels(self, columns: &[Column]) -> Vec<&'static str> {
        columns.iter().map(|&c| self.label(c)).collect()
    }

    /// Suggested asset types. These are hints only; any text is stored.
    #[must_use]
    pub fn type_suggestions(self) -> &'static [&'static str] {
        match self {
            Self::English => &["Equipment", "Consumable", "Tool", "Other"],
            Self::Chinese => &["设备", "耗材", "工具", "其他"],
        }
    }
}

impl std::fmt::Display for LabelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::English => write!(f, "english"),
            Self::Chinese => write!(f, "chinese"),
        }
    }
}
