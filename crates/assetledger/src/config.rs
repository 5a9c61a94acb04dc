//! Configuration management for assetledger.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::LabelSet;
use crate::view::OutputFormat;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "assetledger";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "assets.db";

/// Prefix of environment variables that override configuration.
const ENV_PREFIX: &str = "ASSETLEDGER_";

/// Longest worksheet name a workbook accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters a workbook forbids in worksheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ASSETLEDGER_`, sections separated
///    by `__`, e.g. `ASSETLEDGER_STORAGE__DATABASE_PATH`)
/// 2. TOML config file at `~/.config/assetledger/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Spreadsheet transfer configuration.
    pub transfer: TransferConfig,
    /// Table view configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/assetledger/assets.db`
    pub database_path: Option<PathBuf>,
}

/// Spreadsheet import/export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Language of the column headers written on export and in templates.
    /// Import accepts either language regardless.
    pub labels: LabelSet,
    /// Worksheet name used when writing workbooks.
    pub sheet_name: String,
}

/// Table view configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default output format for listings.
    pub format: OutputFormat,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            labels: LabelSet::English,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let name = &self.transfer.sheet_name;

        if name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "transfer.sheet_name must not be empty".to_string(),
            });
        }

        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::ConfigValidation {
                message: format!(
                    "transfer.sheet_name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
                ),
            });
        }

        if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(Error::ConfigValidation {
                message: format!("transfer.sheet_name '{name}' contains forbidden character '{c}'"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.transfer.labels, LabelSet::English);
        assert_eq!(config.transfer.sheet_name, "Sheet1");
        assert_eq!(config.display.format, OutputFormat::Table);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_sheet_name() {
        let mut config = Config::default();
        config.transfer.sheet_name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sheet_name"));
    }

    #[test]
    fn test_validate_long_sheet_name() {
        let mut config = Config::default();
        config.transfer.sheet_name = "x".repeat(32);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("longer than 31"));
    }

    #[test]
    fn test_validate_forbidden_sheet_char() {
        let mut config = Config::default();
        config.transfer.sheet_name = "Q1/Q2".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("forbidden character '/'"));
    }

    #[test]
    fn test_validate_accepts_chinese_sheet_name() {
        let mut config = Config::default();
        config.transfer.sheet_name = "库房资产".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("assetledger"));
        assert!(path.to_string_lossy().ends_with("assets.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("assetledger"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "assetledger_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
[storage]
database_path = "/data/warehouse.db"

[transfer]
labels = "chinese"
sheet_name = "库存"

[display]
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/data/warehouse.db"));
        assert_eq!(config.transfer.labels, LabelSet::Chinese);
        assert_eq!(config.transfer.sheet_name, "库存");
        assert_eq!(config.display.format, OutputFormat::Json);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let path = std::env::temp_dir().join(format!(
            "assetledger_bad_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[transfer]\nsheet_name = \"\"\n").unwrap();

        let result = Config::load_from(Some(path.clone()));

        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_transfer_config_deserialize() {
        let json = r#"{"labels": "chinese"}"#;
        let transfer: TransferConfig = serde_json::from_str(json).unwrap();
        assert_eq!(transfer.labels, LabelSet::Chinese);
        assert_eq!(transfer.sheet_name, "Sheet1");
    }

    #[test]
    fn test_config_serialize_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
